//! Maps the generic value tree produced by the JSON and YAML readers onto the
//! script model by structural field lookup.

use serde_json::{Map, Value};

use crate::condition::Condition;
use crate::error::{ScriptError, ScriptResult};
use crate::parser::ParseLimits;

use super::{ChoiceEntry, DialogueEntry, DialogueScript, Position, DEFAULT_EXPRESSION};

pub(crate) fn script_from_value(root: &Value, limits: &ParseLimits) -> ScriptResult<DialogueScript> {
    let object = root.as_object().ok_or(ScriptError::RootNotObject)?;
    let raw_entries = object
        .get("entries")
        .and_then(Value::as_array)
        .ok_or(ScriptError::MissingEntries)?;
    if raw_entries.len() > limits.max_entries {
        return Err(ScriptError::ResourceLimit(format!(
            "entry count {} exceeds {}",
            raw_entries.len(),
            limits.max_entries
        )));
    }

    let id = text_field(object, "id").unwrap_or_default();
    let entries = raw_entries
        .iter()
        .enumerate()
        .map(|(index, raw)| entry_from_value(index, raw, limits))
        .collect::<ScriptResult<Vec<_>>>()?;
    Ok(DialogueScript { id, entries })
}

fn entry_from_value(index: usize, raw: &Value, limits: &ParseLimits) -> ScriptResult<DialogueEntry> {
    let empty = Map::new();
    let object = raw.as_object().unwrap_or(&empty);

    let choices = match object.get("choices").and_then(Value::as_array) {
        Some(raw_choices) => {
            if raw_choices.len() > limits.max_choices {
                return Err(ScriptError::ResourceLimit(format!(
                    "entry {index} has {} choices, limit is {}",
                    raw_choices.len(),
                    limits.max_choices
                )));
            }
            raw_choices
                .iter()
                .enumerate()
                .map(|(choice_index, raw)| choice_from_value(choice_index, raw, limits))
                .collect()
        }
        None => Vec::new(),
    };

    Ok(DialogueEntry {
        id: text_field(object, "id").unwrap_or_else(|| format!("entry_{index}")),
        character_id: text_field(object, "characterId"),
        text: text_field(object, "text").unwrap_or_default(),
        expression: text_field(object, "expression")
            .filter(|expression| !expression.is_empty())
            .unwrap_or_else(|| DEFAULT_EXPRESSION.to_string()),
        position: text_field(object, "position")
            .map(|position| Position::parse(&position))
            .unwrap_or_default(),
        read: false,
        label: optional_text(object, "label"),
        jump_to: optional_text(object, "jumpTo"),
        condition: condition_field(object, limits),
        choices,
    })
}

fn choice_from_value(index: usize, raw: &Value, limits: &ParseLimits) -> ChoiceEntry {
    let empty = Map::new();
    let object = raw.as_object().unwrap_or(&empty);
    ChoiceEntry {
        id: text_field(object, "id").unwrap_or_else(|| format!("choice_{index}")),
        text: text_field(object, "text").unwrap_or_default(),
        jump_to: text_field(object, "jumpTo").unwrap_or_default(),
        condition: condition_field(object, limits),
        visible: object
            .get("visible")
            .map(|value| match value {
                Value::Bool(flag) => *flag,
                Value::String(text) => !text.trim().eq_ignore_ascii_case("false"),
                _ => true,
            })
            .unwrap_or(true),
    }
}

fn condition_field(object: &Map<String, Value>, limits: &ParseLimits) -> Option<Condition> {
    let raw = object.get("condition")?;
    let condition = Condition::from_value(raw, limits.max_condition_depth);
    if condition.is_none() {
        tracing::debug!(condition = %raw, "dropping unrecognised condition");
    }
    condition
}

/// Scalar field as text. Numbers and booleans are stringified, null and
/// containers count as absent.
fn text_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number_text(number)),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Like `text_field`, but an empty string also counts as absent.
fn optional_text(object: &Map<String, Value>, key: &str) -> Option<String> {
    text_field(object, key).filter(|text| !text.is_empty())
}

fn number_text(number: &serde_json::Number) -> String {
    match number.as_f64() {
        Some(value) if value.fract() == 0.0 && value.abs() < 1e15 => format!("{}", value as i64),
        _ => number.to_string(),
    }
}
