//! Writers for the three script formats.
//!
//! JSON and YAML carry every field. The DSL has no syntax for ids,
//! conditions or hidden choices, so those are lost when writing it, and
//! surrounding whitespace is trimmed on reparse. Text the DSL would read back
//! as different structure is rejected instead: multi-line fields, blank or
//! directive-like continuation lines, and choice text containing `->`.

use std::fmt::Write as _;

use serde_json::{json, Map, Value};

use crate::error::{ScriptError, ScriptResult};

use super::dsl::{is_structural_line, CHOICE_ARROW};
use super::{ChoiceEntry, DialogueEntry, DialogueScript, Position, DEFAULT_EXPRESSION};

/// Builds the value tree in the shape the parser reads back.
pub fn to_json_value(script: &DialogueScript) -> Value {
    json!({
        "id": script.id,
        "entries": script.entries.iter().map(entry_value).collect::<Vec<_>>(),
    })
}

pub fn to_json(script: &DialogueScript) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&to_json_value(script))
}

pub fn to_yaml(script: &DialogueScript) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(&to_json_value(script))
}

pub fn to_dsl(script: &DialogueScript) -> ScriptResult<String> {
    single_line("id", &script.id).map_err(|reason| ScriptError::DslUnrepresentable {
        context: format!("script '{}'", script.id),
        reason,
    })?;
    let mut out = String::new();
    let _ = writeln!(out, "script_id: {}", script.id);
    for entry in &script.entries {
        check_dsl_entry(entry).map_err(|reason| ScriptError::DslUnrepresentable {
            context: format!("entry '{}'", entry.id),
            reason,
        })?;
        out.push('\n');
        write_dsl_entry(&mut out, entry);
    }
    Ok(out)
}

fn entry_value(entry: &DialogueEntry) -> Value {
    let mut object = Map::new();
    object.insert("id".into(), json!(entry.id));
    if let Some(character) = &entry.character_id {
        object.insert("characterId".into(), json!(character));
    }
    object.insert("text".into(), json!(entry.text));
    object.insert("expression".into(), json!(entry.expression));
    object.insert("position".into(), json!(entry.position.as_str()));
    if let Some(label) = &entry.label {
        object.insert("label".into(), json!(label));
    }
    if let Some(target) = &entry.jump_to {
        object.insert("jumpTo".into(), json!(target));
    }
    if let Some(condition) = &entry.condition {
        object.insert("condition".into(), condition.to_json_value());
    }
    if !entry.choices.is_empty() {
        object.insert(
            "choices".into(),
            Value::Array(entry.choices.iter().map(choice_value).collect()),
        );
    }
    Value::Object(object)
}

fn choice_value(choice: &ChoiceEntry) -> Value {
    let mut object = Map::new();
    object.insert("id".into(), json!(choice.id));
    object.insert("text".into(), json!(choice.text));
    object.insert("jumpTo".into(), json!(choice.jump_to));
    if let Some(condition) = &choice.condition {
        object.insert("condition".into(), condition.to_json_value());
    }
    object.insert("visible".into(), json!(choice.visible));
    Value::Object(object)
}

fn check_dsl_entry(entry: &DialogueEntry) -> Result<(), String> {
    let fields = [
        ("label", entry.label.as_deref()),
        ("character", entry.character_id.as_deref()),
        ("expression", Some(entry.expression.as_str())),
        ("jump", entry.jump_to.as_deref()),
    ];
    for (field, value) in fields {
        if let Some(value) = value {
            single_line(field, value)?;
        }
    }

    let lines: Vec<&str> = entry.text.lines().collect();
    if let Some((first, rest)) = lines.split_first() {
        if !rest.is_empty() && first.trim().is_empty() {
            return Err("text starts with a blank line".to_string());
        }
        if let Some(line) = rest.iter().find(|line| is_structural_line(line)) {
            return Err(format!("text line {:?} would not read back as text", line.trim()));
        }
    }

    for choice in entry.choices.iter().filter(|choice| choice.visible) {
        single_line("choice text", &choice.text)?;
        single_line("choice target", &choice.jump_to)?;
        if choice.text.contains(CHOICE_ARROW) {
            return Err(format!("choice '{}' text contains '{CHOICE_ARROW}'", choice.id));
        }
    }
    Ok(())
}

fn single_line(field: &str, value: &str) -> Result<(), String> {
    if value.contains(['\n', '\r']) {
        Err(format!("{field} spans several lines"))
    } else {
        Ok(())
    }
}

fn write_dsl_entry(out: &mut String, entry: &DialogueEntry) {
    if let Some(label) = &entry.label {
        let _ = writeln!(out, "label: {label}");
    }
    if let Some(character) = &entry.character_id {
        let _ = writeln!(out, "character: {character}");
    }
    if entry.expression != DEFAULT_EXPRESSION {
        let _ = writeln!(out, "expression: {}", entry.expression);
    }
    if entry.position != Position::Center {
        let _ = writeln!(out, "position: {}", entry.position.as_str().to_ascii_lowercase());
    }
    let mut lines = entry.text.lines();
    if let Some(first) = lines.next() {
        let _ = writeln!(out, "text: {first}");
        for line in lines {
            let _ = writeln!(out, "{line}");
        }
    }
    if let Some(target) = &entry.jump_to {
        let _ = writeln!(out, "jump: {target}");
    }
    for choice in entry.choices.iter().filter(|choice| choice.visible) {
        let _ = writeln!(out, "choice: {} -> {}", choice.text, choice.jump_to);
    }
}
