//! Line-oriented dialogue DSL.
//!
//! ```text
//! script_id: chapter1
//! # comment
//! label: intro
//! character: alice
//! expression: happy
//! position: left
//! text: Hello there.
//! a continuation line is appended to the text
//! jump: other_label
//! choice: Say hi -> intro
//! ```
//!
//! Only `label:` starts a new entry. `script_id:` and `id:` lines name the
//! script and are never read as entry text. Lines are trimmed, and blank,
//! `#` and `-` lines are skipped.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{ScriptError, ScriptResult};
use crate::parser::ParseLimits;

use super::{ChoiceEntry, DialogueEntry, DialogueScript, Position};

pub(super) const CHOICE_ARROW: &str = "->";

const DIRECTIVES: [&str; 9] = [
    "label",
    "character",
    "text",
    "expression",
    "position",
    "jump",
    "choice",
    "script_id",
    "id",
];

pub(crate) fn parse(input: &str, limits: &ParseLimits) -> ScriptResult<DialogueScript> {
    let id = script_id(input).unwrap_or_else(synthesized_id);
    let mut builder = Builder::new(limits);

    for raw_line in input.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('-') {
            continue;
        }
        if let Some(label) = directive(line, "label") {
            builder.flush()?;
            builder.current().label = Some(label.to_string()).filter(|label| !label.is_empty());
        } else if let Some(character) = directive(line, "character") {
            builder.current().character_id = Some(character.to_string());
        } else if let Some(text) = directive(line, "text") {
            builder.append_text(text);
        } else if let Some(expression) = directive(line, "expression") {
            builder.current().expression = expression.to_string();
        } else if let Some(position) = directive(line, "position") {
            builder.current().position = Position::parse(position);
        } else if let Some(target) = directive(line, "jump") {
            builder.current().jump_to = Some(target.to_string()).filter(|target| !target.is_empty());
        } else if let Some(choice) = directive(line, "choice") {
            builder.add_choice(choice)?;
        } else if directive(line, "script_id").is_some() || directive(line, "id").is_some() {
            continue;
        } else {
            builder.append_text(line);
        }
    }
    builder.flush()?;

    Ok(DialogueScript {
        id,
        entries: builder.entries,
    })
}

/// Value of `name: value` when the line starts with that directive.
fn directive<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    line.strip_prefix(name)?.strip_prefix(':').map(str::trim)
}

/// Whether `line`, written on its own, would be read back as something
/// other than a continuation of the entry text.
pub(super) fn is_structural_line(line: &str) -> bool {
    let line = line.trim();
    line.is_empty()
        || line.starts_with('#')
        || line.starts_with('-')
        || DIRECTIVES.iter().any(|name| directive(line, name).is_some())
}

fn script_id(input: &str) -> Option<String> {
    input.lines().map(str::trim).find_map(|line| {
        directive(line, "script_id")
            .or_else(|| directive(line, "id"))
            .filter(|id| !id.is_empty())
            .map(str::to_string)
    })
}

fn synthesized_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default();
    format!("script_{millis}")
}

struct Builder<'a> {
    limits: &'a ParseLimits,
    entries: Vec<DialogueEntry>,
    pending: Option<DialogueEntry>,
}

impl<'a> Builder<'a> {
    fn new(limits: &'a ParseLimits) -> Self {
        Self {
            limits,
            entries: Vec::new(),
            pending: None,
        }
    }

    fn current(&mut self) -> &mut DialogueEntry {
        let index = self.entries.len();
        self.pending.get_or_insert_with(|| DialogueEntry {
            id: format!("entry_{index}"),
            ..DialogueEntry::default()
        })
    }

    fn append_text(&mut self, text: &str) {
        let entry = self.current();
        if !entry.text.is_empty() {
            entry.text.push('\n');
        }
        entry.text.push_str(text);
    }

    /// `text -> label`, split on the first arrow. Lines without an arrow are
    /// ignored.
    fn add_choice(&mut self, body: &str) -> ScriptResult<()> {
        let Some((text, target)) = body.split_once(CHOICE_ARROW) else {
            tracing::debug!(choice = body, "ignoring choice without '->'");
            return Ok(());
        };
        let max_choices = self.limits.max_choices;
        let entry = self.current();
        if entry.choices.len() >= max_choices {
            return Err(ScriptError::ResourceLimit(format!(
                "entry '{}' has more than {max_choices} choices",
                entry.id
            )));
        }
        let id = format!("choice_{}", entry.choices.len());
        entry
            .choices
            .push(ChoiceEntry::new(id, text.trim(), target.trim()));
        Ok(())
    }

    fn flush(&mut self) -> ScriptResult<()> {
        if let Some(entry) = self.pending.take() {
            if self.entries.len() >= self.limits.max_entries {
                return Err(ScriptError::ResourceLimit(format!(
                    "entry count exceeds {}",
                    self.limits.max_entries
                )));
            }
            self.entries.push(entry);
        }
        Ok(())
    }
}
