//! In-memory dialogue script model shared by every format.

use std::collections::HashMap;
use std::fmt;

use crate::condition::Condition;

pub(crate) mod dsl;
pub mod export;
pub(crate) mod json;
pub(crate) mod mapping;
pub(crate) mod yaml;

pub const DEFAULT_EXPRESSION: &str = "normal";

/// Source format of a script.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScriptFormat {
    Json,
    Yaml,
    Dsl,
}

impl ScriptFormat {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "json" => Some(ScriptFormat::Json),
            "yaml" | "yml" => Some(ScriptFormat::Yaml),
            "dsl" | "vns" | "txt" => Some(ScriptFormat::Dsl),
            _ => None,
        }
    }

    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::from_extension(name)
    }

    pub fn label(self) -> &'static str {
        match self {
            ScriptFormat::Json => "json",
            ScriptFormat::Yaml => "yaml",
            ScriptFormat::Dsl => "dsl",
        }
    }
}

impl fmt::Display for ScriptFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Horizontal slot a character portrait occupies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Position {
    Left,
    #[default]
    Center,
    Right,
}

impl Position {
    /// Case-insensitive; unknown names fall back to `Center`.
    pub fn parse(input: &str) -> Self {
        match input.trim().to_ascii_uppercase().as_str() {
            "LEFT" => Position::Left,
            "RIGHT" => Position::Right,
            _ => Position::Center,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Position::Left => "LEFT",
            Position::Center => "CENTER",
            Position::Right => "RIGHT",
        }
    }
}

/// Player-selectable option that always jumps to a label.
#[derive(Clone, Debug, PartialEq)]
pub struct ChoiceEntry {
    pub id: String,
    pub text: String,
    pub jump_to: String,
    pub condition: Option<Condition>,
    pub visible: bool,
}

impl ChoiceEntry {
    pub fn new(id: impl Into<String>, text: impl Into<String>, jump_to: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            jump_to: jump_to.into(),
            condition: None,
            visible: true,
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// One beat of dialogue.
#[derive(Clone, Debug, PartialEq)]
pub struct DialogueEntry {
    pub id: String,
    pub character_id: Option<String>,
    pub text: String,
    pub expression: String,
    pub position: Position,
    pub read: bool,
    pub label: Option<String>,
    pub jump_to: Option<String>,
    pub condition: Option<Condition>,
    pub choices: Vec<ChoiceEntry>,
}

impl Default for DialogueEntry {
    fn default() -> Self {
        Self {
            id: String::new(),
            character_id: None,
            text: String::new(),
            expression: DEFAULT_EXPRESSION.to_string(),
            position: Position::default(),
            read: false,
            label: None,
            jump_to: None,
            condition: None,
            choices: Vec::new(),
        }
    }
}

impl DialogueEntry {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_character(mut self, character_id: impl Into<String>) -> Self {
        self.character_id = Some(character_id.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_jump(mut self, label: impl Into<String>) -> Self {
        self.jump_to = Some(label.into());
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn with_choice(mut self, choice: ChoiceEntry) -> Self {
        self.choices.push(choice);
        self
    }

    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = expression.into();
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn has_choices(&self) -> bool {
        !self.choices.is_empty()
    }

    /// Copy of this entry flagged as read, as stored in history.
    pub fn as_read(&self) -> Self {
        Self {
            read: true,
            ..self.clone()
        }
    }
}

/// A script: an id and its ordered entries.
///
/// Uniqueness of ids and labels and resolution of jump targets are checked by
/// `ScriptValidator`, not enforced here.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DialogueScript {
    pub id: String,
    pub entries: Vec<DialogueEntry>,
}

impl DialogueScript {
    pub fn new(id: impl Into<String>, entries: Vec<DialogueEntry>) -> Self {
        Self {
            id: id.into(),
            entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Label to entry index. The first entry carrying a label wins.
    pub fn label_index(&self) -> HashMap<&str, usize> {
        let mut labels = HashMap::new();
        for (index, entry) in self.entries.iter().enumerate() {
            if let Some(label) = entry.label.as_deref() {
                labels.entry(label).or_insert(index);
            }
        }
        labels
    }

    pub fn find_label(&self, label: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.label.as_deref() == Some(label))
    }

    pub fn entry_by_id(&self, id: &str) -> Option<&DialogueEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }
}

#[cfg(test)]
#[path = "../tests/script_tests.rs"]
mod tests;
