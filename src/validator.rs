//! Static analysis of parsed scripts.

use std::collections::HashSet;
use std::fmt;

use tracing::debug;

use crate::script::DialogueScript;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueCode {
    ScriptIdBlank,
    ScriptEmpty,
    EntryIdBlank,
    EntryIdDuplicate,
    EntryTextBlank,
    CharacterIdBlank,
    LabelDuplicate,
    JumpTargetMissing,
    ChoiceTargetMissing,
    ChoiceIdBlank,
    ChoiceTextBlank,
    ChoiceTargetBlank,
    JumpIgnoredByChoices,
    UnreachableEntry,
}

impl IssueCode {
    pub fn label(self) -> &'static str {
        match self {
            IssueCode::ScriptIdBlank => "VAL_SCRIPT_ID_BLANK",
            IssueCode::ScriptEmpty => "VAL_SCRIPT_EMPTY",
            IssueCode::EntryIdBlank => "VAL_ENTRY_ID_BLANK",
            IssueCode::EntryIdDuplicate => "VAL_ENTRY_DUPLICATE_ID",
            IssueCode::EntryTextBlank => "VAL_ENTRY_TEXT_BLANK",
            IssueCode::CharacterIdBlank => "VAL_CHARACTER_BLANK",
            IssueCode::LabelDuplicate => "VAL_LABEL_DUPLICATE",
            IssueCode::JumpTargetMissing => "VAL_JUMP_MISSING",
            IssueCode::ChoiceTargetMissing => "VAL_CHOICE_TARGET_MISSING",
            IssueCode::ChoiceIdBlank => "VAL_CHOICE_ID_BLANK",
            IssueCode::ChoiceTextBlank => "VAL_CHOICE_TEXT_BLANK",
            IssueCode::ChoiceTargetBlank => "VAL_CHOICE_TARGET_BLANK",
            IssueCode::JumpIgnoredByChoices => "VAL_JUMP_WITH_CHOICES",
            IssueCode::UnreachableEntry => "VAL_UNREACHABLE",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One finding. Displays as its message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub code: IssueCode,
    pub entry_id: Option<String>,
    pub message: String,
}

impl ValidationIssue {
    fn new(code: IssueCode, entry_id: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            code,
            entry_id: entry_id.map(str::to_string),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Every problem found in one pass. Warnings never affect validity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }

    pub fn has_code(&self, code: IssueCode) -> bool {
        self.issues().any(|(_, issue)| issue.code == code)
    }

    /// Errors first, then warnings.
    pub fn issues(&self) -> impl Iterator<Item = (IssueSeverity, &ValidationIssue)> {
        self.errors
            .iter()
            .map(|issue| (IssueSeverity::Error, issue))
            .chain(self.warnings.iter().map(|issue| (IssueSeverity::Warning, issue)))
    }

    fn error(&mut self, code: IssueCode, entry_id: Option<&str>, message: impl Into<String>) {
        self.errors.push(ValidationIssue::new(code, entry_id, message));
    }

    fn warning(&mut self, code: IssueCode, entry_id: Option<&str>, message: impl Into<String>) {
        self.warnings
            .push(ValidationIssue::new(code, entry_id, message));
    }
}

/// Checks ids, labels and jump targets of a script without modifying it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptValidator;

impl ScriptValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, script: &DialogueScript) -> ValidationResult {
        let mut result = ValidationResult::default();

        if script.id.trim().is_empty() {
            result.error(IssueCode::ScriptIdBlank, None, "script id is blank");
        }
        if script.entries.is_empty() {
            result.warning(
                IssueCode::ScriptEmpty,
                None,
                format!("script '{}' has no entries", script.id),
            );
            return result;
        }

        let mut seen_ids: HashSet<&str> = HashSet::new();
        let mut labels: HashSet<&str> = HashSet::new();
        for (index, entry) in script.entries.iter().enumerate() {
            let entry_ref = Some(entry.id.as_str()).filter(|id| !id.trim().is_empty());
            if entry.id.trim().is_empty() {
                result.error(
                    IssueCode::EntryIdBlank,
                    None,
                    format!("entry #{index} has a blank id"),
                );
            } else if !seen_ids.insert(entry.id.as_str()) {
                result.error(
                    IssueCode::EntryIdDuplicate,
                    entry_ref,
                    format!("duplicate entry id '{}'", entry.id),
                );
            }
            if entry.text.trim().is_empty() {
                result.warning(
                    IssueCode::EntryTextBlank,
                    entry_ref,
                    format!("entry '{}' has blank text", entry.id),
                );
            }
            if entry
                .character_id
                .as_deref()
                .is_some_and(|character| character.trim().is_empty())
            {
                result.warning(
                    IssueCode::CharacterIdBlank,
                    entry_ref,
                    format!("entry '{}' has a blank character id", entry.id),
                );
            }
            if let Some(label) = entry.label.as_deref() {
                if !labels.insert(label) {
                    result.error(
                        IssueCode::LabelDuplicate,
                        entry_ref,
                        format!("duplicate label '{label}' on entry '{}'", entry.id),
                    );
                }
            }
        }

        for entry in &script.entries {
            let entry_ref = Some(entry.id.as_str());
            if let Some(target) = entry.jump_to.as_deref() {
                if !labels.contains(target) {
                    result.error(
                        IssueCode::JumpTargetMissing,
                        entry_ref,
                        format!("entry '{}' jumps to missing label '{target}'", entry.id),
                    );
                }
            }
            for choice in &entry.choices {
                if !labels.contains(choice.jump_to.as_str()) {
                    result.error(
                        IssueCode::ChoiceTargetMissing,
                        entry_ref,
                        format!(
                            "choice '{}' on entry '{}' jumps to missing label '{}'",
                            choice.id, entry.id, choice.jump_to
                        ),
                    );
                }
            }
        }

        for entry in &script.entries {
            let entry_ref = Some(entry.id.as_str());
            for (index, choice) in entry.choices.iter().enumerate() {
                if choice.id.trim().is_empty() {
                    result.error(
                        IssueCode::ChoiceIdBlank,
                        entry_ref,
                        format!("choice #{index} on entry '{}' has a blank id", entry.id),
                    );
                }
                if choice.text.trim().is_empty() {
                    result.warning(
                        IssueCode::ChoiceTextBlank,
                        entry_ref,
                        format!("choice '{}' on entry '{}' has blank text", choice.id, entry.id),
                    );
                }
                if choice.jump_to.trim().is_empty() {
                    result.error(
                        IssueCode::ChoiceTargetBlank,
                        entry_ref,
                        format!("choice '{}' on entry '{}' has no jump target", choice.id, entry.id),
                    );
                }
            }
            if entry.has_choices() && entry.jump_to.is_some() {
                result.warning(
                    IssueCode::JumpIgnoredByChoices,
                    entry_ref,
                    format!(
                        "entry '{}' has both choices and a jump; the jump is ignored",
                        entry.id
                    ),
                );
            }
        }

        for index in unreachable_entries(script) {
            let entry = &script.entries[index];
            result.warning(
                IssueCode::UnreachableEntry,
                Some(entry.id.as_str()),
                format!("entry '{}' can never be reached", entry.id),
            );
        }

        debug!(
            script = %script.id,
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            "validated script"
        );
        result
    }
}

/// Indices not reachable from the first entry through fall-through, entry
/// jumps or choice jumps. Unresolved targets are ignored here.
fn unreachable_entries(script: &DialogueScript) -> Vec<usize> {
    let labels = script.label_index();
    let mut reachable = vec![false; script.entries.len()];
    let mut stack = vec![0usize];
    while let Some(index) = stack.pop() {
        let Some(entry) = script.entries.get(index) else {
            continue;
        };
        if reachable[index] {
            continue;
        }
        reachable[index] = true;
        if entry.has_choices() {
            stack.extend(
                entry
                    .choices
                    .iter()
                    .filter_map(|choice| labels.get(choice.jump_to.as_str()).copied()),
            );
        } else if let Some(target) = entry.jump_to.as_deref() {
            stack.extend(labels.get(target).copied());
        } else {
            stack.push(index + 1);
        }
    }
    reachable
        .iter()
        .enumerate()
        .filter_map(|(index, reached)| (!reached).then_some(index))
        .collect()
}

/// Validates with a default validator.
pub fn validate_script(script: &DialogueScript) -> ValidationResult {
    ScriptValidator::new().validate(script)
}

#[cfg(test)]
#[path = "tests/validator_tests.rs"]
mod tests;
