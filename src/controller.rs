//! Runtime traversal of a dialogue script.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{DialogueError, DialogueResult};
use crate::script::{ChoiceEntry, DialogueEntry, DialogueScript};
use crate::variable::VariableLookup;

/// Serializable position of a controller, used for save/load.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerState {
    pub script_id: String,
    pub current_index: usize,
    /// Ids of visited entries, oldest first.
    pub history: Vec<String>,
    /// Ids of every entry marked as read.
    pub read_ids: BTreeSet<String>,
    pub fast_forwarding: bool,
}

/// Walks one script.
///
/// The controller is active while `current_index < entries.len()` and
/// complete afterwards. Every navigation call is total: out-of-range moves
/// leave the state unchanged and report `false`.
#[derive(Clone, Debug)]
pub struct DialogueController {
    script: DialogueScript,
    current_index: usize,
    fast_forwarding: bool,
    history: Vec<DialogueEntry>,
}

impl DialogueController {
    pub fn new(script: DialogueScript) -> Self {
        Self {
            script,
            current_index: 0,
            fast_forwarding: false,
            history: Vec::new(),
        }
    }

    /// Rehydrates a controller from saved state.
    ///
    /// The index is clamped to the script length; history ids that no longer
    /// exist in the script are dropped.
    pub fn restore(script: DialogueScript, state: &ControllerState) -> DialogueResult<Self> {
        if state.script_id != script.id {
            return Err(DialogueError::ScriptMismatch {
                saved: state.script_id.clone(),
                loaded: script.id,
            });
        }
        let mut controller = Self::new(script);
        for entry in &mut controller.script.entries {
            entry.read = state.read_ids.contains(&entry.id);
        }
        controller.history = state
            .history
            .iter()
            .filter_map(|id| controller.script.entry_by_id(id).map(DialogueEntry::as_read))
            .collect();
        controller.current_index = state.current_index.min(controller.script.entries.len());
        controller.fast_forwarding = state.fast_forwarding;
        debug!(
            script = %controller.script.id,
            index = controller.current_index,
            history = controller.history.len(),
            "restored dialogue controller"
        );
        Ok(controller)
    }

    pub fn state(&self) -> ControllerState {
        ControllerState {
            script_id: self.script.id.clone(),
            current_index: self.current_index,
            history: self.history.iter().map(|entry| entry.id.clone()).collect(),
            read_ids: self
                .script
                .entries
                .iter()
                .filter(|entry| entry.read)
                .map(|entry| entry.id.clone())
                .collect(),
            fast_forwarding: self.fast_forwarding,
        }
    }

    pub fn script(&self) -> &DialogueScript {
        &self.script
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_entry(&self) -> Option<&DialogueEntry> {
        self.script.entries.get(self.current_index)
    }

    pub fn history(&self) -> &[DialogueEntry] {
        &self.history
    }

    pub fn is_complete(&self) -> bool {
        self.current_index >= self.script.entries.len()
    }

    /// Records the current entry and moves to the following one, ignoring
    /// jump targets. Returns whether an entry is still current.
    pub fn next(&mut self) -> bool {
        if self.record_current() {
            self.current_index += 1;
        }
        trace!(index = self.current_index, "next");
        !self.is_complete()
    }

    pub fn previous(&mut self) -> bool {
        if self.current_index == 0 {
            return false;
        }
        self.current_index = (self.current_index - 1).min(self.script.entries.len());
        trace!(index = self.current_index, "previous");
        true
    }

    /// Moves forward past entries already read, stopping at the first unread
    /// entry or the end of the script.
    pub fn skip(&mut self) -> bool {
        let start = self.current_index;
        while self.current_entry().is_some_and(|entry| entry.read) {
            self.current_index += 1;
        }
        trace!(from = start, to = self.current_index, "skip");
        self.current_index != start
    }

    pub fn fast_forward(&mut self) {
        self.fast_forwarding = true;
    }

    pub fn stop_fast_forward(&mut self) {
        self.fast_forwarding = false;
    }

    pub fn is_fast_forwarding(&self) -> bool {
        self.fast_forwarding
    }

    pub fn reset(&mut self) {
        self.current_index = 0;
        self.history.clear();
        self.fast_forwarding = false;
    }

    /// Moves to the entry carrying `label`. Unknown labels leave the state
    /// untouched and return `false`.
    pub fn jump_to_label(&mut self, label: &str) -> bool {
        let Some(target) = self.script.find_label(label) else {
            debug!(label, "jump to unknown label");
            return false;
        };
        self.record_current();
        self.current_index = target;
        trace!(label, index = target, "jump");
        true
    }

    /// Choices of the current entry that are visible and whose condition holds.
    pub fn visible_choices<L: VariableLookup + ?Sized>(&self, vars: &L) -> Vec<&ChoiceEntry> {
        self.current_entry()
            .map(|entry| {
                entry
                    .choices
                    .iter()
                    .filter(|choice| choice_available(choice, vars))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Follows the target of an available choice on the current entry.
    pub fn choose<L: VariableLookup + ?Sized>(
        &mut self,
        choice_id: &str,
        vars: &L,
    ) -> DialogueResult<()> {
        let entry = self.current_entry().ok_or(DialogueError::NoCurrentEntry)?;
        let choice = entry
            .choices
            .iter()
            .find(|choice| choice.id == choice_id && choice_available(choice, vars))
            .ok_or_else(|| DialogueError::InvalidChoice(choice_id.to_string()))?;
        let target = choice.jump_to.clone();
        if self.jump_to_label(&target) {
            Ok(())
        } else {
            Err(DialogueError::UnknownLabel(target))
        }
    }

    /// Advances like `next`, but follows the current entry's `jump_to` when it
    /// has no choices and then skips entries whose condition is false.
    ///
    /// Entries with choices do not advance; pick one with `choose`.
    pub fn advance<L: VariableLookup + ?Sized>(&mut self, vars: &L) -> bool {
        let Some(entry) = self.current_entry() else {
            return false;
        };
        if entry.has_choices() {
            return true;
        }
        let jumped = match entry.jump_to.clone() {
            Some(target) => self.jump_to_label(&target),
            None => false,
        };
        if !jumped {
            self.next();
        }
        while let Some(entry) = self.current_entry() {
            match &entry.condition {
                Some(condition) if !condition.evaluate(vars) => {
                    trace!(entry = %entry.id, "condition false, skipping");
                    self.current_index += 1;
                }
                _ => break,
            }
        }
        !self.is_complete()
    }

    /// Pushes the current entry to history and flags it read. Returns whether
    /// there was one.
    fn record_current(&mut self) -> bool {
        let Some(entry) = self.script.entries.get_mut(self.current_index) else {
            return false;
        };
        entry.read = true;
        self.history.push(entry.clone());
        true
    }
}

fn choice_available<L: VariableLookup + ?Sized>(choice: &ChoiceEntry, vars: &L) -> bool {
    choice.visible
        && choice
            .condition
            .as_ref()
            .map_or(true, |condition| condition.evaluate(vars))
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
