use super::*;
use crate::parser::parse_script;
use crate::script::{ChoiceEntry, DialogueEntry, ScriptFormat};

const SCENARIO: &str = "label: intro\ncharacter: alice\ntext: Hello there.\nchoice: Say hi -> intro\nchoice: Leave -> bye\nlabel: bye\ntext: Goodbye.\n";

fn parse_dsl(input: &str) -> DialogueScript {
    parse_script(input, ScriptFormat::Dsl)
        .into_result()
        .expect("dsl parses")
}

#[test]
fn test_dsl_scenario_has_no_errors() {
    let result = validate_script(&parse_dsl(SCENARIO));
    assert!(result.is_valid(), "{:?}", result.errors);
}

#[test]
fn test_unresolved_choice_target_reports_exactly_one_error() {
    let script = parse_dsl(&SCENARIO.replace("Leave -> bye", "Leave -> nowhere"));
    let result = validate_script(&script);
    assert_eq!(result.errors.len(), 1, "{:?}", result.errors);
    assert_eq!(result.errors[0].code, IssueCode::ChoiceTargetMissing);
    assert!(result.errors[0].message.contains("nowhere"));
}

#[test]
fn test_empty_script_is_valid_with_one_warning() {
    let result = validate_script(&DialogueScript::new("empty", vec![]));
    assert!(result.is_valid());
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].code, IssueCode::ScriptEmpty);
}

#[test]
fn test_blank_script_id_is_an_error() {
    let result = validate_script(&DialogueScript::new(" ", vec![DialogueEntry::new("a", "A")]));
    assert!(!result.is_valid());
    assert!(result.has_code(IssueCode::ScriptIdBlank));
}

#[test]
fn test_duplicates_are_all_reported() {
    let script = DialogueScript::new(
        "dups",
        vec![
            DialogueEntry::new("a", "one").with_label("x"),
            DialogueEntry::new("a", "two").with_label("x"),
            DialogueEntry::new("", "three"),
            DialogueEntry::new("a", "four"),
        ],
    );
    let result = validate_script(&script);
    let codes: Vec<_> = result.errors.iter().map(|issue| issue.code).collect();
    assert_eq!(
        codes,
        vec![
            IssueCode::EntryIdDuplicate,
            IssueCode::LabelDuplicate,
            IssueCode::EntryIdBlank,
            IssueCode::EntryIdDuplicate,
        ]
    );
    assert!(result
        .error_messages()
        .iter()
        .filter(|message| message.contains("'a'"))
        .count()
        >= 2);
}

#[test]
fn test_forward_jump_resolves_against_complete_label_set() {
    let script = DialogueScript::new(
        "forward",
        vec![
            DialogueEntry::new("a", "A").with_jump("end"),
            DialogueEntry::new("b", "B").with_label("end"),
        ],
    );
    assert!(validate_script(&script).is_valid());
}

#[test]
fn test_missing_entry_jump_names_label() {
    let script = DialogueScript::new("s", vec![DialogueEntry::new("a", "A").with_jump("void")]);
    let result = validate_script(&script);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].code, IssueCode::JumpTargetMissing);
    assert!(result.errors[0].message.contains("void"));
    assert_eq!(result.errors[0].entry_id.as_deref(), Some("a"));
}

#[test]
fn test_choice_field_checks() {
    let script = DialogueScript::new(
        "choices",
        vec![DialogueEntry::new("a", "Pick")
            .with_label("top")
            .with_jump("top")
            .with_choice(ChoiceEntry::new("", "", "top"))
            .with_choice(ChoiceEntry::new("c2", "Nowhere", " "))],
    );
    let result = validate_script(&script);
    assert!(result.has_code(IssueCode::ChoiceIdBlank));
    assert!(result.has_code(IssueCode::ChoiceTextBlank));
    assert!(result.has_code(IssueCode::JumpIgnoredByChoices));

    // A blank target is both blank and missing from the label set.
    let codes: Vec<_> = result.errors.iter().map(|issue| issue.code).collect();
    assert_eq!(
        codes,
        vec![
            IssueCode::ChoiceTargetMissing,
            IssueCode::ChoiceIdBlank,
            IssueCode::ChoiceTargetBlank,
        ]
    );
    assert!(result.errors[0].message.contains("'c2'"));
}

#[test]
fn test_warnings_do_not_affect_validity() {
    let mut entry = DialogueEntry::new("a", "  ");
    entry.character_id = Some(String::new());
    let result = validate_script(&DialogueScript::new("w", vec![entry]));
    assert!(result.is_valid());
    assert!(result.has_code(IssueCode::EntryTextBlank));
    assert!(result.has_code(IssueCode::CharacterIdBlank));
}

#[test]
fn test_unreachable_entries_are_warnings() {
    let script = DialogueScript::new(
        "reach",
        vec![
            DialogueEntry::new("a", "A").with_jump("end"),
            DialogueEntry::new("b", "skipped"),
            DialogueEntry::new("c", "C").with_label("end"),
        ],
    );
    let result = validate_script(&script);
    assert!(result.is_valid());
    let unreachable: Vec<_> = result
        .warnings
        .iter()
        .filter(|issue| issue.code == IssueCode::UnreachableEntry)
        .filter_map(|issue| issue.entry_id.as_deref())
        .collect();
    assert_eq!(unreachable, vec!["b"]);
}
