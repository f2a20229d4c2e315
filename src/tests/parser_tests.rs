use super::*;
use crate::condition::{CompareOp, Condition};
use crate::script::Position;

const JSON_SCRIPT: &str = r#"
{
    "id": "chapter1",
    "entries": [
        {
            "id": "e1",
            "characterId": "alice",
            "text": "Hello\n\"traveller\"",
            "expression": "happy",
            "position": "left",
            "label": "start",
            "choices": [
                {"id": "c1", "text": "Hi", "jumpTo": "start"},
                {
                    "id": "c2",
                    "text": "Pay",
                    "jumpTo": "shop",
                    "visible": false,
                    "condition": {"type": "compare", "variable": "gold", "operator": "GREATER_EQUAL", "value": 50}
                }
            ]
        },
        {
            "id": "e2",
            "text": "Welcome to the shop",
            "label": "shop",
            "jumpTo": "start",
            "condition": {"type": "or", "conditions": [
                {"type": "hasVariable", "variable": "vip"},
                {"type": "compare", "variable": "name", "operator": "==", "value": "Bob"}
            ]}
        },
        {"text": 42, "condition": {"type": "mystery"}}
    ]
}
"#;

#[test]
fn test_json_maps_every_field() {
    let result = parse_script(JSON_SCRIPT, ScriptFormat::Json);
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    let script = result.script.expect("script");

    assert_eq!(script.id, "chapter1");
    assert_eq!(script.entries.len(), 3);

    let first = &script.entries[0];
    assert_eq!(first.character_id.as_deref(), Some("alice"));
    assert_eq!(first.text, "Hello\n\"traveller\"");
    assert_eq!(first.expression, "happy");
    assert_eq!(first.position, Position::Left);
    assert_eq!(first.label.as_deref(), Some("start"));
    assert_eq!(first.choices.len(), 2);
    assert!(first.choices[0].visible);
    assert!(!first.choices[1].visible);
    assert_eq!(
        first.choices[1].condition,
        Some(Condition::compare("gold", CompareOp::GreaterEqual, 50.0))
    );

    let second = &script.entries[1];
    assert_eq!(second.jump_to.as_deref(), Some("start"));
    assert_eq!(second.expression, "normal");
    assert_eq!(second.position, Position::Center);
    assert!(matches!(second.condition, Some(Condition::Or(ref children)) if children.len() == 2));

    let third = &script.entries[2];
    assert_eq!(third.id, "entry_2");
    assert_eq!(third.text, "42");
    assert_eq!(third.condition, None);
}

#[test]
fn test_json_missing_entries() {
    let result = parse_script(r#"{"id": "x"}"#, ScriptFormat::Json);
    assert!(result.script.is_none());
    assert_eq!(result.errors, vec!["缺少entries字段".to_string()]);
}

#[test]
fn test_json_syntax_error_never_escapes() {
    let result = parse_script(r#"{"id": "x", "entries": [ {"text": "unterminated }"#, ScriptFormat::Json);
    assert!(result.script.is_none());
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("JSON解析错误: "));
    assert!(result.clone().into_result().is_err());
}

#[test]
fn test_yaml_matches_json_shape() {
    let yaml = r#"
id: chapter1
entries:
  - id: e1
    characterId: alice
    text: Hello
    label: start
    position: RIGHT
    choices:
      - id: c1
        text: Again
        jumpTo: start
      - id: c2
        text: Shop
        jumpTo: shop
        condition:
          type: not
          condition:
            type: hasVariable
            variable: banned
  - id: e2
    text: null
    label: shop
    jumpTo: start
"#;
    let script = parse_script(yaml, ScriptFormat::Yaml)
        .into_result()
        .expect("yaml parses");
    assert_eq!(script.id, "chapter1");
    assert_eq!(script.entries.len(), 2);
    assert_eq!(script.entries[0].position, Position::Right);
    assert_eq!(script.entries[0].choices[1].jump_to, "shop");
    assert_eq!(
        script.entries[0].choices[1].condition,
        Some(Condition::has_variable("banned").negate())
    );
    assert_eq!(script.entries[1].text, "");
    assert_eq!(script.entries[1].jump_to.as_deref(), Some("start"));
}

#[test]
fn test_yaml_without_entries() {
    let result = parse_script("id: lonely\n", ScriptFormat::Yaml);
    assert_eq!(result.errors, vec!["缺少entries字段".to_string()]);
    let empty = parse_script("", ScriptFormat::Yaml);
    assert_eq!(empty.errors, vec!["缺少entries字段".to_string()]);
}

#[test]
fn test_dsl_scenario() {
    let dsl = "label: intro\ncharacter: alice\ntext: Hello there.\nchoice: Say hi -> intro\nchoice: Leave -> bye\nlabel: bye\ntext: Goodbye.\n";
    let script = parse_script(dsl, ScriptFormat::Dsl)
        .into_result()
        .expect("dsl parses");

    assert_eq!(script.entries.len(), 2);
    let intro = &script.entries[0];
    assert_eq!(intro.label.as_deref(), Some("intro"));
    assert_eq!(intro.character_id.as_deref(), Some("alice"));
    assert_eq!(intro.text, "Hello there.");
    let targets: Vec<_> = intro
        .choices
        .iter()
        .map(|choice| (choice.text.as_str(), choice.jump_to.as_str()))
        .collect();
    assert_eq!(targets, vec![("Say hi", "intro"), ("Leave", "bye")]);

    let bye = &script.entries[1];
    assert_eq!(bye.label.as_deref(), Some("bye"));
    assert_eq!(bye.text, "Goodbye.");
}

#[test]
fn test_byte_budget() {
    let parser = ScriptParser::with_limits(ParseLimits {
        max_script_bytes: 16,
        ..ParseLimits::default()
    });
    let result = parser.parse(r#"{"id": "x", "entries": []}"#, ScriptFormat::Json);
    assert!(result.script.is_none());
    assert!(result.errors[0].starts_with("资源限制"));
}

#[test]
fn test_choice_budget() {
    let parser = ScriptParser::with_limits(ParseLimits {
        max_choices: 1,
        ..ParseLimits::default()
    });
    let json = r#"{"id": "x", "entries": [{"choices": [
        {"text": "a", "jumpTo": "l"}, {"text": "b", "jumpTo": "l"}
    ]}]}"#;
    assert!(parser.parse(json, ScriptFormat::Json).script.is_none());
}

#[test]
fn test_non_object_root() {
    let result = parse_script("[1, 2, 3]", ScriptFormat::Json);
    assert!(result.script.is_none());
    assert_eq!(result.errors.len(), 1);
}
