#![allow(dead_code)]

use dialogue_engine::{DialogueScript, ScriptFormat, ScriptParser};

pub const SHOP_DSL: &str = "\
label: intro
character: alice
text: Hello there.
choice: Say hi -> intro
choice: Leave -> bye
label: bye
text: Goodbye.
";

pub const QUEST_JSON: &str = r#"{
  "id": "quest",
  "entries": [
    {
      "id": "greet",
      "label": "start",
      "characterId": "guard",
      "text": "Halt. State your business.",
      "expression": "stern",
      "position": "LEFT",
      "choices": [
        {"id": "pay", "text": "Pay the toll", "jumpTo": "gate",
         "condition": {"type": "compare", "variable": "gold", "operator": ">=", "value": 10}},
        {"id": "leave", "text": "Walk away", "jumpTo": "end"}
      ]
    },
    {"id": "gate", "label": "gate", "text": "Go on through.", "jumpTo": "end"},
    {"id": "bye", "label": "end", "text": "Safe travels.",
     "condition": {"type": "not", "condition": {"type": "hasVariable", "variable": "banned"}}}
  ]
}"#;

/// Parses with default limits, panicking with the collected errors.
pub fn parse(content: &str, format: ScriptFormat) -> DialogueScript {
    let result = ScriptParser::new().parse(content, format);
    match result.script {
        Some(script) => script,
        None => panic!("parse failed: {:?}", result.errors),
    }
}
