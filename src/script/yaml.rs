use serde_json::{Map, Number, Value};
use serde_yaml::Value as YamlValue;

use crate::error::{ScriptError, ScriptResult};

/// Reads YAML script text into the generic value tree.
///
/// Scalars follow the script coercion rules: booleans stay booleans, `null`
/// becomes an empty string, quoted scalars stay strings and every number is
/// read as a double.
pub(crate) fn read(input: &str) -> ScriptResult<Value> {
    let document: YamlValue =
        serde_yaml::from_str(input).map_err(|err| ScriptError::Yaml(err.to_string()))?;
    Ok(match document {
        // An empty document has no `entries`; let the mapper say so.
        YamlValue::Null => Value::Object(Map::new()),
        other => convert(other),
    })
}

fn convert(value: YamlValue) -> Value {
    match value {
        YamlValue::Null => Value::String(String::new()),
        YamlValue::Bool(flag) => Value::Bool(flag),
        YamlValue::Number(number) => number
            .as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(number.to_string())),
        YamlValue::String(text) => Value::String(text),
        YamlValue::Sequence(items) => Value::Array(items.into_iter().map(convert).collect()),
        YamlValue::Mapping(mapping) => Value::Object(
            mapping
                .into_iter()
                .map(|(key, value)| (key_text(key), convert(value)))
                .collect(),
        ),
        YamlValue::Tagged(tagged) => convert(tagged.value),
    }
}

fn key_text(key: YamlValue) -> String {
    match key {
        YamlValue::String(text) => text,
        YamlValue::Bool(flag) => flag.to_string(),
        YamlValue::Number(number) => number.to_string(),
        YamlValue::Null => String::new(),
        other => serde_yaml::to_string(&other)
            .map(|text| text.trim_end().to_string())
            .unwrap_or_default(),
    }
}
