//! Boolean condition trees over named variables.

use std::fmt;

use serde_json::{json, Value};

use crate::variable::{VariableLookup, VariableValue};

/// Comparison operators accepted by `Condition::Compare`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    GreaterEqual,
    LessEqual,
}

impl CompareOp {
    /// Accepts symbols (`>=`) and names (`GREATER_EQUAL`), case-insensitively.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_uppercase().as_str() {
            "==" | "EQUALS" => Some(CompareOp::Equals),
            "!=" | "NOT_EQUALS" => Some(CompareOp::NotEquals),
            ">" | "GREATER_THAN" => Some(CompareOp::GreaterThan),
            "<" | "LESS_THAN" => Some(CompareOp::LessThan),
            ">=" | "GREATER_EQUAL" => Some(CompareOp::GreaterEqual),
            "<=" | "LESS_EQUAL" => Some(CompareOp::LessEqual),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Equals => "==",
            CompareOp::NotEquals => "!=",
            CompareOp::GreaterThan => ">",
            CompareOp::LessThan => "<",
            CompareOp::GreaterEqual => ">=",
            CompareOp::LessEqual => "<=",
        }
    }

    fn is_ordering(self) -> bool {
        !matches!(self, CompareOp::Equals | CompareOp::NotEquals)
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Immutable condition tree. Evaluation is pure and never fails.
#[derive(Clone, Debug, PartialEq)]
pub enum Condition {
    Compare {
        variable: String,
        operator: CompareOp,
        value: VariableValue,
    },
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Not(Box<Condition>),
    HasVariable(String),
}

impl Condition {
    pub fn compare(
        variable: impl Into<String>,
        operator: CompareOp,
        value: impl Into<VariableValue>,
    ) -> Self {
        Condition::Compare {
            variable: variable.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn has_variable(name: impl Into<String>) -> Self {
        Condition::HasVariable(name.into())
    }

    pub fn negate(self) -> Self {
        Condition::Not(Box::new(self))
    }

    /// Evaluates against any variable source.
    ///
    /// Missing variables make comparisons false, and so do ordering
    /// comparisons where either side has no numeric reading.
    pub fn evaluate<L: VariableLookup + ?Sized>(&self, vars: &L) -> bool {
        match self {
            Condition::Compare {
                variable,
                operator,
                value,
            } => match vars.lookup(variable) {
                Some(current) => compare(&current, *operator, value),
                None => false,
            },
            Condition::And(children) => children.iter().all(|child| child.evaluate(vars)),
            Condition::Or(children) => children.iter().any(|child| child.evaluate(vars)),
            Condition::Not(child) => !child.evaluate(vars),
            Condition::HasVariable(name) => vars.contains(name),
        }
    }

    /// Names of every variable the tree reads.
    pub fn variables(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Condition::Compare { variable, .. } | Condition::HasVariable(variable) => {
                if !out.contains(&variable.as_str()) {
                    out.push(variable);
                }
            }
            Condition::And(children) | Condition::Or(children) => {
                for child in children {
                    child.collect_variables(out);
                }
            }
            Condition::Not(child) => child.collect_variables(out),
        }
    }

    /// Reads a condition object keyed by its `type` discriminator.
    ///
    /// Unknown types, missing fields and trees deeper than `max_depth`
    /// yield `None`; the caller drops the condition.
    pub fn from_value(value: &Value, max_depth: usize) -> Option<Self> {
        if max_depth == 0 {
            return None;
        }
        let object = value.as_object()?;
        let kind = object.get("type")?.as_str()?;
        match kind {
            "compare" => {
                let variable = object.get("variable")?.as_str()?.to_string();
                let operator = CompareOp::parse(object.get("operator")?.as_str()?)?;
                let value = match object.get("value")? {
                    raw @ (Value::Bool(_) | Value::Number(_) | Value::String(_)) => {
                        VariableValue::from(raw)
                    }
                    _ => return None,
                };
                Some(Condition::Compare {
                    variable,
                    operator,
                    value,
                })
            }
            "and" | "or" => {
                let children = object
                    .get("conditions")
                    .or_else(|| object.get("children"))
                    .and_then(Value::as_array)?
                    .iter()
                    .filter_map(|child| Condition::from_value(child, max_depth - 1))
                    .collect();
                Some(if kind == "and" {
                    Condition::And(children)
                } else {
                    Condition::Or(children)
                })
            }
            "not" => {
                let child = Condition::from_value(object.get("condition")?, max_depth - 1)?;
                Some(Condition::Not(Box::new(child)))
            }
            "hasVariable" | "has_variable" => {
                let name = object
                    .get("variable")
                    .or_else(|| object.get("name"))?
                    .as_str()?;
                Some(Condition::HasVariable(name.to_string()))
            }
            _ => None,
        }
    }

    /// Serialises to the object shape accepted by `from_value`.
    pub fn to_json_value(&self) -> Value {
        match self {
            Condition::Compare {
                variable,
                operator,
                value,
            } => json!({
                "type": "compare",
                "variable": variable,
                "operator": operator.symbol(),
                "value": literal_to_json(value),
            }),
            Condition::And(children) => json!({
                "type": "and",
                "conditions": children.iter().map(Condition::to_json_value).collect::<Vec<_>>(),
            }),
            Condition::Or(children) => json!({
                "type": "or",
                "conditions": children.iter().map(Condition::to_json_value).collect::<Vec<_>>(),
            }),
            Condition::Not(child) => json!({
                "type": "not",
                "condition": child.to_json_value(),
            }),
            Condition::HasVariable(name) => json!({
                "type": "hasVariable",
                "variable": name,
            }),
        }
    }
}

fn compare(current: &VariableValue, operator: CompareOp, expected: &VariableValue) -> bool {
    if !operator.is_ordering() {
        let equal = current == expected;
        return if operator == CompareOp::Equals {
            equal
        } else {
            !equal
        };
    }
    let (Some(left), Some(right)) = (current.as_f64(), expected.as_f64()) else {
        return false;
    };
    match operator {
        CompareOp::GreaterThan => left > right,
        CompareOp::LessThan => left < right,
        CompareOp::GreaterEqual => left >= right,
        CompareOp::LessEqual => left <= right,
        CompareOp::Equals | CompareOp::NotEquals => false,
    }
}

fn literal_to_json(value: &VariableValue) -> Value {
    match value {
        VariableValue::Integer(number) => json!(number),
        VariableValue::Long(number) => json!(number),
        VariableValue::Float(number) => json!(number),
        VariableValue::Number(number) => json!(number),
        VariableValue::Boolean(flag) => json!(flag),
        VariableValue::String(text) => json!(text),
    }
}

#[cfg(test)]
#[path = "tests/condition_tests.rs"]
mod tests;
