//! Typed variable values and the scoped store conditions are evaluated against.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

/// A single variable value. Equality requires the same kind and payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum VariableValue {
    Integer(i32),
    Long(i64),
    Float(f32),
    Number(f64),
    Boolean(bool),
    String(String),
}

impl VariableValue {
    /// Numeric view used by ordering comparisons.
    ///
    /// Strings must parse as a float; anything else yields `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            VariableValue::Integer(value) => Some(f64::from(*value)),
            VariableValue::Long(value) => Some(*value as f64),
            VariableValue::Float(value) => Some(f64::from(*value)),
            VariableValue::Number(value) => Some(*value),
            VariableValue::Boolean(value) => Some(if *value { 1.0 } else { 0.0 }),
            VariableValue::String(value) => value.trim().parse::<f64>().ok(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            VariableValue::Integer(_) => "integer",
            VariableValue::Long(_) => "long",
            VariableValue::Float(_) => "float",
            VariableValue::Number(_) => "number",
            VariableValue::Boolean(_) => "boolean",
            VariableValue::String(_) => "string",
        }
    }
}

impl fmt::Display for VariableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableValue::Integer(value) => write!(f, "{value}"),
            VariableValue::Long(value) => write!(f, "{value}"),
            VariableValue::Float(value) => write!(f, "{value}"),
            VariableValue::Number(value) => write!(f, "{value}"),
            VariableValue::Boolean(value) => write!(f, "{value}"),
            VariableValue::String(value) => f.write_str(value),
        }
    }
}

impl From<i32> for VariableValue {
    fn from(value: i32) -> Self {
        VariableValue::Integer(value)
    }
}

impl From<i64> for VariableValue {
    fn from(value: i64) -> Self {
        VariableValue::Long(value)
    }
}

impl From<f32> for VariableValue {
    fn from(value: f32) -> Self {
        VariableValue::Float(value)
    }
}

impl From<f64> for VariableValue {
    fn from(value: f64) -> Self {
        VariableValue::Number(value)
    }
}

impl From<bool> for VariableValue {
    fn from(value: bool) -> Self {
        VariableValue::Boolean(value)
    }
}

impl From<&str> for VariableValue {
    fn from(value: &str) -> Self {
        VariableValue::String(value.to_string())
    }
}

impl From<String> for VariableValue {
    fn from(value: String) -> Self {
        VariableValue::String(value)
    }
}

impl From<&serde_json::Value> for VariableValue {
    /// Numbers become `Number`, booleans `Boolean`; every other shape is stringified.
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Bool(flag) => VariableValue::Boolean(*flag),
            serde_json::Value::Number(number) => {
                VariableValue::Number(number.as_f64().unwrap_or_default())
            }
            serde_json::Value::String(text) => VariableValue::String(text.clone()),
            serde_json::Value::Null => VariableValue::String(String::new()),
            other => VariableValue::String(other.to_string()),
        }
    }
}

/// Which partition of the store an operation addresses.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VarScope {
    Global,
    Local(String),
}

impl VarScope {
    pub fn local(id: impl Into<String>) -> Self {
        VarScope::Local(id.into())
    }
}

/// Read access to named variables, the seam conditions evaluate through.
pub trait VariableLookup {
    fn lookup(&self, name: &str) -> Option<VariableValue>;

    fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }
}

impl VariableLookup for BTreeMap<String, VariableValue> {
    fn lookup(&self, name: &str) -> Option<VariableValue> {
        self.get(name).cloned()
    }
}

impl VariableLookup for HashMap<String, VariableValue> {
    fn lookup(&self, name: &str) -> Option<VariableValue> {
        self.get(name).cloned()
    }
}

/// Every scope of a store, captured at one point in time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableSnapshot {
    pub global: BTreeMap<String, VariableValue>,
    pub locals: BTreeMap<String, BTreeMap<String, VariableValue>>,
}

#[derive(Debug, Default)]
struct Scopes {
    global: HashMap<String, VariableValue>,
    locals: HashMap<String, HashMap<String, VariableValue>>,
}

impl Scopes {
    fn scope(&self, scope: &VarScope) -> Option<&HashMap<String, VariableValue>> {
        match scope {
            VarScope::Global => Some(&self.global),
            VarScope::Local(id) => self.locals.get(id),
        }
    }

    fn scope_mut(&mut self, scope: &VarScope) -> &mut HashMap<String, VariableValue> {
        match scope {
            VarScope::Global => &mut self.global,
            VarScope::Local(id) => self.locals.entry(id.clone()).or_default(),
        }
    }
}

/// Global plus named local variable scopes.
///
/// Each call takes the internal lock once, so individual operations are
/// atomic and snapshots are consistent. Local scopes never fall back to the
/// global scope; callers choose the resolution order.
#[derive(Debug, Default)]
pub struct VariableStore {
    scopes: RwLock<Scopes>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Scopes> {
        self.scopes.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Scopes> {
        self.scopes
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set(&self, name: &str, value: impl Into<VariableValue>) {
        self.set_in(&VarScope::Global, name, value);
    }

    pub fn get(&self, name: &str) -> Option<VariableValue> {
        self.get_in(&VarScope::Global, name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.has_in(&VarScope::Global, name)
    }

    pub fn remove(&self, name: &str) -> Option<VariableValue> {
        self.remove_in(&VarScope::Global, name)
    }

    pub fn clear(&self) {
        self.clear_in(&VarScope::Global);
    }

    pub fn get_all(&self) -> BTreeMap<String, VariableValue> {
        self.get_all_in(&VarScope::Global)
    }

    /// Writes a value, overwriting any previous value in that scope.
    pub fn set_in(&self, scope: &VarScope, name: &str, value: impl Into<VariableValue>) {
        let value = value.into();
        tracing::trace!(?scope, name, kind = value.kind(), "set variable");
        self.write().scope_mut(scope).insert(name.to_string(), value);
    }

    pub fn get_in(&self, scope: &VarScope, name: &str) -> Option<VariableValue> {
        self.read()
            .scope(scope)
            .and_then(|vars| vars.get(name))
            .cloned()
    }

    pub fn has_in(&self, scope: &VarScope, name: &str) -> bool {
        self.read()
            .scope(scope)
            .is_some_and(|vars| vars.contains_key(name))
    }

    pub fn remove_in(&self, scope: &VarScope, name: &str) -> Option<VariableValue> {
        let mut scopes = self.write();
        match scope {
            VarScope::Global => scopes.global.remove(name),
            VarScope::Local(id) => scopes.locals.get_mut(id).and_then(|vars| vars.remove(name)),
        }
    }

    /// Empties one scope. A cleared local scope stays listed in `scopes()`.
    pub fn clear_in(&self, scope: &VarScope) {
        let mut scopes = self.write();
        match scope {
            VarScope::Global => scopes.global.clear(),
            VarScope::Local(id) => {
                if let Some(vars) = scopes.locals.get_mut(id) {
                    vars.clear();
                }
            }
        }
    }

    /// Point-in-time copy of one scope.
    pub fn get_all_in(&self, scope: &VarScope) -> BTreeMap<String, VariableValue> {
        self.read()
            .scope(scope)
            .map(|vars| {
                vars.iter()
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Ids of every local scope that has been written to.
    pub fn scopes(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.read().locals.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn drop_scope(&self, id: &str) -> bool {
        self.write().locals.remove(id).is_some()
    }

    /// Read-only view of a single scope for condition evaluation.
    pub fn scope(&self, scope: VarScope) -> ScopedVariables<'_> {
        ScopedVariables { store: self, scope }
    }

    pub fn snapshot(&self) -> VariableSnapshot {
        let scopes = self.read();
        VariableSnapshot {
            global: scopes
                .global
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
            locals: scopes
                .locals
                .iter()
                .map(|(id, vars)| {
                    let vars = vars
                        .iter()
                        .map(|(name, value)| (name.clone(), value.clone()))
                        .collect();
                    (id.clone(), vars)
                })
                .collect(),
        }
    }

    /// Replaces every scope with the snapshot contents.
    pub fn restore(&self, snapshot: VariableSnapshot) {
        let mut scopes = self.write();
        scopes.global = snapshot.global.into_iter().collect();
        scopes.locals = snapshot
            .locals
            .into_iter()
            .map(|(id, vars)| (id, vars.into_iter().collect()))
            .collect();
    }
}

impl VariableLookup for VariableStore {
    fn lookup(&self, name: &str) -> Option<VariableValue> {
        self.get(name)
    }
}

/// Borrowed view of one scope of a `VariableStore`.
#[derive(Clone, Debug)]
pub struct ScopedVariables<'a> {
    store: &'a VariableStore,
    scope: VarScope,
}

impl VariableLookup for ScopedVariables<'_> {
    fn lookup(&self, name: &str) -> Option<VariableValue> {
        self.store.get_in(&self.scope, name)
    }
}

#[cfg(test)]
#[path = "tests/variable_tests.rs"]
mod tests;
