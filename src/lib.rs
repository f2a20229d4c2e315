mod condition;
mod controller;
mod error;
mod parser;
mod script;
mod validator;
mod variable;
mod version;

pub mod pack;

pub use condition::{CompareOp, Condition};
pub use controller::{ControllerState, DialogueController};
pub use error::{DialogueError, DialogueResult, PackError, ScriptError, ScriptResult};
pub use pack::{
    check_compatibility, CompatibilityReport, ContentPack, PackDependency, PackManifest,
    PackRegistry, ScriptSource,
};
pub use parser::{parse_script, ParseLimits, ParseResult, ScriptParser};
pub use script::{
    export, ChoiceEntry, DialogueEntry, DialogueScript, Position, ScriptFormat,
    DEFAULT_EXPRESSION,
};
pub use validator::{
    validate_script, IssueCode, IssueSeverity, ScriptValidator, ValidationIssue, ValidationResult,
};
pub use variable::{
    ScopedVariables, VarScope, VariableLookup, VariableSnapshot, VariableStore, VariableValue,
};
pub use version::{engine_version, ENGINE_VERSION, PACK_MANIFEST_FILE};
