use std::path::PathBuf;

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

pub type ScriptResult<T> = Result<T, ScriptError>;
pub type DialogueResult<T> = Result<T, DialogueError>;

/// Failures raised while turning script text into a `DialogueScript`, or a
/// script back into DSL text.
///
/// The parser never hands these to callers directly; they are rendered into
/// `ParseResult::errors`. `ParseResult::into_result` gives them back typed.
#[derive(Debug, Error, Diagnostic)]
pub enum ScriptError {
    #[error("JSON解析错误: {message}")]
    #[diagnostic(code("dlg.json_syntax"))]
    Json {
        message: String,
        #[source_code]
        src: String,
        #[label("here")]
        span: SourceSpan,
    },
    #[error("YAML解析错误: {0}")]
    #[diagnostic(code("dlg.yaml_syntax"))]
    Yaml(String),
    #[error("缺少entries字段")]
    #[diagnostic(
        code("dlg.missing_entries"),
        help("add an `entries` array to the script root")
    )]
    MissingEntries,
    #[error("脚本根节点必须是对象")]
    #[diagnostic(code("dlg.root_not_object"))]
    RootNotObject,
    #[error("资源限制: {0}")]
    #[diagnostic(code("dlg.resource_limit"))]
    ResourceLimit(String),
    #[error("{0}")]
    #[diagnostic(code("dlg.unparsed"))]
    Unparsed(String),
    #[error("{context} cannot be written as DSL: {reason}")]
    #[diagnostic(
        code("dlg.dsl_unrepresentable"),
        help("export this script as JSON or YAML instead")
    )]
    DslUnrepresentable { context: String, reason: String },
}

/// Runtime failures of the dialogue controller.
#[derive(Debug, Error, Diagnostic)]
pub enum DialogueError {
    #[error("no entry at the current position")]
    #[diagnostic(code("dlg.no_current_entry"))]
    NoCurrentEntry,
    #[error("choice '{0}' is not available on the current entry")]
    #[diagnostic(code("dlg.invalid_choice"))]
    InvalidChoice(String),
    #[error("label '{0}' does not exist in this script")]
    #[diagnostic(code("dlg.unknown_label"))]
    UnknownLabel(String),
    #[error("saved state belongs to script '{saved}', not '{loaded}'")]
    #[diagnostic(code("dlg.script_mismatch"))]
    ScriptMismatch { saved: String, loaded: String },
}

/// Failures while loading, checking or ordering content packs.
#[derive(Debug, Error, Diagnostic)]
pub enum PackError {
    #[error("pack manifest not found at {0}")]
    #[diagnostic(
        code(pack::not_found),
        help("create a 'pack.toml' file in the pack root")
    )]
    NotFound(PathBuf),

    #[error("failed to parse pack manifest: {0}")]
    #[diagnostic(code(pack::parse_error))]
    ParseError(#[from] toml::de::Error),

    #[error("failed to write pack manifest: {0}")]
    #[diagnostic(code(pack::serialize_error))]
    SerializeError(#[from] toml::ser::Error),

    #[error("io error: {0}")]
    #[diagnostic(code(pack::io_error))]
    IoError(#[from] std::io::Error),

    #[error("pack '{0}' is already registered")]
    #[diagnostic(code(pack::duplicate))]
    Duplicate(String),

    #[error("dependency cycle between packs: {}", .0.join(" -> "))]
    #[diagnostic(code(pack::dependency_cycle))]
    DependencyCycle(Vec<String>),

    #[error("pack '{pack}' cannot be loaded: {}", .reasons.join("; "))]
    #[diagnostic(code(pack::incompatible))]
    Incompatible { pack: String, reasons: Vec<String> },

    #[error("script '{path}' in pack '{pack}' was rejected: {}", .reasons.join("; "))]
    #[diagnostic(code(pack::script_rejected))]
    Script {
        pack: String,
        path: String,
        reasons: Vec<String>,
    },
}
