//! Entry point for turning script text into a `DialogueScript`.

use tracing::{debug, instrument, warn};

use crate::error::{ScriptError, ScriptResult};
use crate::script::{dsl, json, mapping, yaml, DialogueScript, ScriptFormat};

/// Budget applied while parsing author content.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseLimits {
    pub max_script_bytes: usize,
    pub max_entries: usize,
    pub max_choices: usize,
    pub max_condition_depth: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_script_bytes: 512 * 1024,
            max_entries: 10_000,
            max_choices: 32,
            max_condition_depth: 32,
        }
    }
}

/// Outcome of a parse: either a script or the reasons there is none.
#[derive(Clone, Debug, PartialEq)]
pub struct ParseResult {
    pub script: Option<DialogueScript>,
    pub errors: Vec<String>,
}

impl ParseResult {
    fn success(script: DialogueScript) -> Self {
        Self {
            script: Some(script),
            errors: Vec::new(),
        }
    }

    fn failure(error: &ScriptError) -> Self {
        Self {
            script: None,
            errors: vec![error.to_string()],
        }
    }

    pub fn is_success(&self) -> bool {
        self.script.is_some() && self.errors.is_empty()
    }

    /// Converts into a `Result` for callers that want to use `?`.
    pub fn into_result(self) -> ScriptResult<DialogueScript> {
        match self.script {
            Some(script) if self.errors.is_empty() => Ok(script),
            _ => Err(ScriptError::Unparsed(self.errors.join("; "))),
        }
    }
}

/// Parses the JSON, YAML and DSL script formats into one model.
#[derive(Clone, Debug, Default)]
pub struct ScriptParser {
    limits: ParseLimits,
}

impl ScriptParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: ParseLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &ParseLimits {
        &self.limits
    }

    /// Parses `content`. Failures come back in `ParseResult::errors` with no
    /// script.
    #[instrument(skip(self, content), fields(bytes = content.len()))]
    pub fn parse(&self, content: &str, format: ScriptFormat) -> ParseResult {
        match self.parse_typed(content, format) {
            Ok(script) => {
                debug!(script = %script.id, entries = script.entries.len(), "parsed script");
                ParseResult::success(script)
            }
            Err(error) => {
                warn!(%error, "script parse failed");
                ParseResult::failure(&error)
            }
        }
    }

    /// Same as `parse`, keeping the typed error (with its source span for JSON).
    pub fn parse_typed(&self, content: &str, format: ScriptFormat) -> ScriptResult<DialogueScript> {
        if content.len() > self.limits.max_script_bytes {
            return Err(ScriptError::ResourceLimit(format!(
                "script is {} bytes, limit is {}",
                content.len(),
                self.limits.max_script_bytes
            )));
        }
        match format {
            ScriptFormat::Json => mapping::script_from_value(&json::read(content)?, &self.limits),
            ScriptFormat::Yaml => mapping::script_from_value(&yaml::read(content)?, &self.limits),
            ScriptFormat::Dsl => dsl::parse(content, &self.limits),
        }
    }
}

/// Parses with default limits.
pub fn parse_script(content: &str, format: ScriptFormat) -> ParseResult {
    ScriptParser::new().parse(content, format)
}

#[cfg(test)]
#[path = "tests/parser_tests.rs"]
mod tests;
