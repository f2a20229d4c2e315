//! Content packs: a manifest plus the scripts it declares.
//!
//! A pack only becomes a `ContentPack` after passing the engine and
//! dependency gate and after every declared script parses and validates.

pub mod compat;
pub mod manifest;

use std::collections::{BTreeMap, BTreeSet};
use std::io;

use semver::Version;
use tracing::{info, instrument, warn};

use crate::error::PackError;
use crate::parser::ScriptParser;
use crate::script::DialogueScript;
use crate::validator::ScriptValidator;

pub use compat::{check_compatibility, CompatibilityReport, PackRegistry};
pub use manifest::{PackDependency, PackManifest, ScriptSource};

/// A pack whose scripts were all accepted.
#[derive(Debug, Clone)]
pub struct ContentPack {
    pub manifest: PackManifest,
    pub scripts: Vec<DialogueScript>,
    pub warnings: Vec<String>,
}

impl ContentPack {
    /// Gates and loads a pack.
    ///
    /// `read_source` supplies the text of each declared script; the pack
    /// never touches the file system itself.
    #[instrument(skip_all, fields(pack = %manifest.id))]
    pub fn load<F>(
        manifest: PackManifest,
        engine: &Version,
        installed: &BTreeMap<String, Version>,
        mut read_source: F,
    ) -> Result<Self, PackError>
    where
        F: FnMut(&ScriptSource) -> io::Result<String>,
    {
        let report = check_compatibility(&manifest, engine, installed);
        if !report.is_compatible() {
            warn!(errors = ?report.errors, "pack rejected by compatibility check");
            return Err(PackError::Incompatible {
                pack: manifest.id,
                reasons: report.errors,
            });
        }

        let parser = ScriptParser::new();
        let validator = ScriptValidator::new();
        let mut warnings = report.warnings;
        let mut scripts = Vec::with_capacity(manifest.scripts.len());
        let mut seen = BTreeSet::new();

        for source in &manifest.scripts {
            let reject = |reasons: Vec<String>| PackError::Script {
                pack: manifest.id.clone(),
                path: source.path.clone(),
                reasons,
            };

            let Some(format) = source.resolved_format() else {
                return Err(reject(vec![format!(
                    "unknown script format for '{}'",
                    source.path
                )]));
            };
            let content = read_source(source)?;
            let parsed = parser.parse(&content, format);
            let Some(script) = parsed.script else {
                return Err(reject(parsed.errors));
            };

            let validation = validator.validate(&script);
            if !validation.is_valid() {
                return Err(reject(validation.error_messages()));
            }
            if !seen.insert(script.id.clone()) {
                return Err(reject(vec![format!(
                    "script id '{}' is declared twice",
                    script.id
                )]));
            }
            warnings.extend(
                validation
                    .warning_messages()
                    .into_iter()
                    .map(|message| format!("{}: {message}", source.path)),
            );
            scripts.push(script);
        }

        info!(
            scripts = scripts.len(),
            warnings = warnings.len(),
            "loaded content pack"
        );
        Ok(Self {
            manifest,
            scripts,
            warnings,
        })
    }

    pub fn script(&self, id: &str) -> Option<&DialogueScript> {
        self.scripts.iter().find(|script| script.id == id)
    }
}
