use std::path::Path;

use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};

use crate::error::PackError;
use crate::script::ScriptFormat;

/// Declaration of a content pack, read from `pack.toml`.
///
/// Scripts not listed here are not part of the pack.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackManifest {
    pub id: String,
    pub name: String,
    pub version: Version,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Requirement on the engine version.
    #[serde(default = "any_version")]
    pub engine: VersionReq,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<PackDependency>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scripts: Vec<ScriptSource>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackDependency {
    pub id: String,
    #[serde(default = "any_version")]
    pub version: VersionReq,
    #[serde(default)]
    pub optional: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScriptSource {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl ScriptSource {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            format: None,
        }
    }

    /// Explicit format if declared, otherwise inferred from the extension.
    pub fn resolved_format(&self) -> Option<ScriptFormat> {
        match self.format.as_deref() {
            Some(name) => ScriptFormat::parse(name),
            None => ScriptFormat::from_path(Path::new(&self.path)),
        }
    }
}

fn any_version() -> VersionReq {
    VersionReq::STAR
}

impl PackManifest {
    pub fn new(id: &str, name: &str, version: Version) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            version,
            description: None,
            author: None,
            engine: any_version(),
            dependencies: Vec::new(),
            scripts: Vec::new(),
        }
    }

    pub fn with_dependency(mut self, id: &str, version: VersionReq, optional: bool) -> Self {
        self.dependencies.push(PackDependency {
            id: id.to_string(),
            version,
            optional,
        });
        self
    }

    pub fn with_script(mut self, path: &str) -> Self {
        self.scripts.push(ScriptSource::new(path));
        self
    }

    /// Loads a manifest file.
    pub fn load(path: &Path) -> Result<Self, PackError> {
        if !path.exists() {
            return Err(PackError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, PackError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String, PackError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), PackError> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
id = "chapter1"
name = "Chapter One"
version = "1.2.0"
engine = ">=0.1, <2"

[[dependencies]]
id = "core"
version = "^1.0"

[[dependencies]]
id = "voices"
version = "*"
optional = true

[[scripts]]
path = "scripts/intro.dsl"

[[scripts]]
path = "scripts/shop.txt"
format = "yaml"
"#;

    #[test]
    fn test_manifest_from_toml() {
        let manifest = PackManifest::from_toml_str(MANIFEST).expect("parse");
        assert_eq!(manifest.id, "chapter1");
        assert_eq!(manifest.version, Version::new(1, 2, 0));
        assert!(manifest.engine.matches(&Version::new(0, 1, 0)));
        assert!(!manifest.engine.matches(&Version::new(2, 0, 0)));
        assert_eq!(manifest.dependencies.len(), 2);
        assert!(!manifest.dependencies[0].optional);
        assert!(manifest.dependencies[1].optional);
        assert_eq!(manifest.scripts[0].resolved_format(), Some(ScriptFormat::Dsl));
        assert_eq!(manifest.scripts[1].resolved_format(), Some(ScriptFormat::Yaml));
    }

    #[test]
    fn test_manifest_roundtrip() {
        let manifest = PackManifest::new("p", "Pack", Version::new(0, 3, 1))
            .with_dependency("core", VersionReq::parse("^1").expect("req"), false)
            .with_script("a.json");
        let toml_str = manifest.to_toml_string().expect("serialize");
        let loaded = PackManifest::from_toml_str(&toml_str).expect("deserialize");
        assert_eq!(manifest, loaded);
    }

    #[test]
    fn test_invalid_version_is_parse_error() {
        let err = PackManifest::from_toml_str("id = \"x\"\nname = \"X\"\nversion = \"one\"\n")
            .expect_err("bad version");
        assert!(matches!(err, PackError::ParseError(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = PackManifest::load(&dir.path().join("pack.toml")).expect_err("missing");
        assert!(matches!(err, PackError::NotFound(_)));
    }
}
