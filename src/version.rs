//! Version constants used for content-pack compatibility checks.

use semver::Version;

/// Engine version packs declare requirements against.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// File name of a pack manifest inside a pack directory.
pub const PACK_MANIFEST_FILE: &str = "pack.toml";

/// Parsed form of `ENGINE_VERSION`.
pub fn engine_version() -> Version {
    Version::parse(ENGINE_VERSION).unwrap_or_else(|_| Version::new(0, 0, 0))
}
