//! Dependency and semantic-version gating for content packs.

use std::collections::{BTreeMap, BTreeSet};

use semver::Version;
use tracing::{debug, info};

use crate::error::PackError;

use super::manifest::PackManifest;

/// Outcome of checking one pack against an engine and its installed peers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompatibilityReport {
    pub pack_id: String,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl CompatibilityReport {
    pub fn is_compatible(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Checks the engine requirement and every declared dependency.
///
/// Missing required dependencies and version mismatches are errors; a
/// missing optional dependency is only a warning.
pub fn check_compatibility(
    manifest: &PackManifest,
    engine: &Version,
    installed: &BTreeMap<String, Version>,
) -> CompatibilityReport {
    let mut report = CompatibilityReport {
        pack_id: manifest.id.clone(),
        ..CompatibilityReport::default()
    };

    if !manifest.engine.matches(engine) {
        report.errors.push(format!(
            "requires engine {}, running {engine}",
            manifest.engine
        ));
    }

    for dependency in &manifest.dependencies {
        if dependency.id == manifest.id {
            report
                .errors
                .push(format!("pack '{}' depends on itself", manifest.id));
            continue;
        }
        match installed.get(&dependency.id) {
            Some(found) if dependency.version.matches(found) => {}
            Some(found) => report.errors.push(format!(
                "dependency '{}' requires {}, found {found}",
                dependency.id, dependency.version
            )),
            None if dependency.optional => report.warnings.push(format!(
                "optional dependency '{}' ({}) is not installed",
                dependency.id, dependency.version
            )),
            None => report.errors.push(format!(
                "missing dependency '{}' ({})",
                dependency.id, dependency.version
            )),
        }
    }

    debug!(
        pack = %manifest.id,
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "checked pack compatibility"
    );
    report
}

/// Known pack manifests keyed by id.
#[derive(Debug, Clone, Default)]
pub struct PackRegistry {
    packs: BTreeMap<String, PackManifest>,
}

impl PackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, manifest: PackManifest) -> Result<(), PackError> {
        if self.packs.contains_key(&manifest.id) {
            return Err(PackError::Duplicate(manifest.id));
        }
        info!(pack = %manifest.id, version = %manifest.version, "registered pack");
        self.packs.insert(manifest.id.clone(), manifest);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&PackManifest> {
        self.packs.get(id)
    }

    pub fn len(&self) -> usize {
        self.packs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packs.is_empty()
    }

    /// Installed versions of every registered pack.
    pub fn installed(&self) -> BTreeMap<String, Version> {
        self.packs
            .iter()
            .map(|(id, manifest)| (id.clone(), manifest.version.clone()))
            .collect()
    }

    /// Checks every registered pack against the engine and the registry.
    pub fn check_all(&self, engine: &Version) -> Vec<CompatibilityReport> {
        let installed = self.installed();
        self.packs
            .values()
            .map(|manifest| check_compatibility(manifest, engine, &installed))
            .collect()
    }

    /// Pack ids ordered so dependencies load before their dependents.
    ///
    /// Ties are broken by id. Dependencies on unregistered packs do not
    /// constrain the order.
    pub fn load_order(&self) -> Result<Vec<String>, PackError> {
        let mut pending: BTreeMap<&str, BTreeSet<&str>> = self
            .packs
            .values()
            .map(|manifest| {
                let deps = manifest
                    .dependencies
                    .iter()
                    .map(|dependency| dependency.id.as_str())
                    .filter(|id| self.packs.contains_key(*id))
                    .collect();
                (manifest.id.as_str(), deps)
            })
            .collect();

        let mut order = Vec::with_capacity(pending.len());
        loop {
            let ready: Vec<&str> = pending
                .iter()
                .filter(|(_, deps)| deps.is_empty())
                .map(|(id, _)| *id)
                .collect();
            let Some(next) = ready.first().copied() else {
                break;
            };
            pending.remove(next);
            for deps in pending.values_mut() {
                deps.remove(next);
            }
            order.push(next.to_string());
        }

        if pending.is_empty() {
            Ok(order)
        } else {
            Err(PackError::DependencyCycle(find_cycle(&pending)))
        }
    }
}

/// Walks unresolved dependencies from the smallest id until one repeats.
fn find_cycle(pending: &BTreeMap<&str, BTreeSet<&str>>) -> Vec<String> {
    let Some(mut current) = pending.keys().next().copied() else {
        return Vec::new();
    };
    let mut path: Vec<&str> = Vec::new();
    loop {
        if let Some(start) = path.iter().position(|id| *id == current) {
            let mut cycle: Vec<String> = path[start..].iter().map(|id| id.to_string()).collect();
            cycle.push(current.to_string());
            return cycle;
        }
        path.push(current);
        match pending
            .get(current)
            .and_then(|deps| deps.iter().next().copied())
        {
            Some(next) => current = next,
            None => return path.iter().map(|id| id.to_string()).collect(),
        }
    }
}

#[cfg(test)]
#[path = "../tests/compat_tests.rs"]
mod tests;
