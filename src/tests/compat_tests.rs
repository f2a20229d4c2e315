use semver::VersionReq;

use super::*;

fn req(text: &str) -> VersionReq {
    VersionReq::parse(text).expect("valid requirement")
}

fn pack(id: &str, version: (u64, u64, u64)) -> PackManifest {
    PackManifest::new(id, id, Version::new(version.0, version.1, version.2))
}

#[test]
fn test_engine_requirement() {
    let mut manifest = pack("modern", (1, 0, 0));
    manifest.engine = req(">=2.0");
    let report = check_compatibility(&manifest, &Version::new(1, 4, 0), &BTreeMap::new());
    assert!(!report.is_compatible());
    assert!(report.errors[0].contains(">=2.0"));

    let report = check_compatibility(&manifest, &Version::new(2, 1, 0), &BTreeMap::new());
    assert!(report.is_compatible());
}

#[test]
fn test_dependency_rules() {
    let manifest = pack("story", (1, 0, 0))
        .with_dependency("core", req("^1.2"), false)
        .with_dependency("voices", req("*"), true)
        .with_dependency("art", req("^2"), true);
    let mut installed = BTreeMap::new();
    installed.insert("core".to_string(), Version::new(1, 5, 3));
    installed.insert("art".to_string(), Version::new(1, 0, 0));

    let report = check_compatibility(&manifest, &Version::new(0, 1, 0), &installed);
    assert_eq!(report.errors.len(), 1, "{:?}", report.errors);
    assert!(report.errors[0].contains("art"));
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("voices"));

    installed.remove("core");
    let report = check_compatibility(&manifest, &Version::new(0, 1, 0), &installed);
    assert!(report.errors.iter().any(|error| error.contains("missing dependency 'core'")));
}

#[test]
fn test_self_dependency_is_rejected() {
    let manifest = pack("loop", (1, 0, 0)).with_dependency("loop", req("*"), false);
    let mut installed = BTreeMap::new();
    installed.insert("loop".to_string(), Version::new(1, 0, 0));
    assert!(!check_compatibility(&manifest, &Version::new(0, 1, 0), &installed).is_compatible());
}

#[test]
fn test_registry_rejects_duplicates() {
    let mut registry = PackRegistry::new();
    registry.register(pack("a", (1, 0, 0))).expect("first");
    assert!(matches!(
        registry.register(pack("a", (2, 0, 0))),
        Err(PackError::Duplicate(id)) if id == "a"
    ));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_load_order_puts_dependencies_first() {
    let mut registry = PackRegistry::new();
    registry
        .register(pack("story", (1, 0, 0)).with_dependency("core", req("*"), false))
        .expect("story");
    registry
        .register(
            pack("addon", (1, 0, 0))
                .with_dependency("story", req("*"), false)
                .with_dependency("external", req("*"), true),
        )
        .expect("addon");
    registry.register(pack("core", (1, 0, 0))).expect("core");
    registry.register(pack("bonus", (1, 0, 0))).expect("bonus");

    let order = registry.load_order().expect("acyclic");
    assert_eq!(order, vec!["bonus", "core", "story", "addon"]);

    let reports = registry.check_all(&Version::new(0, 1, 0));
    assert!(reports.iter().all(CompatibilityReport::is_compatible));
}

#[test]
fn test_load_order_detects_cycles() {
    let mut registry = PackRegistry::new();
    registry
        .register(pack("a", (1, 0, 0)).with_dependency("b", req("*"), false))
        .expect("a");
    registry
        .register(pack("b", (1, 0, 0)).with_dependency("a", req("*"), false))
        .expect("b");
    registry.register(pack("c", (1, 0, 0))).expect("c");

    match registry.load_order() {
        Err(PackError::DependencyCycle(path)) => {
            assert_eq!(path, vec!["a", "b", "a"]);
        }
        other => panic!("expected cycle, got {other:?}"),
    }
}
