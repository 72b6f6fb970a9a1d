//! Manifest 기반 로더 통합 테스트

use capgate_core::{
    CapgateConfig, Error, ExecutableGuard, ManifestModule, ModuleLoader,
    ModuleLoaderConfig, PluginManifest, StaticLocator,
};
use serde_json::json;
use std::sync::Arc;

fn manifest() -> PluginManifest {
    serde_json::from_value(json!({
        "modules": [
            {
                "name": "plugins.mod_a",
                "symbols": [],
                "functions": [
                    { "name": "func_x", "requires": ["foo_lib"] },
                    { "name": "func_y", "requires": ["foo_lib"], "fallback": "func_y_fallback" },
                    { "name": "func_z" }
                ]
            },
            {
                "name": "plugins.mod_b",
                "symbols": ["foo_lib"],
                "functions": [
                    { "name": "func_x", "requires": ["foo_lib"] },
                    { "name": "run_git", "executable": "git" },
                    { "name": "run_missing", "executable": "nonexistent_tool" }
                ]
            }
        ]
    }))
    .unwrap()
}

fn load(config: &CapgateConfig) -> ModuleLoader {
    let guard = ExecutableGuard::new(Arc::new(StaticLocator::new().with("git", "/usr/bin/git")));
    let mut loader = ModuleLoader::new(ModuleLoaderConfig::from(config));
    let modules = manifest()
        .modules
        .iter()
        .map(|m| Arc::new(ManifestModule::new(m, &guard)))
        .collect::<Vec<_>>();
    assert!(loader.load_all(modules).is_empty());
    loader
}

#[test]
fn test_manifest_load_and_enforce() {
    let loader = load(&CapgateConfig::new());
    assert_eq!(loader.table().len(), 6);

    let (table, report) = loader.finish();
    let keys: Vec<&str> = table.keys().into_iter().map(|k| k.as_str()).collect();
    assert_eq!(
        keys,
        vec!["mod_a.func_y", "mod_a.func_z", "mod_b.func_x", "mod_b.run_git", "mod_b.run_missing"]
    );

    assert_eq!(table.call("mod_a.func_y", &[]).unwrap(), json!("mod_a.func_y_fallback"));
    assert_eq!(table.call("mod_b.func_x", &[]).unwrap(), json!("mod_b.func_x"));
    assert_eq!(table.call("mod_b.run_git", &[]).unwrap(), json!("mod_b.run_git"));
    assert!(matches!(
        table.call("mod_b.run_missing", &[]),
        Err(Error::CommandNotFound(name)) if name == "nonexistent_tool"
    ));
    assert!(matches!(table.call("mod_a.func_x", &[]), Err(Error::FunctionNotFound(_))));

    assert_eq!(report.removed.len(), 1);
    assert_eq!(report.substituted.len(), 1);
    assert_eq!(report.kept.len(), 1);
    assert!(report.is_clean());
}

#[test]
fn test_registry_shared_with_loader() {
    let loader = load(&CapgateConfig::new());
    let registry = Arc::clone(loader.registry());
    assert_eq!(registry.len(), 3);
    assert_eq!(registry.records_for("foo_lib").len(), 3);
}
