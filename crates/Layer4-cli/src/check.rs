//! `capgate check` - 매니페스트 로드 + enforcement pass

use capgate_core::{
    DispatchTable, EnforcementReport, ExecutableGuard, ManifestModule, ModuleLoader,
    ModuleLoaderConfig, PluginManifest,
};
use capgate_foundation::CapgateConfig;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

pub fn run(manifest_path: &Path, config: &CapgateConfig, json: bool) -> anyhow::Result<()> {
    let (table, report) = enforce_manifest(manifest_path, config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Dispatch table ({} entries):", table.len());
    for key in table.keys() {
        let target = table
            .get(key.as_str())
            .map(|callable| callable.name().to_string())
            .unwrap_or_default();
        println!("  {:<32} -> {}", key.as_str(), target);
    }

    println!();
    println!("{}", report);
    for issue in &report.errors {
        println!("  error: {} ({}): {}", issue.module, issue.capability, issue.message);
    }
    for key in &report.conflicts {
        println!("  conflict: {}", key);
    }

    Ok(())
}

/// 매니페스트의 모든 모듈을 로드하고 enforcement pass 결과 반환
pub fn enforce_manifest(
    manifest_path: &Path,
    config: &CapgateConfig,
) -> anyhow::Result<(DispatchTable, EnforcementReport)> {
    let manifest = PluginManifest::load(manifest_path)?;
    let guard = ExecutableGuard::from_config(config);

    let mut loader = ModuleLoader::new(ModuleLoaderConfig::from(config));
    let modules: Vec<_> = manifest
        .modules
        .iter()
        .map(|module| Arc::new(ManifestModule::new(module, &guard)))
        .collect();

    for (name, e) in loader.load_all(modules) {
        warn!("Module {} was not loaded: {}", name, e);
    }

    Ok(loader.finish())
}
