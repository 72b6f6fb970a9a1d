//! Plugin Manifest - JSON으로 기술된 플러그인 모듈

use super::traits::PluginModule;
use crate::capability::{
    Callable, CapabilityRegistry, ModuleName, ModuleRef, ModuleView, QualifiedName, StaticModule,
};
use crate::guard::ExecutableGuard;
use capgate_foundation::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashSet;
use std::path::Path;

/// 매니페스트 파일 전체
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginManifest {
    #[serde(default)]
    pub modules: Vec<ModuleManifest>,
}

/// 모듈 하나
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleManifest {
    /// 모듈 전체 이름 (예: `plugins.mod_a`)
    pub name: String,

    /// 모듈이 노출하는 최상위 심볼
    #[serde(default)]
    pub symbols: Vec<String>,

    #[serde(default)]
    pub functions: Vec<FunctionManifest>,
}

/// 함수 하나
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionManifest {
    pub name: String,

    /// 필요한 capability 목록
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,

    /// capability가 없을 때 사용할 fallback 함수 이름
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,

    /// 호출 전에 확인할 외부 실행 파일
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable: Option<String>,
}

impl PluginManifest {
    /// JSON 파일에서 로드
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let manifest: Self = serde_json::from_str(&content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// 이름 중복/누락 검사
    pub fn validate(&self) -> Result<()> {
        for module in &self.modules {
            if module.name.trim().is_empty() {
                return Err(Error::InvalidInput("module name is empty".into()));
            }

            let mut seen = HashSet::new();
            for function in &module.functions {
                if function.name.trim().is_empty() {
                    return Err(Error::InvalidInput(format!(
                        "function name is empty in module {}",
                        module.name
                    )));
                }
                if !seen.insert(function.name.as_str()) {
                    return Err(Error::InvalidInput(format!(
                        "duplicate function {} in module {}",
                        function.name, module.name
                    )));
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// ManifestModule
// ============================================================================

struct DeclaredFunction {
    callable: Callable,
    requires: Vec<String>,
    fallback: Option<Callable>,
}

/// 매니페스트로 만든 플러그인 모듈
///
/// 각 함수는 호출되면 자신의 dispatch 키를 문자열로 반환한다.
pub struct ManifestModule {
    view: StaticModule,
    functions: Vec<DeclaredFunction>,
}

impl ManifestModule {
    pub fn new(manifest: &ModuleManifest, guard: &ExecutableGuard) -> Self {
        let name = ModuleName::from(manifest.name.as_str());
        let view = StaticModule::new(name.clone()).with_symbols(manifest.symbols.iter().cloned());

        let functions = manifest
            .functions
            .iter()
            .map(|function| {
                let mut callable = echo(&name, &function.name);
                if let Some(executable) = &function.executable {
                    callable = guard.wrap(executable.clone(), callable);
                }
                DeclaredFunction {
                    callable,
                    requires: function.requires.clone(),
                    fallback: function.fallback.as_deref().map(|fallback| echo(&name, fallback)),
                }
            })
            .collect();

        Self { view, functions }
    }
}

fn echo(module: &ModuleName, function: &str) -> Callable {
    let key = QualifiedName::for_function(module, function);
    Callable::new(function, move |_| Ok(json!(key.as_str())))
}

impl ModuleView for ManifestModule {
    fn name(&self) -> &ModuleName {
        self.view.name()
    }

    fn has_symbol(&self, symbol: &str) -> Result<bool> {
        self.view.has_symbol(symbol)
    }
}

impl PluginModule for ManifestModule {
    fn functions(&self) -> Vec<Callable> {
        self.functions.iter().map(|f| f.callable.clone()).collect()
    }

    fn declare(&self, registry: &CapabilityRegistry, this: &ModuleRef) -> Result<()> {
        for function in self.functions.iter().filter(|f| !f.requires.is_empty()) {
            let mut declaration = registry.require(function.requires.iter().map(String::as_str))?;
            if let Some(fallback) = &function.fallback {
                declaration = declaration.with_fallback(fallback.clone());
            }
            declaration.apply(this, function.callable.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn sample() -> PluginManifest {
        serde_json::from_value(json!({
            "modules": [{
                "name": "plugins.mod_a",
                "symbols": ["json"],
                "functions": [
                    { "name": "func_x", "requires": ["foo_lib"], "fallback": "func_x_fallback" },
                    { "name": "func_y" }
                ]
            }]
        }))
        .unwrap()
    }

    #[test]
    fn test_parse_and_validate() {
        let manifest = sample();
        assert!(manifest.validate().is_ok());
        assert_eq!(manifest.modules[0].functions[0].fallback.as_deref(), Some("func_x_fallback"));
    }

    #[test]
    fn test_duplicate_function_rejected() {
        let mut manifest = sample();
        manifest.modules[0].functions.push(FunctionManifest {
            name: "func_y".into(),
            ..Default::default()
        });
        assert!(matches!(manifest.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_manifest_module_declares() {
        let manifest = sample();
        let module = Arc::new(ManifestModule::new(&manifest.modules[0], &ExecutableGuard::default()));
        let this: ModuleRef = module.clone().into();
        let registry = CapabilityRegistry::new();

        module.declare(&registry, &this).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(module.has_symbol("json").unwrap());

        let functions = module.functions();
        assert_eq!(functions.len(), 2);
        assert_eq!(functions[0].call(&[]).unwrap(), json!("mod_a.func_x"));
    }
}
