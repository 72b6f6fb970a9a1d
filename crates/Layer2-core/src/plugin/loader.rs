//! Module Loader - 플러그인 모듈 로드 후 enforcement pass 한 번 실행
//!
//! ## 흐름
//!
//! 1. `load()` - 모듈의 capability 선언을 레지스트리에 추가하고 함수를 dispatch table에 등록
//! 2. `finish()` - 모든 로드가 끝난 뒤 enforcement pass를 정확히 한 번 실행

use super::traits::PluginModule;
use crate::capability::{CapabilityRegistry, ModuleName, ModuleRef, ModuleView};
use crate::dispatch::DispatchTable;
use crate::enforce::{EnforcementReport, Enforcer};
use capgate_foundation::{CapgateConfig, ConflictPolicy, Error, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 로더 설정
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModuleLoaderConfig {
    /// 중복 모듈 이름을 에러로 처리
    pub strict_modules: bool,

    /// fallback 충돌 정책
    pub conflict_policy: ConflictPolicy,
}

impl From<&CapgateConfig> for ModuleLoaderConfig {
    fn from(config: &CapgateConfig) -> Self {
        Self {
            strict_modules: config.strict_modules(),
            conflict_policy: config.conflict_policy(),
        }
    }
}

/// 플러그인 로더
pub struct ModuleLoader {
    registry: Arc<CapabilityRegistry>,
    table: DispatchTable,
    modules: Vec<ModuleRef>,
    config: ModuleLoaderConfig,
}

impl ModuleLoader {
    pub fn new(config: ModuleLoaderConfig) -> Self {
        Self::with_registry(Arc::new(CapabilityRegistry::new()), config)
    }

    /// 기존 레지스트리와 함께 생성
    pub fn with_registry(registry: Arc<CapabilityRegistry>, config: ModuleLoaderConfig) -> Self {
        Self {
            registry,
            table: DispatchTable::new(),
            modules: Vec::new(),
            config,
        }
    }

    pub fn registry(&self) -> &Arc<CapabilityRegistry> {
        &self.registry
    }

    /// enforcement 이전의 dispatch table
    pub fn table(&self) -> &DispatchTable {
        &self.table
    }

    pub fn module_names(&self) -> Vec<&ModuleName> {
        self.modules.iter().map(ModuleRef::name).collect()
    }

    /// 모듈 로드 - 중복 모듈을 건너뛰면 false
    pub fn load<M: PluginModule + 'static>(&mut self, module: Arc<M>) -> Result<bool> {
        let this: ModuleRef = module.clone().into();

        if self.modules.contains(&this) {
            if self.config.strict_modules {
                return Err(Error::DuplicateModule(this.name().to_string()));
            }
            warn!("Module {} is already loaded, skipping", this.name());
            return Ok(false);
        }

        // 선언이 모두 성공한 경우에만 공유 레지스트리에 반영
        let staged = CapabilityRegistry::new();
        module.declare(&staged, &this)?;
        let declared = self.registry.absorb(staged);
        debug!("{} declared {} capability records", this.name(), declared);

        let functions = module.functions();
        let count = functions.len();
        for function in functions {
            let key = this.qualify(&function);
            if self.table.insert(key.clone(), function).is_some() {
                warn!("{} replaced an existing dispatch entry", key);
            } else {
                debug!("Registered {}", key);
            }
        }

        info!("Loaded module {} ({} functions)", this.name(), count);
        self.modules.push(this);
        Ok(true)
    }

    /// 여러 모듈 로드 - 실패한 모듈은 건너뛰고 나머지를 계속 로드
    pub fn load_all<M, I>(&mut self, modules: I) -> Vec<(ModuleName, Error)>
    where
        M: PluginModule + 'static,
        I: IntoIterator<Item = Arc<M>>,
    {
        let mut failures = Vec::new();
        for module in modules {
            let name = ModuleView::name(&*module).clone();
            if let Err(e) = self.load(module) {
                warn!("Failed to load module {}: {}", name, e);
                failures.push((name, e));
            }
        }
        failures
    }

    /// enforcement pass 실행 후 최종 dispatch table 반환
    pub fn finish(self) -> (DispatchTable, EnforcementReport) {
        let mut table = self.table;
        let report = Enforcer::new(&self.registry)
            .with_policy(self.config.conflict_policy)
            .enforce(&mut table);
        (table, report)
    }
}

impl Default for ModuleLoader {
    fn default() -> Self {
        Self::new(ModuleLoaderConfig::default())
    }
}
