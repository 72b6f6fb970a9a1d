//! Capability Registry - capability 선언 저장소

use super::module::ModuleRef;
use super::types::{CapabilityName, Callable, ModuleName, QualifiedName};
use capgate_foundation::{Error, Result};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// 레지스트리 내용의 값 복사본
pub type RegistrySnapshot = BTreeMap<CapabilityName, HashSet<FunctionRecord>>;

// ============================================================================
// FunctionRecord
// ============================================================================

/// (소유 모듈, 함수, fallback) - 세 필드가 모두 같을 때만 동일
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionRecord {
    pub module: ModuleRef,
    pub function: Callable,
    pub fallback: Option<Callable>,
}

impl FunctionRecord {
    pub fn new(module: ModuleRef, function: Callable, fallback: Option<Callable>) -> Self {
        Self {
            module,
            function,
            fallback,
        }
    }

    pub fn qualified_name(&self) -> QualifiedName {
        self.module.qualify(&self.function)
    }
}

// ============================================================================
// CapabilityRegistry
// ============================================================================

/// capability 이름 -> 해당 capability를 요구하는 함수 레코드 집합
///
/// 로더가 생성해서 선언 지점과 enforcement pass에 참조로 전달한다.
/// 선언은 추가만 가능하며 제거 API는 없다.
#[derive(Default)]
pub struct CapabilityRegistry {
    entries: RwLock<BTreeMap<CapabilityName, HashSet<FunctionRecord>>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// capability 선언 시작
    ///
    /// ```ignore
    /// let f = registry
    ///     .require(["foo_lib"])?
    ///     .with_fallback(func_x_fallback)
    ///     .apply(&module, func_x);
    /// ```
    pub fn require<I, S>(&self, capabilities: I) -> Result<Declaration<'_>>
    where
        I: IntoIterator<Item = S>,
        S: Into<CapabilityName>,
    {
        let capabilities: Vec<CapabilityName> = capabilities.into_iter().map(Into::into).collect();
        if capabilities.is_empty() {
            return Err(Error::EmptyCapabilityList);
        }

        debug!("Depends declaration created with capabilities {:?}", capabilities);
        Ok(Declaration {
            registry: self,
            capabilities,
            fallback: None,
        })
    }

    /// 레코드 하나 추가 - 이미 있으면 false
    pub fn insert(&self, capability: CapabilityName, record: FunctionRecord) -> bool {
        self.entries.write().entry(capability).or_default().insert(record)
    }

    /// capability를 요구하는 레코드 목록
    pub fn records_for(&self, capability: &str) -> Vec<FunctionRecord> {
        self.entries
            .read()
            .get(capability)
            .map(|records| records.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// 등록된 capability 이름 (정렬됨)
    pub fn capabilities(&self) -> Vec<CapabilityName> {
        self.entries.read().keys().cloned().collect()
    }

    /// 특정 함수가 요구하는 capability 목록 (정렬됨)
    pub fn requirements_of(&self, module: &ModuleName, function: &str) -> Vec<CapabilityName> {
        self.entries
            .read()
            .iter()
            .filter(|(_, records)| {
                records
                    .iter()
                    .any(|r| r.module.name() == module && r.function.name() == function)
            })
            .map(|(capability, _)| capability.clone())
            .collect()
    }

    /// (capability, 레코드) 쌍의 수
    pub fn len(&self) -> usize {
        self.entries.read().values().map(HashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 다른 레지스트리의 레코드를 모두 옮겨온다 - 새로 추가된 수 반환
    pub fn absorb(&self, staged: CapabilityRegistry) -> usize {
        let staged = staged.entries.into_inner();
        let mut entries = self.entries.write();
        let mut added = 0;
        for (capability, records) in staged {
            let bucket = entries.entry(capability).or_default();
            for record in records {
                if bucket.insert(record) {
                    added += 1;
                }
            }
        }
        added
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        self.entries.read().clone()
    }
}

// ============================================================================
// Declaration
// ============================================================================

/// capability 선언 - 하나의 선언을 여러 함수에 적용할 수 있다
#[derive(Debug, Clone)]
pub struct Declaration<'a> {
    registry: &'a CapabilityRegistry,
    capabilities: Vec<CapabilityName>,
    fallback: Option<Callable>,
}

impl Declaration<'_> {
    /// capability가 없을 때 대신 사용할 함수
    pub fn with_fallback(mut self, fallback: Callable) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn capabilities(&self) -> &[CapabilityName] {
        &self.capabilities
    }

    pub fn fallback(&self) -> Option<&Callable> {
        self.fallback.as_ref()
    }

    /// `module`에 정의된 `function`에 선언 적용 - 함수를 그대로 반환
    pub fn apply(&self, module: &ModuleRef, function: Callable) -> Callable {
        for capability in &self.capabilities {
            let record = FunctionRecord::new(module.clone(), function.clone(), self.fallback.clone());
            if self.registry.insert(capability.clone(), record) {
                debug!(
                    "Registered {}.{} as depending on {}",
                    module.name(),
                    function.name(),
                    capability
                );
            }
        }
        function
    }
}

impl std::fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityRegistry")
            .field("capabilities", &self.capabilities())
            .field("records", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::StaticModule;
    use serde_json::json;
    use std::sync::Arc;

    fn module(name: &str) -> ModuleRef {
        Arc::new(StaticModule::new(name)).into()
    }

    fn callable(name: &str) -> Callable {
        Callable::new(name, |_| Ok(json!(null)))
    }

    #[test]
    fn test_empty_capability_list() {
        let registry = CapabilityRegistry::new();
        let result = registry.require(Vec::<&str>::new());
        assert!(matches!(result, Err(Error::EmptyCapabilityList)));
    }

    #[test]
    fn test_apply_returns_function_unchanged() {
        let registry = CapabilityRegistry::new();
        let mod_a = module("plugins.mod_a");
        let func_x = Callable::new("func_x", |_| Ok(json!("x")));

        let returned = registry.require(["foo_lib"]).unwrap().apply(&mod_a, func_x.clone());
        assert_eq!(returned, func_x);
        assert_eq!(returned.call(&[]).unwrap(), json!("x"));
    }

    #[test]
    fn test_idempotent_declaration() {
        let registry = CapabilityRegistry::new();
        let mod_a = module("plugins.mod_a");
        let func_x = callable("func_x");
        let fallback = callable("func_x_fallback");

        let declaration = registry
            .require(["foo_lib", "bar_lib"])
            .unwrap()
            .with_fallback(fallback);
        declaration.apply(&mod_a, func_x.clone());
        let once = registry.snapshot();

        declaration.apply(&mod_a, func_x);
        assert_eq!(registry.snapshot(), once);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_multiple_capabilities() {
        let registry = CapabilityRegistry::new();
        let mod_a = module("plugins.mod_a");

        registry
            .require(["foo_lib", "bar_lib"])
            .unwrap()
            .apply(&mod_a, callable("func_x"));

        assert_eq!(
            registry.capabilities(),
            vec![CapabilityName::from("bar_lib"), CapabilityName::from("foo_lib")]
        );
        assert_eq!(
            registry.requirements_of(mod_a.name(), "func_x"),
            vec![CapabilityName::from("bar_lib"), CapabilityName::from("foo_lib")]
        );
        assert_eq!(registry.records_for("foo_lib").len(), 1);
        assert!(registry.records_for("missing").is_empty());
    }

    #[test]
    fn test_different_fallbacks_are_distinct_records() {
        let registry = CapabilityRegistry::new();
        let mod_a = module("plugins.mod_a");
        let func_x = callable("func_x");

        registry.require(["foo_lib"]).unwrap().apply(&mod_a, func_x.clone());
        registry
            .require(["foo_lib"])
            .unwrap()
            .with_fallback(callable("func_x_fallback"))
            .apply(&mod_a, func_x);

        assert_eq!(registry.records_for("foo_lib").len(), 2);
    }

    #[test]
    fn test_absorb_staged_records() {
        let registry = CapabilityRegistry::new();
        let mod_a = module("plugins.mod_a");
        let func_x = callable("func_x");
        registry.require(["foo_lib"]).unwrap().apply(&mod_a, func_x.clone());

        let staged = CapabilityRegistry::new();
        staged.require(["foo_lib", "bar_lib"]).unwrap().apply(&mod_a, func_x);

        assert_eq!(registry.absorb(staged), 1);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_record_qualified_name() {
        let record = FunctionRecord::new(module("salt.modules.mod_a"), callable("func_x"), None);
        assert_eq!(record.qualified_name().as_str(), "mod_a.func_x");
    }
}
