//! Enforcement Pass - 레지스트리와 실제 모듈 상태를 맞춘다
//!
//! 모든 모듈 로드가 끝난 뒤 한 번 실행된다. 선언된 capability가 소유 모듈에
//! 없으면 dispatch table의 해당 항목을 fallback으로 교체하거나 삭제한다.
//!
//! 한 함수에 누락된 capability가 여러 개이면 그 결과를 한 번에 결정한다.
//! 누락된 레코드들의 fallback이 모두 같으면 그대로 적용하고, 서로 다르면
//! [`ConflictPolicy`]를 따른다. 결과는 순회 순서와 무관하다.

use crate::capability::{Callable, CapabilityName, CapabilityRegistry, ModuleName, QualifiedName};
use crate::dispatch::DispatchTable;
use capgate_foundation::ConflictPolicy;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, info, warn};

/// 누락된 capability 하나
#[derive(Debug, Clone)]
struct Missing {
    capability: CapabilityName,
    fallback: Option<Callable>,
}

/// 함수 하나에 대한 최종 처리
#[derive(Debug)]
enum Resolution {
    Substitute(Callable),
    Remove,
}

/// 모듈 조회 실패 (건너뛴 레코드)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnforcementIssue {
    pub module: ModuleName,
    pub capability: CapabilityName,
    pub message: String,
}

/// Enforcement pass 결과
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnforcementReport {
    /// 모든 capability가 있어 유지된 항목
    pub kept: Vec<QualifiedName>,
    /// fallback으로 교체된 항목
    pub substituted: Vec<QualifiedName>,
    /// 삭제된 항목
    pub removed: Vec<QualifiedName>,
    /// dispatch table에 없어 건너뛴 항목
    pub skipped_missing: Vec<QualifiedName>,
    /// 누락된 capability들의 처리 결과가 서로 달랐던 항목
    pub conflicts: Vec<QualifiedName>,
    pub errors: Vec<EnforcementIssue>,
}

impl EnforcementReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.conflicts.is_empty()
    }
}

impl fmt::Display for EnforcementReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "kept={} substituted={} removed={} skipped={} conflicts={} errors={}",
            self.kept.len(),
            self.substituted.len(),
            self.removed.len(),
            self.skipped_missing.len(),
            self.conflicts.len(),
            self.errors.len()
        )
    }
}

// ============================================================================
// Enforcer
// ============================================================================

pub struct Enforcer<'a> {
    registry: &'a CapabilityRegistry,
    policy: ConflictPolicy,
}

impl<'a> Enforcer<'a> {
    pub fn new(registry: &'a CapabilityRegistry) -> Self {
        Self {
            registry,
            policy: ConflictPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ConflictPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// dispatch table을 제자리에서 수정
    ///
    /// 레지스트리는 읽기만 한다. 두 번 실행해도 결과가 같다.
    pub fn enforce(&self, table: &mut DispatchTable) -> EnforcementReport {
        let mut report = EnforcementReport::default();
        let mut satisfied: BTreeSet<QualifiedName> = BTreeSet::new();
        let mut missing: BTreeMap<QualifiedName, Vec<Missing>> = BTreeMap::new();
        let mut touched: BTreeSet<QualifiedName> = BTreeSet::new();

        for (capability, records) in self.registry.snapshot() {
            for record in records {
                let key = record.qualified_name();
                match record.module.has_symbol(capability.as_str()) {
                    Ok(true) => {
                        debug!(
                            "Dependency ({}) already loaded inside {}, skipping",
                            capability,
                            record.module.name().short_name()
                        );
                        satisfied.insert(key);
                    }
                    Ok(false) => {
                        debug!(
                            "Unloading {} because dependency ({}) is not present",
                            key, capability
                        );
                        missing.entry(key).or_default().push(Missing {
                            capability: capability.clone(),
                            fallback: record.fallback,
                        });
                    }
                    Err(e) => {
                        warn!("Skipping {} for dependency ({}): {}", key, capability, e);
                        report.errors.push(EnforcementIssue {
                            module: record.module.name().clone(),
                            capability: capability.clone(),
                            message: e.to_string(),
                        });
                    }
                }
            }
        }

        for (key, mut absent) in missing {
            if !table.contains(key.as_str()) {
                debug!("{} not in dispatch table, skipping", key);
                report.skipped_missing.push(key);
                continue;
            }

            absent.sort_by(|a, b| {
                a.capability
                    .cmp(&b.capability)
                    .then_with(|| fallback_name(a).cmp(fallback_name(b)))
            });

            match self.resolve(&key, &absent, &mut report) {
                Resolution::Substitute(fallback) => {
                    debug!("Replacing {} with fallback {}", key, fallback.name());
                    table.replace(key.as_str(), fallback);
                    report.substituted.push(key.clone());
                }
                Resolution::Remove => {
                    debug!("Removing {} from dispatch table", key);
                    table.remove(key.as_str());
                    report.removed.push(key.clone());
                }
            }
            touched.insert(key);
        }

        report.kept = satisfied
            .into_iter()
            .filter(|key| table.contains(key.as_str()) && !touched.contains(key))
            .collect();

        info!("Capability enforcement finished: {}", report);
        report
    }

    /// `absent`는 capability 이름순으로 정렬되어 있다
    fn resolve(&self, key: &QualifiedName, absent: &[Missing], report: &mut EnforcementReport) -> Resolution {
        let first = &absent[0].fallback;
        if absent.iter().all(|m| &m.fallback == first) {
            return match first {
                Some(fallback) => Resolution::Substitute(fallback.clone()),
                None => Resolution::Remove,
            };
        }

        warn!(
            "Conflicting fallbacks for {} across dependencies {:?}, applying {:?}",
            key,
            absent.iter().map(|m| m.capability.as_str()).collect::<Vec<_>>(),
            self.policy
        );
        report.conflicts.push(key.clone());

        match self.policy {
            ConflictPolicy::Remove => Resolution::Remove,
            ConflictPolicy::PreferFallback => preferred_fallback(absent)
                .map(Resolution::Substitute)
                .unwrap_or(Resolution::Remove),
        }
    }
}

/// 이름이 가장 작은, fallback을 선언한 capability의 fallback
///
/// 같은 capability에 서로 다른 fallback이 둘 이상이면 None.
fn preferred_fallback(absent: &[Missing]) -> Option<Callable> {
    let capability = &absent.iter().find(|m| m.fallback.is_some())?.capability;

    let mut candidates = absent
        .iter()
        .filter(|m| &m.capability == capability)
        .filter_map(|m| m.fallback.as_ref());
    let chosen = candidates.next()?;
    if candidates.all(|other| other == chosen) {
        Some(chosen.clone())
    } else {
        None
    }
}

fn fallback_name(missing: &Missing) -> &str {
    missing.fallback.as_ref().map(Callable::name).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{ModuleRef, StaticModule};
    use serde_json::json;
    use std::sync::Arc;

    fn callable(name: &str) -> Callable {
        Callable::new(name, |_| Ok(json!(null)))
    }

    fn setup(symbols: &[&str]) -> (CapabilityRegistry, Arc<StaticModule>, ModuleRef) {
        let module = Arc::new(StaticModule::new("plugins.mod_a").with_symbols(symbols.iter().copied()));
        let module_ref: ModuleRef = module.clone().into();
        (CapabilityRegistry::new(), module, module_ref)
    }

    #[test]
    fn test_absent_without_fallback_removes() {
        let (registry, _module, mod_a) = setup(&[]);
        let func_x = registry.require(["foo_lib"]).unwrap().apply(&mod_a, callable("func_x"));

        let mut table = DispatchTable::new();
        table.insert("mod_a.func_x", func_x);

        let report = Enforcer::new(&registry).enforce(&mut table);
        assert!(table.is_empty());
        assert_eq!(report.removed, vec![QualifiedName::from("mod_a.func_x")]);
    }

    #[test]
    fn test_absent_with_fallback_substitutes() {
        let (registry, _module, mod_a) = setup(&[]);
        let fallback = callable("func_x_fallback");
        let func_x = registry
            .require(["foo_lib"])
            .unwrap()
            .with_fallback(fallback.clone())
            .apply(&mod_a, callable("func_x"));

        let mut table = DispatchTable::new();
        table.insert("mod_a.func_x", func_x);

        let report = Enforcer::new(&registry).enforce(&mut table);
        assert_eq!(table.get("mod_a.func_x"), Some(&fallback));
        assert_eq!(report.substituted.len(), 1);
    }

    #[test]
    fn test_present_leaves_untouched() {
        let (registry, _module, mod_a) = setup(&["foo_lib"]);
        registry.require(["foo_lib"]).unwrap().apply(&mod_a, callable("func_x"));

        // 테이블 값이 선언된 함수와 달라도 건드리지 않는다
        let other = callable("something_else");
        let mut table = DispatchTable::new();
        table.insert("mod_a.func_x", other.clone());

        let report = Enforcer::new(&registry).enforce(&mut table);
        assert_eq!(table.get("mod_a.func_x"), Some(&other));
        assert_eq!(report.kept, vec![QualifiedName::from("mod_a.func_x")]);
        assert!(report.is_clean());
    }

    #[test]
    fn test_missing_key_tolerated() {
        let (registry, _module, mod_a) = setup(&[]);
        registry.require(["foo_lib"]).unwrap().apply(&mod_a, callable("func_x"));

        let untouched = callable("func_y");
        let mut table = DispatchTable::new();
        table.insert("mod_a.func_y", untouched.clone());

        let report = Enforcer::new(&registry).enforce(&mut table);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("mod_a.func_y"), Some(&untouched));
        assert_eq!(report.skipped_missing, vec![QualifiedName::from("mod_a.func_x")]);
    }

    #[test]
    fn test_any_absent_capability_disables() {
        let (registry, _module, mod_a) = setup(&["foo_lib"]);
        let func_x = registry
            .require(["foo_lib", "bar_lib"])
            .unwrap()
            .apply(&mod_a, callable("func_x"));

        let mut table = DispatchTable::new();
        table.insert("mod_a.func_x", func_x);

        let report = Enforcer::new(&registry).enforce(&mut table);
        assert!(table.is_empty());
        assert!(report.kept.is_empty());
    }

    #[test]
    fn test_conflicting_fallbacks() {
        let (registry, _module, mod_a) = setup(&[]);
        let func_x = callable("func_x");
        let fallback_a = callable("fallback_a");
        registry
            .require(["a_lib"])
            .unwrap()
            .with_fallback(fallback_a.clone())
            .apply(&mod_a, func_x.clone());
        registry.require(["b_lib"]).unwrap().apply(&mod_a, func_x.clone());

        let mut table = DispatchTable::new();
        table.insert("mod_a.func_x", func_x.clone());
        let report = Enforcer::new(&registry).enforce(&mut table);
        assert!(table.is_empty());
        assert_eq!(report.conflicts, vec![QualifiedName::from("mod_a.func_x")]);

        let mut table = DispatchTable::new();
        table.insert("mod_a.func_x", func_x);
        Enforcer::new(&registry)
            .with_policy(ConflictPolicy::PreferFallback)
            .enforce(&mut table);
        assert_eq!(table.get("mod_a.func_x"), Some(&fallback_a));
    }

    #[test]
    fn test_introspection_error_skipped() {
        let (registry, module, mod_a) = setup(&[]);
        let func_x = registry.require(["foo_lib"]).unwrap().apply(&mod_a, callable("func_x"));
        module.mark_unreadable("namespace locked");

        let mut table = DispatchTable::new();
        table.insert("mod_a.func_x", func_x.clone());

        let report = Enforcer::new(&registry).enforce(&mut table);
        assert_eq!(table.get("mod_a.func_x"), Some(&func_x));
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].capability.as_str(), "foo_lib");
        assert!(!report.is_clean());
    }
}
