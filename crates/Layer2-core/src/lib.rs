//! # capgate-core
//!
//! Capability-gated function registry for plugin module loaders.
//!
//! - **capability**: 함수별 capability 선언 (CapabilityRegistry, Declaration)
//! - **dispatch**: 함수 이름 -> 구현 테이블 (DispatchTable)
//! - **enforce**: 모듈 로드 후 한 번 실행하는 enforcement pass (Enforcer)
//! - **guard**: 외부 실행 파일 확인 래퍼 (require_executable)
//! - **plugin**: 모듈 로더와 JSON 매니페스트 (ModuleLoader, PluginManifest)
//!
//! ## 예시
//!
//! ```ignore
//! let registry = CapabilityRegistry::new();
//! let func_x = registry
//!     .require(["foo_lib"])?
//!     .with_fallback(func_x_fallback)
//!     .apply(&mod_a, func_x);
//!
//! let mut table = DispatchTable::new();
//! table.insert("mod_a.func_x", func_x);
//!
//! let report = Enforcer::new(&registry).enforce(&mut table);
//! ```

pub mod capability;
pub mod dispatch;
pub mod enforce;
pub mod guard;
pub mod plugin;

// Re-exports
pub use capability::{
    Callable, CapabilityName, CapabilityRegistry, Declaration, FunctionRecord, ModuleName,
    ModuleRef, ModuleView, QualifiedName, RegistrySnapshot, StaticModule,
};
pub use dispatch::DispatchTable;
pub use enforce::{EnforcementIssue, EnforcementReport, Enforcer};
pub use guard::{require_executable, ExecutableGuard};
pub use plugin::{
    FunctionManifest, ManifestModule, ModuleLoader, ModuleLoaderConfig, ModuleManifest,
    PluginManifest, PluginModule,
};

// Foundation re-exports
pub use capgate_foundation::{
    CapgateConfig, ConflictPolicy, Error, ExecutableLocator, PathLocator, Result, StaticLocator,
};
