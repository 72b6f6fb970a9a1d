//! # Capability Registry
//!
//! 함수별로 필요한 capability(모듈이 노출해야 하는 심볼)를 선언하고 저장한다.
//!
//! ## 구조
//!
//! ```text
//! CapabilityRegistry
//!   "foo_lib" -> { (mod_a, func_x, None), (mod_b, func_y, Some(fallback)) }
//!   "bar_lib" -> { (mod_a, func_x, None) }
//! ```
//!
//! 선언 시점에는 저장만 하고, 실제 검사는 [`crate::enforce::Enforcer`]가
//! 모든 모듈 로드가 끝난 뒤 한 번 수행한다.

mod module;
mod registry;
mod types;

pub use module::{ModuleRef, ModuleView, StaticModule};
pub use registry::{CapabilityRegistry, Declaration, FunctionRecord, RegistrySnapshot};
pub use types::{Callable, CapabilityName, ModuleName, QualifiedName};
