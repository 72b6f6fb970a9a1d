//! # Plugin Loading
//!
//! 플러그인 모듈을 로드하고 dispatch table을 구성한다.
//!
//! ```text
//! load(mod_a) ─┐
//! load(mod_b) ─┼─> CapabilityRegistry + DispatchTable ──finish()──> Enforcer
//! load(mod_c) ─┘
//! ```

mod loader;
mod manifest;
mod traits;

pub use loader::{ModuleLoader, ModuleLoaderConfig};
pub use manifest::{FunctionManifest, ManifestModule, ModuleManifest, PluginManifest};
pub use traits::PluginModule;
