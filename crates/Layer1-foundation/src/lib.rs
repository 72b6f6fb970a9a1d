//! # capgate-foundation
//!
//! Foundation layer for capgate:
//! - Error: 공통 에러 타입 (Error, Result)
//! - Config: 통합 설정 (CapgateConfig, ConflictPolicy)
//! - Storage: JsonStore (설정 파일 로드/저장)
//! - EnvDetect: 실행 파일 탐색 (ExecutableLocator)
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  capgate-core (Registry / Enforcement / Guard)          │
//! │                     │                                   │
//! │          ┌──────────┴──────────┐                        │
//! │          ▼                     ▼                        │
//! │   CapgateConfig         ExecutableLocator               │
//! │   (JsonStore)           (which, search paths)           │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod env_detect;
pub mod error;
pub mod storage;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{CapgateConfig, ConflictPolicy, CAPGATE_CONFIG_FILE};

// ============================================================================
// Storage (저장소)
// ============================================================================
pub use storage::JsonStore;

// ============================================================================
// Env Detect (실행 파일 탐색)
// ============================================================================
pub use env_detect::{ExecutableLocator, PathLocator, StaticLocator};
