//! Config - 통합 설정 관리
//!
//! - `capgate.rs` - CapgateConfig 통합 설정

mod capgate;

pub use capgate::{CapgateConfig, ConflictPolicy, CAPGATE_CONFIG_FILE};
