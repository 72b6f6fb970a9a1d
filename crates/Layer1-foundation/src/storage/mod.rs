//! Storage module for capgate
//!
//! - `json`: JSON - 설정 파일 저장/로드

pub(crate) mod json;

// JSON Storage (설정)
pub use json::JsonStore;
