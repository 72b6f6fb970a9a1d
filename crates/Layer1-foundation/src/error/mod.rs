//! Error types for capgate
//!
//! 모든 에러를 중앙에서 관리

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// capgate 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 설정 관련
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // 선언 관련
    // ========================================================================
    #[error("Capability declaration requires at least one capability name")]
    EmptyCapabilityList,

    // ========================================================================
    // Enforcement 관련
    // ========================================================================
    #[error("Cannot inspect module {module}: {message}")]
    Introspection { module: String, message: String },

    // ========================================================================
    // Guard 관련
    // ========================================================================
    #[error("The '{0}' binary was not found in $PATH.")]
    CommandNotFound(String),

    // ========================================================================
    // Dispatch / Loader 관련
    // ========================================================================
    #[error("Function not found: {0}")]
    FunctionNotFound(String),

    #[error("Module already loaded: {0}")]
    DuplicateModule(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// 사용자에게 보여줄 수 있는 에러인지 확인
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Error::CommandNotFound(_)
                | Error::FunctionNotFound(_)
                | Error::InvalidInput(_)
                | Error::Config(_)
        )
    }

    /// Introspection 에러 생성 헬퍼
    pub fn introspection(module: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Introspection {
            module: module.into(),
            message: message.into(),
        }
    }
}
