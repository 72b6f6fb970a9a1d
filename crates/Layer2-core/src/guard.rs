//! Executable Guard - 호출 전에 외부 실행 파일 존재 여부 확인
//!
//! 레지스트리와는 독립적이다. 실행 파일이 없으면 함수 본문을 실행하지 않고
//! [`Error::CommandNotFound`]를 반환한다.

use crate::capability::Callable;
use capgate_foundation::{CapgateConfig, Error, ExecutableLocator, PathLocator};
use std::sync::Arc;
use tracing::debug;

/// `function`을 감싸서 매 호출 전에 `executable`을 확인
///
/// 반환되는 함수는 원래 이름을 유지한다.
pub fn require_executable(
    executable: impl Into<String>,
    function: Callable,
    locator: Arc<dyn ExecutableLocator>,
) -> Callable {
    let executable = executable.into();
    let name = function.name().to_string();

    Callable::new(name, move |args| {
        if locator.locate(&executable).is_none() {
            debug!("Refusing to call {}: '{}' not found", function.name(), executable);
            return Err(Error::CommandNotFound(executable.clone()));
        }
        function.call(args)
    })
}

/// 하나의 locator를 여러 함수가 공유하는 guard
#[derive(Clone)]
pub struct ExecutableGuard {
    locator: Arc<dyn ExecutableLocator>,
}

impl ExecutableGuard {
    pub fn new(locator: Arc<dyn ExecutableLocator>) -> Self {
        Self { locator }
    }

    /// `$PATH` + 설정의 search_paths 사용
    pub fn from_config(config: &CapgateConfig) -> Self {
        Self::new(Arc::new(PathLocator::from_config(config)))
    }

    pub fn wrap(&self, executable: impl Into<String>, function: Callable) -> Callable {
        require_executable(executable, function, Arc::clone(&self.locator))
    }

    pub fn is_available(&self, executable: &str) -> bool {
        self.locator.is_available(executable)
    }

    pub fn locator(&self) -> &Arc<dyn ExecutableLocator> {
        &self.locator
    }
}

impl Default for ExecutableGuard {
    fn default() -> Self {
        Self::new(Arc::new(PathLocator::new()))
    }
}
