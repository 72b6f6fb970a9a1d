//! Plugin traits - 로더가 다루는 플러그인 모듈 인터페이스

use crate::capability::{Callable, CapabilityRegistry, ModuleRef, ModuleView};
use capgate_foundation::Result;

/// 로더가 import하는 플러그인 모듈
pub trait PluginModule: ModuleView {
    /// 모듈이 공개하는 함수 목록 (dispatch table에 등록됨)
    fn functions(&self) -> Vec<Callable>;

    /// 함수별 capability 선언
    ///
    /// `this`는 이 모듈 자신의 식별자다. 선언은 항상 소유 모듈 기준이다.
    fn declare(&self, _registry: &CapabilityRegistry, _this: &ModuleRef) -> Result<()> {
        Ok(())
    }
}
