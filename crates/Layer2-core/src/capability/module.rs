//! Module view - 모듈 네임스페이스 조회 인터페이스

use super::types::{Callable, ModuleName, QualifiedName};
use capgate_foundation::{Error, Result};
use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// 로더가 제공하는 모듈 조회 인터페이스
///
/// Enforcement pass는 이 trait을 통해서만 모듈을 읽는다.
pub trait ModuleView: Send + Sync {
    /// 모듈 전체 이름
    fn name(&self) -> &ModuleName;

    /// 최상위 공개 심볼에 `symbol`이 있는지 확인
    ///
    /// 심볼 테이블을 읽을 수 없는 경우 [`Error::Introspection`]을 반환한다.
    fn has_symbol(&self, symbol: &str) -> Result<bool>;
}

// ============================================================================
// ModuleRef
// ============================================================================

/// 모듈 식별자 - 모듈 이름으로 비교/해시
#[derive(Clone)]
pub struct ModuleRef(Arc<dyn ModuleView>);

impl ModuleRef {
    pub fn new(view: Arc<dyn ModuleView>) -> Self {
        Self(view)
    }

    pub fn name(&self) -> &ModuleName {
        self.0.name()
    }

    pub fn has_symbol(&self, symbol: &str) -> Result<bool> {
        self.0.has_symbol(symbol)
    }

    /// 이 모듈에 속한 함수의 dispatch 키
    pub fn qualify(&self, function: &Callable) -> QualifiedName {
        QualifiedName::for_function(self.name(), function.name())
    }
}

impl<M: ModuleView + 'static> From<Arc<M>> for ModuleRef {
    fn from(view: Arc<M>) -> Self {
        Self(view)
    }
}

impl PartialEq for ModuleRef {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for ModuleRef {}

impl Hash for ModuleRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name().hash(state);
    }
}

impl fmt::Debug for ModuleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ModuleRef").field(self.name()).finish()
    }
}

// ============================================================================
// StaticModule
// ============================================================================

/// 메모리 내 심볼 집합으로 구성된 모듈
pub struct StaticModule {
    name: ModuleName,
    symbols: RwLock<BTreeSet<String>>,
    /// Some이면 심볼 조회가 실패한다
    unreadable: RwLock<Option<String>>,
}

impl StaticModule {
    pub fn new(name: impl Into<ModuleName>) -> Self {
        Self {
            name: name.into(),
            symbols: RwLock::new(BTreeSet::new()),
            unreadable: RwLock::new(None),
        }
    }

    pub fn with_symbol(self, symbol: impl Into<String>) -> Self {
        self.symbols.write().insert(symbol.into());
        self
    }

    pub fn with_symbols<I, S>(self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.symbols.write().extend(symbols.into_iter().map(Into::into));
        self
    }

    /// 심볼 추가 (예: 라이브러리 import 성공)
    pub fn expose(&self, symbol: impl Into<String>) {
        self.symbols.write().insert(symbol.into());
    }

    /// 심볼 제거
    pub fn hide(&self, symbol: &str) -> bool {
        self.symbols.write().remove(symbol)
    }

    /// 심볼 테이블 조회를 실패 상태로 전환
    pub fn mark_unreadable(&self, reason: impl Into<String>) {
        *self.unreadable.write() = Some(reason.into());
    }

    pub fn symbols(&self) -> Vec<String> {
        self.symbols.read().iter().cloned().collect()
    }
}

impl ModuleView for StaticModule {
    fn name(&self) -> &ModuleName {
        &self.name
    }

    fn has_symbol(&self, symbol: &str) -> Result<bool> {
        if let Some(reason) = self.unreadable.read().as_ref() {
            return Err(Error::introspection(self.name.as_str(), reason.clone()));
        }
        Ok(self.symbols.read().contains(symbol))
    }
}
