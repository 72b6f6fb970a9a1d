//! Capability types - 이름 타입과 호출 가능 객체

use capgate_foundation::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

macro_rules! name_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

name_type!(
    /// 모듈이 노출해야 하는 심볼 이름 (라이브러리, 감지된 바이너리 등)
    CapabilityName
);

name_type!(
    /// 플러그인 모듈의 전체 이름 (예: `plugins.net.mod_a`)
    ModuleName
);

name_type!(
    /// Dispatch table 키 - `<모듈 short name>.<함수 이름>`
    QualifiedName
);

impl ModuleName {
    /// 마지막 `.` 이후 부분
    pub fn short_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }
}

impl QualifiedName {
    pub fn for_function(module: &ModuleName, function: &str) -> Self {
        Self(format!("{}.{}", module.short_name(), function))
    }
}

// ============================================================================
// Callable
// ============================================================================

type Body = dyn Fn(&[Value]) -> Result<Value> + Send + Sync;

/// 이름이 붙은 호출 가능 객체
///
/// 복제본은 같은 구현을 공유하며 서로 동일하게 비교된다. 같은 이름이라도
/// 따로 생성된 `Callable`은 서로 다르다.
#[derive(Clone)]
pub struct Callable {
    name: Arc<str>,
    body: Arc<Body>,
}

impl Callable {
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name.into()),
            body: Arc::new(body),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, args: &[Value]) -> Result<Value> {
        (self.body)(args)
    }

    fn identity(&self) -> *const () {
        Arc::as_ptr(&self.body) as *const ()
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.identity() == other.identity()
    }
}

impl Eq for Callable {}

impl Hash for Callable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        (self.identity() as usize).hash(state);
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Callable").field(&self.name).finish()
    }
}
