//! Dispatch Table - 함수 이름 -> 구현

use crate::capability::{Callable, QualifiedName};
use capgate_foundation::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;

/// 로더가 만드는 실행 테이블
///
/// 기존 항목의 교체/삭제는 enforcement pass만 수행한다.
#[derive(Debug, Clone, Default)]
pub struct DispatchTable {
    entries: HashMap<QualifiedName, Callable>,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 항목 등록 (로더용)
    pub fn insert(&mut self, key: impl Into<QualifiedName>, callable: Callable) -> Option<Callable> {
        self.entries.insert(key.into(), callable)
    }

    pub fn get(&self, key: &str) -> Option<&Callable> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// 정렬된 키 목록
    pub fn keys(&self) -> Vec<&QualifiedName> {
        let mut keys: Vec<_> = self.entries.keys().collect();
        keys.sort();
        keys
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QualifiedName, &Callable)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 키로 함수 호출
    pub fn call(&self, key: &str, args: &[Value]) -> Result<Value> {
        let callable = self
            .get(key)
            .ok_or_else(|| Error::FunctionNotFound(key.to_string()))?;
        callable.call(args)
    }

    /// 기존 항목만 교체 - 없으면 false
    pub(crate) fn replace(&mut self, key: &str, callable: Callable) -> bool {
        match self.entries.get_mut(key) {
            Some(slot) => {
                *slot = callable;
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove(&mut self, key: &str) -> Option<Callable> {
        self.entries.remove(key)
    }
}
