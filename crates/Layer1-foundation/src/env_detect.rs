//! Environment Detection - 실행 파일 탐색
//!
//! 외부 실행 파일이 호스트에 설치되어 있는지 확인합니다.
//! `which` 크레이트로 `$PATH`를 검색하고, 설정된 추가 경로도 확인합니다.

use crate::config::CapgateConfig;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// 실행 파일 탐색 인터페이스
pub trait ExecutableLocator: Send + Sync {
    /// 실행 파일 경로 반환 (찾지 못하면 None)
    fn locate(&self, name: &str) -> Option<PathBuf>;

    /// 실행 파일 존재 여부
    fn is_available(&self, name: &str) -> bool {
        self.locate(name).is_some()
    }
}

// ============================================================================
// PathLocator - $PATH + 추가 검색 경로
// ============================================================================

/// `$PATH`와 추가 디렉토리를 검색하는 기본 탐색기
#[derive(Debug, Clone, Default)]
pub struct PathLocator {
    extra_paths: Vec<PathBuf>,
}

impl PathLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 설정의 search_paths 사용
    pub fn from_config(config: &CapgateConfig) -> Self {
        Self {
            extra_paths: config.search_paths.clone(),
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.extra_paths.push(path.into());
        self
    }

    pub fn extra_paths(&self) -> &[PathBuf] {
        &self.extra_paths
    }
}

impl ExecutableLocator for PathLocator {
    fn locate(&self, name: &str) -> Option<PathBuf> {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }

        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        for dir in &self.extra_paths {
            if let Ok(path) = which::which_in(name, Some(dir), &cwd) {
                return Some(path);
            }
        }

        debug!("Executable '{}' not found", name);
        None
    }
}

// ============================================================================
// StaticLocator - 고정된 목록 (테스트/데모용)
// ============================================================================

/// 미리 지정된 실행 파일만 찾는 탐색기
#[derive(Debug, Clone, Default)]
pub struct StaticLocator {
    known: HashMap<String, PathBuf>,
}

impl StaticLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.known.insert(name.into(), path.into());
        self
    }
}

impl ExecutableLocator for StaticLocator {
    fn locate(&self, name: &str) -> Option<PathBuf> {
        self.known.get(name).cloned()
    }
}
