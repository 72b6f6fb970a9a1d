//! Capgate Config - 통합 설정
//!
//! 글로벌 설정과 프로젝트 설정을 병합하여 사용

use crate::storage::json::read_json;
use crate::storage::JsonStore;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// 설정 파일명
pub const CAPGATE_CONFIG_FILE: &str = "config.json";

// ============================================================================
// ConflictPolicy
// ============================================================================

/// 하나의 함수에서 누락된 capability가 여러 개이고, 각각의 처리 결과
/// (fallback 교체 / 삭제)가 서로 다를 때 적용할 정책
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConflictPolicy {
    /// dispatch table에서 항목 삭제
    #[default]
    Remove,

    /// 이름이 가장 작은 누락 capability 중 fallback을 선언한 것을 사용
    PreferFallback,
}

// ============================================================================
// Capgate Config (통합)
// ============================================================================

/// capgate 통합 설정
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapgateConfig {
    /// fallback 충돌 정책
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflict_policy: Option<ConflictPolicy>,

    /// $PATH 이후에 검색할 추가 디렉토리
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub search_paths: Vec<PathBuf>,

    /// 중복 모듈 이름을 에러로 처리할지 여부
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict_modules: Option<bool>,
}

impl CapgateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Load / Save
    // ========================================================================

    /// 글로벌 + 프로젝트 병합 로드
    pub fn load() -> Result<Self> {
        let mut config = Self::new();

        // 1. 글로벌 설정
        if let Ok(global) = JsonStore::global() {
            if let Some(global_config) = global.load_optional::<CapgateConfig>(CAPGATE_CONFIG_FILE)? {
                debug!("Loaded global config from {}", global.base_dir().display());
                config.merge(global_config);
            }
        }

        // 2. 프로젝트 설정
        let project = JsonStore::current_project()?;
        if let Some(project_config) = project.load_optional::<CapgateConfig>(CAPGATE_CONFIG_FILE)? {
            debug!("Loaded project config from {}", project.base_dir().display());
            config.merge(project_config);
        }

        Ok(config)
    }

    /// 지정한 파일 하나만 로드
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        read_json(path.as_ref())
    }

    /// 지정한 저장소에서 로드 (없으면 기본값)
    pub fn load_store(store: &JsonStore) -> Result<Self> {
        Ok(store
            .load_optional::<CapgateConfig>(CAPGATE_CONFIG_FILE)?
            .unwrap_or_default())
    }

    /// 지정한 저장소에 저장
    pub fn save_to(&self, store: &JsonStore) -> Result<()> {
        store.save(CAPGATE_CONFIG_FILE, self)
    }

    // ========================================================================
    // Merge
    // ========================================================================

    /// 다른 설정과 병합 (other가 우선, search_paths는 누적)
    pub fn merge(&mut self, other: CapgateConfig) {
        if other.conflict_policy.is_some() {
            self.conflict_policy = other.conflict_policy;
        }
        if other.strict_modules.is_some() {
            self.strict_modules = other.strict_modules;
        }
        for path in other.search_paths {
            if !self.search_paths.contains(&path) {
                self.search_paths.push(path);
            }
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn conflict_policy(&self) -> ConflictPolicy {
        self.conflict_policy.unwrap_or_default()
    }

    pub fn strict_modules(&self) -> bool {
        self.strict_modules.unwrap_or(false)
    }

    // ========================================================================
    // Builder
    // ========================================================================

    pub fn with_conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = Some(policy);
        self
    }

    pub fn with_search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_paths.push(path.into());
        self
    }

    pub fn with_strict_modules(mut self, strict: bool) -> Self {
        self.strict_modules = Some(strict);
        self
    }
}
