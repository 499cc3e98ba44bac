//! 설정 관리 -- normlog.toml 파싱 및 런타임 설정
//!
//! [`NormlogConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. 환경변수 (`NORMLOG_PIPELINE_MAX_RECORD_SIZE=65536` 형식)
//! 2. 설정 파일 (`normlog.toml`)
//! 3. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), normlog_core::error::NormlogError> {
//! use normlog_core::config::NormlogConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = NormlogConfig::load("normlog.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = NormlogConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, NormlogError};

/// 단일 레코드 페이로드 최대 크기 상한 (64MB)
const MAX_RECORD_SIZE_LIMIT: usize = 64 * 1024 * 1024;

/// normlog 통합 설정
///
/// `normlog.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormlogConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 정규화 파이프라인 설정
    #[serde(default)]
    pub pipeline: PipelineSection,
}

impl NormlogConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, NormlogError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, NormlogError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                NormlogError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                NormlogError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, NormlogError> {
        toml::from_str(toml_str).map_err(|e| {
            NormlogError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `NORMLOG_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        override_string(&mut self.general.log_level, "NORMLOG_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "NORMLOG_GENERAL_LOG_FORMAT");

        override_usize(
            &mut self.pipeline.max_record_size,
            "NORMLOG_PIPELINE_MAX_RECORD_SIZE",
        );
        override_bool(
            &mut self.pipeline.strict_timestamps,
            "NORMLOG_PIPELINE_STRICT_TIMESTAMPS",
        );
        override_csv(
            &mut self.pipeline.enabled_log_types,
            "NORMLOG_PIPELINE_ENABLED_LOG_TYPES",
        );
        override_usize(
            &mut self.pipeline.encoder_buffer_capacity,
            "NORMLOG_PIPELINE_ENCODER_BUFFER_CAPACITY",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), NormlogError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if self.pipeline.max_record_size == 0 || self.pipeline.max_record_size > MAX_RECORD_SIZE_LIMIT
        {
            return Err(ConfigError::InvalidValue {
                field: "pipeline.max_record_size".to_owned(),
                reason: format!("must be 1-{MAX_RECORD_SIZE_LIMIT}"),
            }
            .into());
        }

        if self.pipeline.encoder_buffer_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pipeline.encoder_buffer_capacity".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        if let Some(empty) = self
            .pipeline
            .enabled_log_types
            .iter()
            .position(|t| t.trim().is_empty())
        {
            return Err(ConfigError::InvalidValue {
                field: "pipeline.enabled_log_types".to_owned(),
                reason: format!("entry {empty} is empty"),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// 정규화 파이프라인 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSection {
    /// 페이로드 하나의 최대 크기 (바이트)
    pub max_record_size: usize,
    /// 타임스탬프 필드를 RFC 3339로 엄격하게 검증할지 여부
    pub strict_timestamps: bool,
    /// 등록할 로그 타입 (비어 있으면 전체)
    pub enabled_log_types: Vec<String>,
    /// 인코더 스크래치 버퍼 초기 용량 (바이트)
    pub encoder_buffer_capacity: usize,
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            max_record_size: 1024 * 1024, // 1MB
            strict_timestamps: false,
            enabled_log_types: Vec::new(),
            encoder_buffer_capacity: 4096,
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
    }
}
