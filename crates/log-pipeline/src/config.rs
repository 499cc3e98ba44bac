//! 로그 파이프라인 설정
//!
//! [`PipelineConfig`]는 core의 [`PipelineSection`](normlog_core::config::PipelineSection)을
//! 기반으로 레지스트리, 파서, 인코더 설정을 제공합니다.
//!
//! # 사용 예시
//! ```
//! use normlog_core::config::NormlogConfig;
//! use normlog_log_pipeline::config::PipelineConfig;
//!
//! let core_config = NormlogConfig::default();
//! let config = PipelineConfig::from_core(&core_config.pipeline);
//! config.validate().unwrap();
//! ```

use normlog_core::config::PipelineSection;
use serde::{Deserialize, Serialize};

use crate::error::LogPipelineError;

const MAX_RECORD_SIZE_LIMIT: usize = 64 * 1024 * 1024;
const DEFAULT_MAX_RETAINED_CAPACITY: usize = 1024 * 1024;

/// 로그 파이프라인 설정
///
/// core의 `PipelineSection`에서 파생되며, 인코더 내부에서
/// 사용하는 추가 설정을 포함합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// 페이로드 하나의 최대 크기 (바이트)
    pub max_record_size: usize,
    /// 타임스탬프 필드를 RFC 3339로 엄격하게 검증할지 여부
    pub strict_timestamps: bool,
    /// 등록할 내장 로그 타입 (비어 있으면 전체)
    pub enabled_log_types: Vec<String>,
    /// 인코더 스크래치 버퍼 초기 용량 (바이트)
    pub encoder_buffer_capacity: usize,

    // --- 확장 설정 (core에 없는 추가 필드) ---
    /// 쓰기 후 유지할 스크래치 버퍼 최대 용량 (바이트)
    pub encoder_max_retained_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_record_size: 1024 * 1024,
            strict_timestamps: false,
            enabled_log_types: Vec::new(),
            encoder_buffer_capacity: 4096,
            encoder_max_retained_capacity: DEFAULT_MAX_RETAINED_CAPACITY,
        }
    }
}

impl PipelineConfig {
    /// core의 `PipelineSection`에서 파이프라인 설정을 생성합니다.
    ///
    /// core 설정에 없는 확장 필드는 기본값이 적용됩니다.
    /// 유지 용량은 초기 버퍼 용량보다 작아지지 않습니다.
    pub fn from_core(core: &PipelineSection) -> Self {
        Self {
            max_record_size: core.max_record_size,
            strict_timestamps: core.strict_timestamps,
            enabled_log_types: core.enabled_log_types.clone(),
            encoder_buffer_capacity: core.encoder_buffer_capacity,
            encoder_max_retained_capacity: DEFAULT_MAX_RETAINED_CAPACITY
                .max(core.encoder_buffer_capacity),
        }
    }

    /// 로그 타입이 활성화되어 있는지 확인합니다.
    pub fn is_enabled(&self, log_type: &str) -> bool {
        self.enabled_log_types.is_empty() || self.enabled_log_types.iter().any(|t| t == log_type)
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LogPipelineError> {
        if self.max_record_size == 0 || self.max_record_size > MAX_RECORD_SIZE_LIMIT {
            return Err(LogPipelineError::Config {
                field: "max_record_size".to_owned(),
                reason: format!("must be 1-{MAX_RECORD_SIZE_LIMIT}"),
            });
        }

        if self.encoder_buffer_capacity == 0 {
            return Err(LogPipelineError::Config {
                field: "encoder_buffer_capacity".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        if self.encoder_max_retained_capacity < self.encoder_buffer_capacity {
            return Err(LogPipelineError::Config {
                field: "encoder_max_retained_capacity".to_owned(),
                reason: format!(
                    "must be at least encoder_buffer_capacity ({})",
                    self.encoder_buffer_capacity
                ),
            });
        }

        for (i, log_type) in self.enabled_log_types.iter().enumerate() {
            if log_type.trim().is_empty() {
                return Err(LogPipelineError::Config {
                    field: "enabled_log_types".to_owned(),
                    reason: format!("entry {i} is empty"),
                });
            }
            if self.enabled_log_types[..i].contains(log_type) {
                return Err(LogPipelineError::Config {
                    field: "enabled_log_types".to_owned(),
                    reason: format!("'{log_type}' listed twice"),
                });
            }
        }

        Ok(())
    }
}

/// 파이프라인 설정 빌더
#[derive(Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 페이로드 최대 크기를 설정합니다.
    pub fn max_record_size(mut self, size: usize) -> Self {
        self.config.max_record_size = size;
        self
    }

    /// 엄격한 타임스탬프 검증 여부를 설정합니다.
    pub fn strict_timestamps(mut self, strict: bool) -> Self {
        self.config.strict_timestamps = strict;
        self
    }

    /// 활성화할 로그 타입을 설정합니다.
    pub fn enabled_log_types<I, S>(mut self, log_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.enabled_log_types = log_types.into_iter().map(Into::into).collect();
        self
    }

    /// 인코더 버퍼 초기 용량을 설정합니다.
    pub fn encoder_buffer_capacity(mut self, capacity: usize) -> Self {
        self.config.encoder_buffer_capacity = capacity;
        self
    }

    /// 인코더 버퍼 최대 유지 용량을 설정합니다.
    pub fn encoder_max_retained_capacity(mut self, capacity: usize) -> Self {
        self.config.encoder_max_retained_capacity = capacity;
        self
    }

    /// 설정을 검증하고 `PipelineConfig`를 생성합니다.
    pub fn build(self) -> Result<PipelineConfig, LogPipelineError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
