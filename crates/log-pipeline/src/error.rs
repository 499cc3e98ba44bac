//! 로그 파이프라인 에러 타입
//!
//! [`LogPipelineError`]는 레지스트리 구성과 배치 정규화에서 발생하는 에러를 표현합니다.
//! `From<LogPipelineError> for NormlogError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.
//!
//! 에러는 세 갈래로 나뉩니다.
//! - 구성 에러: 중복 로그 타입, 알 수 없는 로그 타입 활성화, 잘못된 스키마/설정
//! - 입력 에러: [`ParseError`], 레코드 단위로 보고되며 배치를 중단시키지 않음
//! - 출력 에러: [`EncodeError`], 싱크 쓰기 실패 시 배치를 중단

use normlog_core::error::{ConfigError, EncodeError, NormlogError, ParseError, SchemaError};

/// 로그 파이프라인 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum LogPipelineError {
    /// 같은 로그 타입이 두 번 등록됨
    #[error("duplicate log type: {0}")]
    DuplicateLogType(String),

    /// 설정에서 활성화한 로그 타입이 존재하지 않음
    #[error("unknown log type in configuration: {0}")]
    UnknownLogType(String),

    /// 스키마 선언 오류
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// 레코드 파싱 실패
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// 레코드 인코딩 또는 싱크 쓰기 실패
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<LogPipelineError> for NormlogError {
    fn from(err: LogPipelineError) -> Self {
        match err {
            LogPipelineError::DuplicateLogType(log_type) => {
                NormlogError::Config(ConfigError::InvalidValue {
                    field: "registry".to_owned(),
                    reason: format!("log type '{log_type}' registered twice"),
                })
            }
            LogPipelineError::UnknownLogType(log_type) => {
                NormlogError::Config(ConfigError::InvalidValue {
                    field: "pipeline.enabled_log_types".to_owned(),
                    reason: format!("unknown log type '{log_type}'"),
                })
            }
            LogPipelineError::Schema(e) => NormlogError::Schema(e),
            LogPipelineError::Parse(e) => NormlogError::Parse(e),
            LogPipelineError::Encode(e) => NormlogError::Encode(e),
            LogPipelineError::Config { field, reason } => {
                NormlogError::Config(ConfigError::InvalidValue { field, reason })
            }
            LogPipelineError::Io(e) => NormlogError::Io(e),
        }
    }
}
