//! 에러 타입 -- 도메인별 에러 정의
//!
//! 에러는 세 부류로 나뉩니다.
//! - 설정 에러 ([`ConfigError`], [`SchemaError`]): 시작 시점에 검출되며 초기화를 중단시킵니다.
//! - 입력 에러 ([`ParseError`]): 레코드/배치 단위로 보고되며 호출자가 건너뛸 수 있습니다.
//! - 직렬화/싱크 에러 ([`EncodeError`]): 인코딩 호출에서 즉시 반환됩니다.

/// normlog 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum NormlogError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 스키마 선언 에러
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// 파싱 에러
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// 인코딩 에러
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 스키마 선언 에러
///
/// 스키마 등록 시점에 검출되는 프로그래밍/설정 오류입니다.
/// 레코드 처리 중에는 발생하지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// 로그 타입 이름이 비어 있음
    #[error("log type name must not be empty")]
    EmptyLogType,

    /// 이벤트 시각 필드가 선언되지 않음
    #[error("{log_type}: no event time field declared")]
    MissingEventTime { log_type: String },

    /// 이벤트 시각 필드가 최상위 문자열/타임스탬프 필드가 아님
    #[error("{log_type}: event time field '{field}' {reason}")]
    InvalidEventTimeField {
        log_type: String,
        field: String,
        reason: String,
    },

    /// 같은 객체 레벨에 중복된 필드 이름
    #[error("{log_type}: duplicate field '{field}'")]
    DuplicateField { log_type: String, field: String },

    /// 지표 선언이 지원하지 않는 타입의 필드를 가리킴
    #[error("{log_type}: field '{field}' cannot carry indicators: {reason}")]
    InvalidIndicator {
        log_type: String,
        field: String,
        reason: String,
    },

    /// 추가 필드 지표 선언이 잘못됨
    #[error("{log_type}: invalid extra indicator '{field}': {reason}")]
    InvalidExtraIndicator {
        log_type: String,
        field: String,
        reason: String,
    },
}

/// 파싱 에러
///
/// 모든 변형은 원인이 된 로그 타입을 담고 있으며, 레코드 단위 에러는
/// 페이로드 안에서의 레코드 인덱스도 함께 담습니다.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// 등록되지 않은 로그 타입
    #[error("unknown log type: {0}")]
    UnknownLogType(String),

    /// 입력 데이터 초과
    #[error("{log_type}: input too large: {size} bytes (max: {max})")]
    TooLarge {
        log_type: String,
        size: usize,
        max: usize,
    },

    /// JSON 문법 오류
    #[error("{log_type}: record {record}: malformed JSON at offset {offset}: {reason}")]
    Malformed {
        log_type: String,
        record: usize,
        offset: usize,
        reason: String,
    },

    /// 최상위 값이 JSON 객체가 아님
    #[error("{log_type}: record {record}: expected JSON object, found {found}")]
    NotAnObject {
        log_type: String,
        record: usize,
        found: String,
    },

    /// 필드 값이 스키마 타입과 맞지 않음
    #[error("{log_type}: record {record}: field '{field}': {reason}")]
    SchemaMismatch {
        log_type: String,
        record: usize,
        field: String,
        reason: String,
    },

    /// 필수 필드 누락
    #[error("{log_type}: record {record}: missing required field '{field}'")]
    MissingField {
        log_type: String,
        record: usize,
        field: String,
    },
}

impl ParseError {
    /// 에러가 발생한 로그 타입을 반환합니다.
    pub fn log_type(&self) -> &str {
        match self {
            Self::UnknownLogType(log_type) => log_type,
            Self::TooLarge { log_type, .. }
            | Self::Malformed { log_type, .. }
            | Self::NotAnObject { log_type, .. }
            | Self::SchemaMismatch { log_type, .. }
            | Self::MissingField { log_type, .. } => log_type,
        }
    }

    /// 페이로드 안에서 문제가 된 레코드 인덱스를 반환합니다.
    ///
    /// 페이로드 전체에 대한 에러(알 수 없는 타입, 크기 초과)는 `None`입니다.
    pub fn record_index(&self) -> Option<usize> {
        match self {
            Self::UnknownLogType(_) | Self::TooLarge { .. } => None,
            Self::Malformed { record, .. }
            | Self::NotAnObject { record, .. }
            | Self::SchemaMismatch { record, .. }
            | Self::MissingField { record, .. } => Some(*record),
        }
    }
}

/// 인코딩 에러
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// 값을 JSON으로 표현할 수 없음
    #[error("serialize failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// 싱크 쓰기 실패
    #[error("sink write failed: {0}")]
    Io(#[from] std::io::Error),

    /// 이전 싱크 쓰기 실패로 인코더가 사용 불가 상태
    #[error("encoder is unusable after a failed sink write; reset it with a new sink")]
    Poisoned,
}
