//! normlog 코어 크레이트
//!
//! 정규화 레코드 모델, 스키마 선언, 지표 추출기, 파서 trait,
//! 그리고 공통 에러/설정/로깅/메트릭을 제공합니다.
//! 실제 로그 형식 파서와 JSONL 인코더는 `normlog-log-pipeline` 크레이트에 있습니다.

pub mod config;
pub mod error;
pub mod indicator;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod record;
pub mod schema;
pub mod walker;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, EncodeError, NormlogError, ParseError, SchemaError};

// 설정
pub use config::NormlogConfig;

// 레코드 모델
pub use indicator::{IndicatorKind, IndicatorSet};
pub use record::{CanonicalRecord, MetaFields};

// 스키마와 지표 추출
pub use schema::{FieldSpec, FieldType, Schema, SchemaBuilder, ValueFormat};
pub use walker::{ExtractionStats, IndicatorWalker};

// 파서 trait
pub use pipeline::LogParser;
