//! 로그 파싱 모듈 -- 스키마 기반 JSON 파서와 내장 로그 형식
//!
//! 각 파서는 core의 [`LogParser`](normlog_core::pipeline::LogParser) trait을 구현하며,
//! [`ParserRegistry`](crate::registry::ParserRegistry)에 로그 타입 이름으로 등록됩니다.
//!
//! # 내장 형식
//! - `Gravitational.TeleportAudit` ([`teleport`])
//! - `Suricata.DNS` ([`suricata`])
//! - `AWS.CloudTrail` ([`cloudtrail`], 봉투 형식 지원 커스텀 파서)
//!
//! 새 형식이 평탄하거나 중첩된 JSON 객체라면 스키마만 선언하고
//! [`JsonSchemaParser`]로 감싸면 됩니다.

pub mod cloudtrail;
pub mod json;
pub mod suricata;
pub mod teleport;

pub use cloudtrail::CloudTrailParser;
pub use json::{decode_object, JsonSchemaParser};

use std::sync::Arc;

use normlog_core::error::SchemaError;
use normlog_core::pipeline::LogParser;

use crate::config::PipelineConfig;

/// 내장 로그 타입 이름 목록
pub const BUILTIN_LOG_TYPES: [&str; 3] = [teleport::LOG_TYPE, suricata::LOG_TYPE, cloudtrail::LOG_TYPE];

/// 설정을 적용한 내장 파서 전체를 생성합니다.
///
/// `enabled_log_types` 필터링은 레지스트리가 담당합니다.
pub fn builtin_parsers(config: &PipelineConfig) -> Result<Vec<Arc<dyn LogParser>>, SchemaError> {
    let schema_parser = |schema| {
        JsonSchemaParser::new(schema)
            .with_max_input_size(config.max_record_size)
            .with_strict_timestamps(config.strict_timestamps)
    };

    let mut parsers: Vec<Arc<dyn LogParser>> = Vec::with_capacity(BUILTIN_LOG_TYPES.len());
    parsers.push(Arc::new(schema_parser(teleport::schema()?)));
    parsers.push(Arc::new(schema_parser(suricata::schema()?)));
    parsers.push(Arc::new(
        CloudTrailParser::new()?
            .with_max_input_size(config.max_record_size)
            .with_strict_timestamps(config.strict_timestamps),
    ));
    Ok(parsers)
}
