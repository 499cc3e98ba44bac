//! 파서 레지스트리 -- 로그 타입 이름으로 파서를 찾아 실행합니다.
//!
//! 레지스트리는 시작 시점에 [`ParserRegistryBuilder`]로 한 번 구성되고,
//! [`build`](ParserRegistryBuilder::build) 이후에는 변경할 수 없습니다.
//! 전역 상태를 두지 않고 `Arc<ParserRegistry>` 핸들을 호출자에게 넘기므로
//! 테스트는 각자 독립된 레지스트리를 만들 수 있습니다.
//!
//! # 사용 예시
//! ```
//! use normlog_log_pipeline::config::PipelineConfig;
//! use normlog_log_pipeline::registry::ParserRegistry;
//!
//! let registry = ParserRegistry::with_defaults(&PipelineConfig::default()).unwrap();
//! let records = registry
//!     .parse("Gravitational.TeleportAudit", br#"{"event":"user.login","time":"2020-08-06T20:43:13Z"}"#)
//!     .unwrap();
//! assert_eq!(records[0].log_type(), Some("Gravitational.TeleportAudit"));
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use normlog_core::error::ParseError;
use normlog_core::indicator::IndicatorKind;
use normlog_core::metrics as m;
use normlog_core::pipeline::LogParser;
use normlog_core::record::CanonicalRecord;
use normlog_core::walker::IndicatorWalker;
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::error::LogPipelineError;
use crate::parser::builtin_parsers;

/// 로그 타입 설명 정보
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogTypeMetadata {
    pub log_type: String,
    pub description: String,
    pub reference_url: Option<String>,
    pub event_time_field: String,
}

/// 레지스트리 항목 (파서 + 설명 정보)
pub struct LogTypeEntry {
    parser: Arc<dyn LogParser>,
    metadata: LogTypeMetadata,
}

impl LogTypeEntry {
    fn new(parser: Arc<dyn LogParser>) -> Self {
        let schema = parser.schema();
        let metadata = LogTypeMetadata {
            log_type: parser.log_type().to_owned(),
            description: schema.description().to_owned(),
            reference_url: schema.reference_url().map(str::to_owned),
            event_time_field: schema.event_time_field().to_owned(),
        };
        Self { parser, metadata }
    }

    pub fn parser(&self) -> &Arc<dyn LogParser> {
        &self.parser
    }

    pub fn metadata(&self) -> &LogTypeMetadata {
        &self.metadata
    }
}

impl std::fmt::Debug for LogTypeEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogTypeEntry")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// 레지스트리 빌더
#[derive(Default)]
pub struct ParserRegistryBuilder {
    entries: HashMap<String, LogTypeEntry>,
}

impl ParserRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 파서를 등록합니다.
    ///
    /// 같은 로그 타입이 이미 등록되어 있으면 [`LogPipelineError::DuplicateLogType`]을 반환합니다.
    pub fn register(mut self, parser: Arc<dyn LogParser>) -> Result<Self, LogPipelineError> {
        let log_type = parser.log_type().to_owned();
        if self.entries.contains_key(&log_type) {
            return Err(LogPipelineError::DuplicateLogType(log_type));
        }
        debug!(log_type = %log_type, "parser registered");
        self.entries.insert(log_type, LogTypeEntry::new(parser));
        Ok(self)
    }

    /// 등록을 마치고 읽기 전용 레지스트리를 만듭니다.
    pub fn build(self) -> ParserRegistry {
        let registry = ParserRegistry {
            entries: self.entries,
        };
        metrics::gauge!(m::REGISTRY_PARSERS_REGISTERED).set(registry.len() as f64);
        info!(
            parsers = registry.len(),
            log_types = ?registry.log_types(),
            "parser registry built"
        );
        registry
    }
}

/// 로그 타입 레지스트리
///
/// 구성 후에는 읽기만 하므로 여러 스레드에서 잠금 없이 동시에 `parse`를 호출할 수 있습니다.
pub struct ParserRegistry {
    entries: HashMap<String, LogTypeEntry>,
}

impl ParserRegistry {
    pub fn builder() -> ParserRegistryBuilder {
        ParserRegistryBuilder::new()
    }

    /// 내장 파서로 레지스트리를 구성합니다.
    ///
    /// `config.enabled_log_types`가 비어 있으면 전체를 등록하고, 아니면 나열된 것만 등록합니다.
    /// 존재하지 않는 이름이 있으면 [`LogPipelineError::UnknownLogType`]을 반환합니다.
    pub fn with_defaults(config: &PipelineConfig) -> Result<Self, LogPipelineError> {
        config.validate()?;

        let parsers = builtin_parsers(config)?;
        if let Some(unknown) = config
            .enabled_log_types
            .iter()
            .find(|name| !parsers.iter().any(|p| p.log_type() == name.as_str()))
        {
            return Err(LogPipelineError::UnknownLogType(unknown.clone()));
        }

        let mut builder = Self::builder();
        for parser in parsers {
            if config.is_enabled(parser.log_type()) {
                builder = builder.register(parser)?;
            }
        }
        Ok(builder.build())
    }

    /// 로그 타입 항목을 조회합니다.
    pub fn lookup(&self, log_type: &str) -> Option<&LogTypeEntry> {
        self.entries.get(log_type)
    }

    pub fn contains(&self, log_type: &str) -> bool {
        self.entries.contains_key(log_type)
    }

    /// 등록된 로그 타입 이름 (정렬됨)
    pub fn log_types(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 원시 페이로드를 정규화 레코드로 파싱합니다.
    ///
    /// 파싱 직후 모든 레코드에 지표 추출기를 실행하여 메타 필드를 채웁니다.
    /// 등록되지 않은 로그 타입은 [`ParseError::UnknownLogType`]으로 거부됩니다.
    pub fn parse(&self, log_type: &str, raw: &[u8]) -> Result<Vec<CanonicalRecord>, ParseError> {
        let result = self.parse_inner(log_type, raw);
        if let Err(e) = &result {
            metrics::counter!(m::PARSER_ERRORS_TOTAL, m::LABEL_LOG_TYPE => log_type.to_owned())
                .increment(1);
            debug!(log_type, error = %e, "payload rejected");
        }
        result
    }

    fn parse_inner(&self, log_type: &str, raw: &[u8]) -> Result<Vec<CanonicalRecord>, ParseError> {
        let entry = self
            .lookup(log_type)
            .ok_or_else(|| ParseError::UnknownLogType(log_type.to_owned()))?;

        let mut records = entry.parser.parse(raw)?;
        let walker = IndicatorWalker::new(entry.parser.schema());
        for (index, record) in records.iter_mut().enumerate() {
            let stats = walker.apply(record, index)?;
            for kind in IndicatorKind::ALL {
                let count = stats.count(kind);
                if count > 0 {
                    metrics::counter!(
                        m::PARSER_INDICATORS_TOTAL,
                        m::LABEL_LOG_TYPE => log_type.to_owned(),
                        m::LABEL_INDICATOR_KIND => kind.as_str()
                    )
                    .increment(count as u64);
                }
            }
        }

        metrics::counter!(m::PARSER_RECORDS_TOTAL, m::LABEL_LOG_TYPE => log_type.to_owned())
            .increment(records.len() as u64);
        debug!(
            log_type,
            bytes = raw.len(),
            records = records.len(),
            "payload parsed"
        );
        Ok(records)
    }
}

impl std::fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserRegistry")
            .field("log_types", &self.log_types())
            .finish()
    }
}
