//! 배치 정규화 -- 원시 페이로드 배치를 JSONL로 변환합니다.
//!
//! [`Normalizer`]는 [`ParserRegistry`]와 [`JsonlEncoder`]를 잇는 얇은 계층입니다.
//! 자체 I/O는 없으며, 호출자가 배치와 싱크를 넘겨줍니다.
//!
//! # 처리 흐름
//! ```text
//! RawBatch -> ParserRegistry::parse (payload 단위) -> IndicatorWalker -> JsonlEncoder -> sink
//!                    |
//!               RejectedPayload (기록 후 계속)
//! ```
//!
//! 파싱 실패는 해당 페이로드만 건너뛰고 [`BatchReport`]에 기록합니다.
//! 인코딩/싱크 실패는 배치 전체를 중단합니다.

use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use normlog_core::error::ParseError;
use normlog_core::metrics as m;
use tracing::{debug, warn};

use crate::config::PipelineConfig;
use crate::encoder::{JsonlEncoder, DEFAULT_BUFFER_CAPACITY};
use crate::error::LogPipelineError;
use crate::registry::ParserRegistry;

/// 같은 로그 타입의 원시 페이로드 묶음
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBatch {
    pub log_type: String,
    pub payloads: Vec<Bytes>,
}

impl RawBatch {
    pub fn new(log_type: impl Into<String>, payloads: Vec<Bytes>) -> Self {
        Self {
            log_type: log_type.into(),
            payloads,
        }
    }
}

/// 거부된 페이로드
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedPayload {
    /// 배치 안에서의 페이로드 위치
    pub payload_index: usize,
    /// 원인 (로그 타입, 레코드 인덱스, 오프셋 포함)
    pub error: ParseError,
}

/// 배치 처리 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub log_type: String,
    /// 배치의 전체 페이로드 수
    pub payloads: usize,
    /// 싱크에 기록된 레코드(줄) 수
    pub records_written: usize,
    pub rejected: Vec<RejectedPayload>,
}

impl BatchReport {
    /// 거부된 페이로드가 없는지 확인합니다.
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// 배치 정규화기
///
/// 레지스트리를 `Arc`로 공유하므로 워커마다 복제해 사용할 수 있습니다.
#[derive(Debug, Clone)]
pub struct Normalizer {
    registry: Arc<ParserRegistry>,
    encoder_buffer_capacity: usize,
    encoder_max_retained_capacity: Option<usize>,
}

impl Normalizer {
    pub fn new(registry: Arc<ParserRegistry>) -> Self {
        Self {
            registry,
            encoder_buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            encoder_max_retained_capacity: None,
        }
    }

    /// 설정으로 내장 레지스트리와 인코더 용량을 구성합니다.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, LogPipelineError> {
        let registry = ParserRegistry::with_defaults(config)?;
        Ok(Self {
            registry: Arc::new(registry),
            encoder_buffer_capacity: config.encoder_buffer_capacity,
            encoder_max_retained_capacity: Some(config.encoder_max_retained_capacity),
        })
    }

    pub fn registry(&self) -> &Arc<ParserRegistry> {
        &self.registry
    }

    /// 이 정규화기 설정에 맞춘 인코더를 생성합니다.
    pub fn encoder<W: Write>(&self, sink: W) -> JsonlEncoder<W> {
        let encoder = JsonlEncoder::with_capacity(sink, self.encoder_buffer_capacity);
        match self.encoder_max_retained_capacity {
            Some(max) => encoder.with_max_retained_capacity(max),
            None => encoder,
        }
    }

    /// 배치를 정규화하여 인코더에 기록합니다.
    ///
    /// 레코드는 페이로드 순서, 페이로드 안의 레코드 순서대로 기록됩니다.
    pub fn normalize<W: Write>(
        &self,
        batch: &RawBatch,
        encoder: &mut JsonlEncoder<W>,
    ) -> Result<BatchReport, LogPipelineError> {
        let started = Instant::now();
        let mut report = BatchReport {
            log_type: batch.log_type.clone(),
            payloads: batch.payloads.len(),
            records_written: 0,
            rejected: Vec::new(),
        };

        for (payload_index, payload) in batch.payloads.iter().enumerate() {
            let records = match self.registry.parse(&batch.log_type, payload) {
                Ok(records) => records,
                Err(error) => {
                    warn!(
                        log_type = %batch.log_type,
                        payload_index,
                        record = ?error.record_index(),
                        error = %error,
                        "skipping payload"
                    );
                    metrics::counter!(
                        m::NORMALIZER_PAYLOADS_REJECTED_TOTAL,
                        m::LABEL_LOG_TYPE => batch.log_type.clone()
                    )
                    .increment(1);
                    report.rejected.push(RejectedPayload {
                        payload_index,
                        error,
                    });
                    continue;
                }
            };

            for record in &records {
                encoder.encode(record)?;
                report.records_written += 1;
            }
        }

        metrics::counter!(
            m::NORMALIZER_BATCHES_TOTAL,
            m::LABEL_LOG_TYPE => batch.log_type.clone()
        )
        .increment(1);
        metrics::histogram!(m::NORMALIZER_BATCH_DURATION_SECONDS)
            .record(started.elapsed().as_secs_f64());
        debug!(
            log_type = %batch.log_type,
            payloads = report.payloads,
            records = report.records_written,
            rejected = report.rejected.len(),
            "batch normalized"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::teleport;

    fn normalizer() -> Normalizer {
        Normalizer::from_config(&PipelineConfig::default()).unwrap()
    }

    fn lines(encoder: JsonlEncoder<Vec<u8>>) -> Vec<serde_json::Value> {
        let out = encoder.into_inner();
        out.split(|b| *b == b'\n')
            .map(|line| serde_json::from_slice(line).unwrap())
            .collect()
    }

    #[test]
    fn clean_batch_writes_every_record() {
        let normalizer = normalizer();
        let batch = RawBatch::new(
            teleport::LOG_TYPE,
            vec![
                Bytes::from_static(br#"{"event":"a","time":"2020-08-07T07:52:25Z"}"#),
                Bytes::from_static(
                    b"{\"event\":\"b\",\"time\":\"2020-08-07T07:52:26Z\"}\n{\"event\":\"c\",\"time\":\"2020-08-07T07:52:27Z\"}",
                ),
            ],
        );
        let mut encoder = normalizer.encoder(Vec::new());
        let report = normalizer.normalize(&batch, &mut encoder).unwrap();

        assert!(report.is_clean());
        assert_eq!(report.payloads, 2);
        assert_eq!(report.records_written, 3);
        let events: Vec<_> = lines(encoder).into_iter().map(|v| v["event"].clone()).collect();
        assert_eq!(events, ["a", "b", "c"]);
    }

    #[test]
    fn bad_payload_is_reported_and_batch_continues() {
        let normalizer = normalizer();
        let batch = RawBatch::new(
            teleport::LOG_TYPE,
            vec![
                Bytes::from_static(br#"{"event":"a","time":"t1"}"#),
                Bytes::from_static(br#"{"event":"b""#),
                Bytes::from_static(br#"{"event":"c","time":"t3"}"#),
            ],
        );
        let mut encoder = normalizer.encoder(Vec::new());
        let report = normalizer.normalize(&batch, &mut encoder).unwrap();

        assert!(!report.is_clean());
        assert_eq!(report.records_written, 2);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].payload_index, 1);
        assert!(matches!(
            report.rejected[0].error,
            ParseError::Malformed { record: 0, .. }
        ));
        assert_eq!(encoder.num_lines(), 2);
    }

    #[test]
    fn unknown_log_type_rejects_every_payload() {
        let normalizer = normalizer();
        let batch = RawBatch::new("Nope.Log", vec![Bytes::from_static(b"{}"); 2]);
        let mut encoder = normalizer.encoder(Vec::new());
        let report = normalizer.normalize(&batch, &mut encoder).unwrap();

        assert_eq!(report.records_written, 0);
        assert_eq!(report.rejected.len(), 2);
        assert!(encoder.get_ref().is_empty());
    }

    #[test]
    fn sink_error_aborts_batch() {
        struct ClosedSink;
        impl Write for ClosedSink {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let normalizer = normalizer();
        let batch = RawBatch::new(
            teleport::LOG_TYPE,
            vec![Bytes::from_static(br#"{"event":"a","time":"t"}"#)],
        );
        let mut encoder = normalizer.encoder(ClosedSink);
        let err = normalizer.normalize(&batch, &mut encoder).unwrap_err();
        assert!(matches!(err, LogPipelineError::Encode(_)));
    }
}
