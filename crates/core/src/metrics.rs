//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`,
//! `metrics::histogram!()` 매크로를 호출합니다.
//!
//! 레코더가 설치되지 않은 상태에서는 모든 매크로 호출이 아무 일도 하지 않습니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `normlog_`
//! - 모듈명: `parser_`, `encoder_`, `normalizer_`, `registry_`
//! - 접미어: `_total` (counter), `_seconds` (histogram/latency), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! use normlog_core::metrics as m;
//!
//! metrics::counter!(m::PARSER_RECORDS_TOTAL, m::LABEL_LOG_TYPE => "AWS.CloudTrail").increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 로그 타입 레이블 키 (예: `AWS.CloudTrail`)
pub const LABEL_LOG_TYPE: &str = "log_type";

/// 지표 종류 레이블 키 (ip, domain, trace_id)
pub const LABEL_INDICATOR_KIND: &str = "kind";

// ─── Parser 메트릭 ─────────────────────────────────────────────────

/// Parser: 정규화된 레코드 수 (counter, label: log_type)
pub const PARSER_RECORDS_TOTAL: &str = "normlog_parser_records_total";

/// Parser: 파싱 실패 수 (counter, label: log_type)
pub const PARSER_ERRORS_TOTAL: &str = "normlog_parser_errors_total";

/// Parser: 추출된 지표 수 (counter, labels: log_type, kind)
pub const PARSER_INDICATORS_TOTAL: &str = "normlog_parser_indicators_total";

// ─── Encoder 메트릭 ────────────────────────────────────────────────

/// Encoder: 기록된 줄 수 (counter)
pub const ENCODER_LINES_TOTAL: &str = "normlog_encoder_lines_total";

/// Encoder: 인코딩 실패 수 (counter)
pub const ENCODER_ERRORS_TOTAL: &str = "normlog_encoder_errors_total";

// ─── Normalizer 메트릭 ─────────────────────────────────────────────

/// Normalizer: 처리된 배치 수 (counter, label: log_type)
pub const NORMALIZER_BATCHES_TOTAL: &str = "normlog_normalizer_batches_total";

/// Normalizer: 거부된 페이로드 수 (counter, label: log_type)
pub const NORMALIZER_PAYLOADS_REJECTED_TOTAL: &str = "normlog_normalizer_payloads_rejected_total";

/// Normalizer: 배치 처리 시간 (histogram, 초)
pub const NORMALIZER_BATCH_DURATION_SECONDS: &str = "normlog_normalizer_batch_duration_seconds";

// ─── Registry 메트릭 ───────────────────────────────────────────────

/// Registry: 등록된 파서 수 (gauge)
pub const REGISTRY_PARSERS_REGISTERED: &str = "normlog_registry_parsers_registered";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge, describe_histogram};

    // Parser
    describe_counter!(
        PARSER_RECORDS_TOTAL,
        "Total number of records parsed and normalized"
    );
    describe_counter!(
        PARSER_ERRORS_TOTAL,
        "Total number of payloads rejected by a parser"
    );
    describe_counter!(
        PARSER_INDICATORS_TOTAL,
        "Total number of distinct indicators extracted per record"
    );

    // Encoder
    describe_counter!(ENCODER_LINES_TOTAL, "Total number of JSONL lines written");
    describe_counter!(
        ENCODER_ERRORS_TOTAL,
        "Total number of records that failed to encode"
    );

    // Normalizer
    describe_counter!(
        NORMALIZER_BATCHES_TOTAL,
        "Total number of raw batches normalized"
    );
    describe_counter!(
        NORMALIZER_PAYLOADS_REJECTED_TOTAL,
        "Total number of payloads skipped within a batch"
    );
    describe_histogram!(
        NORMALIZER_BATCH_DURATION_SECONDS,
        "Time to normalize and encode a single batch in seconds"
    );

    // Registry
    describe_gauge!(
        REGISTRY_PARSERS_REGISTERED,
        "Number of parsers in the most recently built registry"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_METRIC_NAMES: &[&str] = &[
        PARSER_RECORDS_TOTAL,
        PARSER_ERRORS_TOTAL,
        PARSER_INDICATORS_TOTAL,
        ENCODER_LINES_TOTAL,
        ENCODER_ERRORS_TOTAL,
        NORMALIZER_BATCHES_TOTAL,
        NORMALIZER_PAYLOADS_REJECTED_TOTAL,
        NORMALIZER_BATCH_DURATION_SECONDS,
        REGISTRY_PARSERS_REGISTERED,
    ];

    #[test]
    fn all_metrics_start_with_normlog_prefix() {
        for name in ALL_METRIC_NAMES {
            assert!(
                name.starts_with("normlog_"),
                "Metric '{}' does not start with 'normlog_' prefix",
                name
            );
        }
    }

    #[test]
    fn metric_names_are_unique() {
        let mut names = ALL_METRIC_NAMES.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ALL_METRIC_NAMES.len());
    }

    #[test]
    fn describe_all_does_not_panic() {
        describe_all();
    }

    #[test]
    fn label_keys_are_lowercase() {
        for label in [LABEL_LOG_TYPE, LABEL_INDICATOR_KIND] {
            assert_eq!(label.to_lowercase(), label);
        }
    }
}
