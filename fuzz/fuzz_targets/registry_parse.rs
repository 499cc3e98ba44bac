#![no_main]

use std::sync::OnceLock;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use normlog_log_pipeline::parser::BUILTIN_LOG_TYPES;
use normlog_log_pipeline::{ParserRegistry, PipelineConfig};

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    /// 내장 로그 타입 선택 (범위 밖이면 미등록 타입)
    log_type: u8,
    payload: Vec<u8>,
}

fn registry() -> Option<&'static ParserRegistry> {
    static REGISTRY: OnceLock<Option<ParserRegistry>> = OnceLock::new();
    REGISTRY
        .get_or_init(|| ParserRegistry::with_defaults(&PipelineConfig::default()).ok())
        .as_ref()
}

fuzz_target!(|input: FuzzInput| {
    let Some(registry) = registry() else {
        return;
    };
    let log_type = BUILTIN_LOG_TYPES
        .get(usize::from(input.log_type))
        .copied()
        .unwrap_or("Fuzz.Unknown");

    if let Ok(records) = registry.parse(log_type, &input.payload) {
        for record in &records {
            // 파싱된 레코드는 항상 이벤트 시간과 로그 타입을 가져야 함
            assert!(record.event_time().is_some());
            assert_eq!(record.log_type(), Some(log_type));
        }
    }
});
