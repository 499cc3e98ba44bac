#![no_main]

use libfuzzer_sys::fuzz_target;
use normlog_log_pipeline::encoder::{append_join_lines, join_lines, JsonlEncoder};
use serde_json::value::RawValue;

fuzz_target!(|data: &[u8]| {
    let mut in_place = data.to_vec();
    join_lines(&mut in_place);
    let mut fresh = Vec::new();
    append_join_lines(&mut fresh, data);
    assert_eq!(in_place, fresh);

    // 유효한 JSON이면 줄바꿈이 있어도 한 줄로 기록되어야 함
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(raw) = RawValue::from_string(text.to_owned()) else {
        return;
    };
    let mut encoder = JsonlEncoder::new(Vec::new());
    if encoder.encode(&*raw).is_ok() && encoder.encode(&*raw).is_ok() {
        let out = encoder.into_inner();
        assert_eq!(out.iter().filter(|b| **b == b'\n').count(), 1);
    }
});
