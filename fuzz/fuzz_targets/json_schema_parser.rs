#![no_main]

use libfuzzer_sys::fuzz_target;
use normlog_core::pipeline::LogParser;
use normlog_log_pipeline::parser::{teleport, JsonSchemaParser};

fuzz_target!(|data: &[u8]| {
    let Ok(schema) = teleport::schema() else {
        return;
    };
    let parser = JsonSchemaParser::new(schema).with_strict_timestamps(true);
    let _ = parser.parse(data);
});
