//! normlog.toml 통합 설정 테스트
//!
//! - normlog.toml.example 파싱 테스트
//! - 부분 설정 로딩 테스트
//! - 환경변수 우선순위 테스트
//! - 파일 로딩 / 잘못된 형식 에러 테스트

use std::io::Write;

use normlog_core::config::NormlogConfig;
use normlog_core::error::{ConfigError, NormlogError};

const EXAMPLE: &str = include_str!("../../../normlog.toml.example");

// =============================================================================
// normlog.toml.example 파싱 테스트
// =============================================================================

#[test]
fn example_config_parses_successfully() {
    let config = NormlogConfig::parse(EXAMPLE).expect("example config should parse");
    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.general.log_format, "json");
}

#[test]
fn example_config_passes_validation() {
    let config = NormlogConfig::parse(EXAMPLE).expect("should parse");
    config
        .validate()
        .expect("example config should pass validation");
}

#[test]
fn example_config_matches_code_defaults() {
    let example = NormlogConfig::parse(EXAMPLE).expect("should parse");
    let defaults = NormlogConfig::default();

    assert_eq!(example.general.log_level, defaults.general.log_level);
    assert_eq!(example.general.log_format, defaults.general.log_format);
    assert_eq!(
        example.pipeline.max_record_size,
        defaults.pipeline.max_record_size
    );
    assert_eq!(
        example.pipeline.strict_timestamps,
        defaults.pipeline.strict_timestamps
    );
    assert_eq!(
        example.pipeline.enabled_log_types,
        defaults.pipeline.enabled_log_types
    );
    assert_eq!(
        example.pipeline.encoder_buffer_capacity,
        defaults.pipeline.encoder_buffer_capacity
    );
}

// =============================================================================
// 부분 설정 테스트
// =============================================================================

#[test]
fn partial_config_general_only() {
    let toml = r#"
[general]
log_level = "debug"
"#;
    let config = NormlogConfig::parse(toml).expect("should parse");
    assert_eq!(config.general.log_level, "debug");
    assert_eq!(config.general.log_format, "json");
    assert_eq!(config.pipeline.max_record_size, 1024 * 1024);
}

#[test]
fn partial_config_pipeline_only() {
    let toml = r#"
[pipeline]
enabled_log_types = ["Suricata.DNS"]
"#;
    let config = NormlogConfig::parse(toml).expect("should parse");
    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.pipeline.enabled_log_types, vec!["Suricata.DNS"]);
    assert_eq!(config.pipeline.encoder_buffer_capacity, 4096);
}

// =============================================================================
// 환경변수 우선순위 테스트
// =============================================================================

#[test]
#[serial_test::serial]
fn env_override_takes_precedence_over_toml() {
    let toml = r#"
[general]
log_level = "info"
"#;

    let original = std::env::var("NORMLOG_GENERAL_LOG_LEVEL").ok();
    // SAFETY: serial 테스트로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var("NORMLOG_GENERAL_LOG_LEVEL", "error");
    }

    let mut config = NormlogConfig::parse(toml).expect("should parse");
    config.apply_env_overrides();
    let result = config.general.log_level.clone();

    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var("NORMLOG_GENERAL_LOG_LEVEL", val),
            None => std::env::remove_var("NORMLOG_GENERAL_LOG_LEVEL"),
        }
    }

    assert_eq!(result, "error");
}

#[test]
#[serial_test::serial]
fn env_override_csv_for_log_types() {
    let original = std::env::var("NORMLOG_PIPELINE_ENABLED_LOG_TYPES").ok();
    // SAFETY: serial 테스트로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var(
            "NORMLOG_PIPELINE_ENABLED_LOG_TYPES",
            "AWS.CloudTrail, Suricata.DNS",
        );
    }

    let mut config = NormlogConfig::default();
    config.apply_env_overrides();
    let result = config.pipeline.enabled_log_types.clone();

    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var("NORMLOG_PIPELINE_ENABLED_LOG_TYPES", val),
            None => std::env::remove_var("NORMLOG_PIPELINE_ENABLED_LOG_TYPES"),
        }
    }

    assert_eq!(result, vec!["AWS.CloudTrail", "Suricata.DNS"]);
}

#[test]
#[serial_test::serial]
fn env_override_numeric_and_bool_fields() {
    let original_size = std::env::var("NORMLOG_PIPELINE_MAX_RECORD_SIZE").ok();
    let original_strict = std::env::var("NORMLOG_PIPELINE_STRICT_TIMESTAMPS").ok();
    // SAFETY: serial 테스트로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var("NORMLOG_PIPELINE_MAX_RECORD_SIZE", "2048");
        std::env::set_var("NORMLOG_PIPELINE_STRICT_TIMESTAMPS", "true");
    }

    let mut config = NormlogConfig::default();
    config.apply_env_overrides();
    let size = config.pipeline.max_record_size;
    let strict = config.pipeline.strict_timestamps;

    // SAFETY: 테스트 정리
    unsafe {
        match original_size {
            Some(val) => std::env::set_var("NORMLOG_PIPELINE_MAX_RECORD_SIZE", val),
            None => std::env::remove_var("NORMLOG_PIPELINE_MAX_RECORD_SIZE"),
        }
        match original_strict {
            Some(val) => std::env::set_var("NORMLOG_PIPELINE_STRICT_TIMESTAMPS", val),
            None => std::env::remove_var("NORMLOG_PIPELINE_STRICT_TIMESTAMPS"),
        }
    }

    assert_eq!(size, 2048);
    assert!(strict);
}

#[test]
#[serial_test::serial]
fn env_override_invalid_number_keeps_toml_value() {
    let toml = r#"
[pipeline]
max_record_size = 4096
"#;
    let original = std::env::var("NORMLOG_PIPELINE_MAX_RECORD_SIZE").ok();
    // SAFETY: serial 테스트로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var("NORMLOG_PIPELINE_MAX_RECORD_SIZE", "lots");
    }

    let mut config = NormlogConfig::parse(toml).expect("should parse");
    config.apply_env_overrides();
    let result = config.pipeline.max_record_size;

    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var("NORMLOG_PIPELINE_MAX_RECORD_SIZE", val),
            None => std::env::remove_var("NORMLOG_PIPELINE_MAX_RECORD_SIZE"),
        }
    }

    assert_eq!(result, 4096);
}

// =============================================================================
// 에러 케이스 테스트
// =============================================================================

#[test]
fn comments_only_parses_with_defaults() {
    let config = NormlogConfig::parse("# nothing here\n# at all\n").expect("should parse");
    assert_eq!(config.general.log_level, "info");
}

#[test]
fn malformed_toml_returns_parse_error() {
    let result = NormlogConfig::parse("[pipeline\nmax_record_size = 1");
    assert!(matches!(
        result.unwrap_err(),
        NormlogError::Config(ConfigError::ParseFailed { .. })
    ));
}

#[test]
fn wrong_type_for_numeric_field() {
    let toml = r#"
[pipeline]
max_record_size = "big"
"#;
    assert!(NormlogConfig::parse(toml).is_err());
}

#[test]
fn unknown_section_is_ignored() {
    let toml = r#"
[general]
log_level = "warn"

[storage]
url = "postgres://localhost"
"#;
    let config = NormlogConfig::parse(toml).expect("unknown sections should be ignored");
    assert_eq!(config.general.log_level, "warn");
}

#[tokio::test]
async fn from_file_nonexistent_returns_file_not_found() {
    let result = NormlogConfig::from_file("/tmp/normlog_test_nonexistent_12345.toml").await;
    assert!(matches!(
        result.unwrap_err(),
        NormlogError::Config(ConfigError::FileNotFound { .. })
    ));
}

#[tokio::test]
async fn from_file_rejects_invalid_values() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    writeln!(file, "[general]\nlog_format = \"xml\"").expect("write");

    let err = NormlogConfig::from_file(file.path()).await.unwrap_err();
    assert!(matches!(
        err,
        NormlogError::Config(ConfigError::InvalidValue { .. })
    ));
}

#[tokio::test]
#[serial_test::serial]
async fn load_reads_temp_file() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    write!(
        file,
        "[pipeline]\nstrict_timestamps = true\nenabled_log_types = [\"AWS.CloudTrail\"]\n"
    )
    .expect("write");

    let config = NormlogConfig::load(file.path()).await.expect("should load");
    assert!(config.pipeline.strict_timestamps);
    assert_eq!(config.pipeline.enabled_log_types, vec!["AWS.CloudTrail"]);
}

// =============================================================================
// 직렬화 라운드트립 테스트
// =============================================================================

#[test]
fn example_config_serialize_roundtrip() {
    let config = NormlogConfig::parse(EXAMPLE).expect("should parse");
    let serialized = toml::to_string_pretty(&config).expect("should serialize");
    let reparsed = NormlogConfig::parse(&serialized).expect("should reparse");
    reparsed.validate().expect("should validate");

    assert_eq!(config.general.log_level, reparsed.general.log_level);
    assert_eq!(
        config.pipeline.max_record_size,
        reparsed.pipeline.max_record_size
    );
}
