//! Gravitational Teleport 감사 로그
//!
//! Teleport 노드/프록시가 남기는 세션 감사 이벤트입니다 (`session.start`,
//! `session.data`, `user.login` 등). 모든 이벤트가 같은 평탄한 객체 형식을
//! 공유하므로 필드 선언 하나로 처리합니다.
//!
//! 주소 필드는 `host:port` 형식이며, 지표에는 호스트 부분만 사용합니다.

use normlog_core::error::SchemaError;
use normlog_core::indicator::IndicatorKind;
use normlog_core::schema::{FieldSpec, FieldType, Schema, SchemaBuilder, ValueFormat};

pub const LOG_TYPE: &str = "Gravitational.TeleportAudit";

/// Teleport 감사 이벤트 스키마
pub fn schema() -> Result<Schema, SchemaError> {
    let address = |name: &str| {
        FieldSpec::string(name).indicator(IndicatorKind::IpAddress, ValueFormat::HostPort)
    };

    SchemaBuilder::new(LOG_TYPE)
        .description("Teleport Audit Event")
        .reference_url("https://gravitational.com/teleport/docs/admin-guide/#audit-log")
        .event_time("time")
        .fields([
            address("addr.local"),
            address("addr.remote"),
            FieldSpec::array("argv", FieldType::String),
            FieldSpec::int("cgroup_id"),
            FieldSpec::string("code"),
            FieldSpec::string("connector"),
            FieldSpec::int("ei"),
            FieldSpec::boolean("enhanced_recording"),
            FieldSpec::string("error"),
            FieldSpec::string("event").required(),
            FieldSpec::timestamp("expires"),
            FieldSpec::boolean("interactive"),
            FieldSpec::string("login"),
            FieldSpec::string("method"),
            FieldSpec::string("name"),
            FieldSpec::string("namespace"),
            FieldSpec::array("participants", FieldType::String),
            FieldSpec::string("path"),
            FieldSpec::int("pid"),
            FieldSpec::int("ppid"),
            FieldSpec::string("program"),
            FieldSpec::int("return_code"),
            FieldSpec::array("roles", FieldType::String),
            FieldSpec::int("rx"),
            address("server_addr"),
            FieldSpec::string("server_hostname").domain(),
            FieldSpec::string("server_id"),
            FieldSpec::json("server_labels"),
            FieldSpec::timestamp("session_start"),
            FieldSpec::timestamp("session_stop"),
            FieldSpec::string("sid").trace_id(),
            FieldSpec::string("size"),
            FieldSpec::boolean("success"),
            FieldSpec::timestamp("time"),
            FieldSpec::int("tx"),
            FieldSpec::string("uid"),
            FieldSpec::string("user"),
        ])
        .build()
}
