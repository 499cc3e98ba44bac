//! Suricata EVE DNS 이벤트
//!
//! `event_type: "dns"` 레코드를 처리합니다. 질의(`dns.rrname`)와
//! 응답 목록(`dns.answers[].rrname`) 양쪽에서 도메인 지표를 모읍니다.

use normlog_core::error::SchemaError;
use normlog_core::schema::{FieldSpec, FieldType, Schema, SchemaBuilder};

pub const LOG_TYPE: &str = "Suricata.DNS";

/// Suricata DNS 이벤트 스키마
pub fn schema() -> Result<Schema, SchemaError> {
    let answer = FieldType::Object(vec![
        FieldSpec::string("rrname").domain(),
        FieldSpec::string("rrtype"),
        FieldSpec::int("ttl"),
        FieldSpec::string("rdata"),
    ]);

    let dns = vec![
        FieldSpec::string("type"),
        FieldSpec::int("id"),
        FieldSpec::string("flags"),
        FieldSpec::boolean("qr"),
        FieldSpec::boolean("rd"),
        FieldSpec::boolean("ra"),
        FieldSpec::string("rrname").domain(),
        FieldSpec::string("rrtype"),
        FieldSpec::string("rcode"),
        FieldSpec::int("ttl"),
        FieldSpec::int("tx_id"),
        FieldSpec::string("rdata"),
        FieldSpec::array("answers", answer),
        FieldSpec::json("grouped"),
    ];

    SchemaBuilder::new(LOG_TYPE)
        .description("Suricata parser for the DNS event type in the EVE JSON output.")
        .reference_url("https://suricata.readthedocs.io/en/latest/output/eve/eve-json-format.html#event-type-dns")
        .event_time("timestamp")
        .fields([
            FieldSpec::timestamp("timestamp"),
            FieldSpec::int("flow_id"),
            FieldSpec::string("in_iface"),
            FieldSpec::string("event_type").required(),
            FieldSpec::array("vlan", FieldType::Int),
            FieldSpec::string("src_ip").ip(),
            FieldSpec::int("src_port"),
            FieldSpec::string("dest_ip").ip(),
            FieldSpec::int("dest_port"),
            FieldSpec::string("proto"),
            FieldSpec::int("pcap_cnt"),
            FieldSpec::string("community_id").trace_id(),
            FieldSpec::object("dns", dns).required(),
        ])
        .build()
}
