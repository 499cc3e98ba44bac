//! AWS CloudTrail 이벤트
//!
//! CloudTrail은 S3로 전달할 때 여러 이벤트를 `{"Records": [...]}` 봉투로 묶고,
//! EventBridge/CloudWatch 경로에서는 이벤트 하나를 그대로 보냅니다.
//! [`CloudTrailParser`]는 두 형식을 모두 받아 이벤트마다 레코드 하나를 만듭니다.

use normlog_core::error::{ParseError, SchemaError};
use normlog_core::pipeline::LogParser;
use normlog_core::record::CanonicalRecord;
use normlog_core::schema::{FieldSpec, FieldType, Schema, SchemaBuilder};
use normlog_core::walker::json_kind;
use serde_json::{Map, Value};

use super::json::{check_size, decode_object, json_values, DEFAULT_MAX_INPUT_SIZE};

pub const LOG_TYPE: &str = "AWS.CloudTrail";

const RECORDS_KEY: &str = "Records";

/// CloudTrail 이벤트 스키마
pub fn schema() -> Result<Schema, SchemaError> {
    let user_identity = vec![
        FieldSpec::string("type"),
        FieldSpec::string("principalId"),
        FieldSpec::string("arn"),
        FieldSpec::string("accountId"),
        FieldSpec::string("accessKeyId"),
        FieldSpec::string("userName"),
        FieldSpec::json("sessionContext"),
        FieldSpec::string("invokedBy").domain(),
        FieldSpec::string("identityProvider"),
    ];

    let resource = FieldType::Object(vec![
        FieldSpec::string("ARN"),
        FieldSpec::string("accountId"),
        FieldSpec::string("type"),
    ]);

    let tls_details = vec![
        FieldSpec::string("tlsVersion"),
        FieldSpec::string("cipherSuite"),
        FieldSpec::string("clientProvidedHostHeader").domain(),
    ];

    SchemaBuilder::new(LOG_TYPE)
        .description("AWSCloudTrail represents the content of a CloudTrail S3 object.")
        .reference_url("https://docs.aws.amazon.com/awscloudtrail/latest/userguide/cloudtrail-event-reference.html")
        .event_time("eventTime")
        .fields([
            FieldSpec::json("additionalEventData"),
            FieldSpec::string("apiVersion"),
            FieldSpec::string("awsRegion").required(),
            FieldSpec::string("errorCode"),
            FieldSpec::string("errorMessage"),
            FieldSpec::string("eventCategory"),
            FieldSpec::string("eventID").required().trace_id(),
            FieldSpec::string("eventName").required(),
            FieldSpec::string("eventSource").required().domain(),
            FieldSpec::timestamp("eventTime"),
            FieldSpec::string("eventType"),
            FieldSpec::string("eventVersion"),
            FieldSpec::boolean("managementEvent"),
            FieldSpec::boolean("readOnly"),
            FieldSpec::string("recipientAccountId"),
            FieldSpec::string("requestID").trace_id(),
            FieldSpec::json("requestParameters"),
            FieldSpec::array("resources", resource),
            FieldSpec::json("responseElements"),
            FieldSpec::json("serviceEventDetails"),
            FieldSpec::string("sharedEventID").trace_id(),
            FieldSpec::string("sourceIPAddress").ip(),
            FieldSpec::object("tlsDetails", tls_details),
            FieldSpec::string("userAgent"),
            FieldSpec::object("userIdentity", user_identity),
            FieldSpec::string("vpcEndpointId"),
        ])
        .build()
}

/// CloudTrail 파서
///
/// 봉투 형식이면 `Records` 배열의 원소마다, 아니면 객체 자체를 레코드로 만듭니다.
/// 빈 `Records` 배열은 레코드 0개입니다.
pub struct CloudTrailParser {
    schema: Schema,
    max_input_size: usize,
    strict_timestamps: bool,
}

impl CloudTrailParser {
    pub fn new() -> Result<Self, SchemaError> {
        Ok(Self {
            schema: schema()?,
            max_input_size: DEFAULT_MAX_INPUT_SIZE,
            strict_timestamps: false,
        })
    }

    pub fn with_max_input_size(mut self, size: usize) -> Self {
        self.max_input_size = size;
        self
    }

    pub fn with_strict_timestamps(mut self, strict: bool) -> Self {
        self.strict_timestamps = strict;
        self
    }

    fn decode(&self, value: Value, index: usize) -> Result<CanonicalRecord, ParseError> {
        match value {
            Value::Object(map) => decode_object(&self.schema, map, index, self.strict_timestamps),
            other => Err(ParseError::NotAnObject {
                log_type: LOG_TYPE.to_owned(),
                record: index,
                found: json_kind(&other).to_owned(),
            }),
        }
    }
}

impl LogParser for CloudTrailParser {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn parse(&self, raw: &[u8]) -> Result<Vec<CanonicalRecord>, ParseError> {
        check_size(LOG_TYPE, raw, self.max_input_size)?;

        let mut records = Vec::new();
        for value in json_values(LOG_TYPE, raw) {
            match value? {
                Value::Object(mut map) => match take_envelope_records(&mut map) {
                    Some(items) => {
                        for item in items {
                            let record = self.decode(item, records.len())?;
                            records.push(record);
                        }
                    }
                    None => {
                        let record = self.decode(Value::Object(map), records.len())?;
                        records.push(record);
                    }
                },
                other => {
                    return Err(ParseError::NotAnObject {
                        log_type: LOG_TYPE.to_owned(),
                        record: records.len(),
                        found: json_kind(&other).to_owned(),
                    });
                }
            }
        }
        Ok(records)
    }
}

fn take_envelope_records(map: &mut Map<String, Value>) -> Option<Vec<Value>> {
    match map.get_mut(RECORDS_KEY) {
        Some(Value::Array(items)) => Some(std::mem::take(items)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const EVENT: &str = r#"{
        "eventVersion": "1.08",
        "userIdentity": {"type": "AWSService", "invokedBy": "ec2.amazonaws.com"},
        "eventTime": "2021-03-01T20:48:41Z",
        "eventSource": "sts.amazonaws.com",
        "eventName": "AssumeRole",
        "awsRegion": "us-east-1",
        "sourceIPAddress": "ec2.amazonaws.com",
        "requestID": "a0d1c6f8-7b2a-4f0e-9d1c-1e2f3a4b5c6d",
        "eventID": "4b7c2f10-1a5e-4bd4-8f0d-9c2a7e1b3d4f",
        "readOnly": true,
        "resources": [{"ARN": "arn:aws:iam::123456789012:role/demo", "type": "AWS::IAM::Role"}]
    }"#;

    fn parser() -> CloudTrailParser {
        CloudTrailParser::new().unwrap()
    }

    #[test]
    fn bare_record() {
        let records = parser().parse(EVENT.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].field("eventName"), Some(&json!("AssumeRole")));
    }

    #[test]
    fn envelope_yields_one_record_per_element() {
        let raw = format!(r#"{{"Records": [{EVENT}, {EVENT}, {EVENT}]}}"#);
        let records = parser().parse(raw.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn empty_envelope_yields_no_records() {
        let records = parser().parse(br#"{"Records": []}"#).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn bad_element_reports_its_index() {
        let raw = format!(r#"{{"Records": [{EVENT}, {{"eventName": "x"}}]}}"#);
        let err = parser().parse(raw.as_bytes()).unwrap_err();
        assert_eq!(err.record_index(), Some(1));
        assert!(matches!(err, ParseError::MissingField { .. }));
    }

    #[test]
    fn non_object_element_is_rejected() {
        let err = parser().parse(br#"{"Records": [1]}"#).unwrap_err();
        assert!(matches!(err, ParseError::NotAnObject { record: 0, .. }));
    }

    #[test]
    fn missing_required_field() {
        let err = parser()
            .parse(br#"{"eventTime": "2021-03-01T20:48:41Z"}"#)
            .unwrap_err();
        assert!(matches!(err, ParseError::MissingField { .. }));
    }
}
