//! 스키마 기반 JSON 파서
//!
//! 하나의 페이로드에 들어 있는 연속된 JSON 객체를 읽어
//! [`Schema`] 선언에 맞춰 [`CanonicalRecord`]로 변환합니다.
//!
//! - 모든 키는 원본 순서를 유지합니다. 선언되지 않은 키는 추가 필드로 표시됩니다.
//! - 메타 필드(`p_*`)와 이름이 같은 입력 키는 버려집니다.
//! - 필드 값은 선언된 타입과 재귀적으로 대조합니다. `null`은 항상 허용됩니다.
//!
//! # 사용 예시
//! ```
//! use normlog_core::pipeline::LogParser;
//! use normlog_core::schema::{FieldSpec, SchemaBuilder};
//! use normlog_log_pipeline::parser::JsonSchemaParser;
//!
//! let schema = SchemaBuilder::new("Example.Audit")
//!     .event_time("time")
//!     .field(FieldSpec::timestamp("time"))
//!     .field(FieldSpec::string("client").ip())
//!     .build()
//!     .unwrap();
//! let parser = JsonSchemaParser::new(schema);
//!
//! let records = parser
//!     .parse(br#"{"time":"2024-01-15T12:00:00Z","client":"10.0.0.1","note":"x"}"#)
//!     .unwrap();
//! assert_eq!(records.len(), 1);
//! assert!(records[0].is_extra("note"));
//! ```

use chrono::DateTime;
use normlog_core::error::ParseError;
use normlog_core::pipeline::LogParser;
use normlog_core::record::CanonicalRecord;
use normlog_core::schema::{FieldSpec, FieldType, Schema};
use normlog_core::walker::json_kind;
use serde_json::{Map, Value};

/// 기본 최대 입력 크기 (1MB)
pub const DEFAULT_MAX_INPUT_SIZE: usize = 1024 * 1024;

/// RFC 3339 외에 허용하는 타임스탬프 형식 (콜론 없는 오프셋)
const COMPACT_OFFSET_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

/// 스키마 기반 JSON 파서
pub struct JsonSchemaParser {
    schema: Schema,
    /// 최대 허용 입력 크기 (바이트)
    max_input_size: usize,
    /// 타임스탬프 필드 형식 검증 여부
    strict_timestamps: bool,
}

impl JsonSchemaParser {
    /// 스키마로 새 파서를 생성합니다.
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            max_input_size: DEFAULT_MAX_INPUT_SIZE,
            strict_timestamps: false,
        }
    }

    /// 최대 입력 크기를 설정합니다.
    pub fn with_max_input_size(mut self, size: usize) -> Self {
        self.max_input_size = size;
        self
    }

    /// 타임스탬프 필드를 엄격하게 검증할지 설정합니다.
    pub fn with_strict_timestamps(mut self, strict: bool) -> Self {
        self.strict_timestamps = strict;
        self
    }

    pub fn max_input_size(&self) -> usize {
        self.max_input_size
    }

    pub fn strict_timestamps(&self) -> bool {
        self.strict_timestamps
    }
}

impl LogParser for JsonSchemaParser {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn parse(&self, raw: &[u8]) -> Result<Vec<CanonicalRecord>, ParseError> {
        let log_type = self.schema.log_type();
        check_size(log_type, raw, self.max_input_size)?;

        let mut records = Vec::new();
        for (index, value) in json_values(log_type, raw).enumerate() {
            let record = match value? {
                Value::Object(map) => {
                    decode_object(&self.schema, map, index, self.strict_timestamps)?
                }
                other => {
                    return Err(ParseError::NotAnObject {
                        log_type: log_type.to_owned(),
                        record: index,
                        found: json_kind(&other).to_owned(),
                    });
                }
            };
            records.push(record);
        }
        Ok(records)
    }
}

/// 입력 크기가 한도를 넘으면 [`ParseError::TooLarge`]를 반환합니다.
pub fn check_size(log_type: &str, raw: &[u8], max: usize) -> Result<(), ParseError> {
    if raw.len() > max {
        return Err(ParseError::TooLarge {
            log_type: log_type.to_owned(),
            size: raw.len(),
            max,
        });
    }
    Ok(())
}

/// 페이로드에서 공백으로 구분된 JSON 값을 순서대로 읽습니다.
///
/// 문법 오류를 만나면 [`ParseError::Malformed`]를 한 번 내보내고 끝납니다.
/// 빈 페이로드는 값을 하나도 내보내지 않습니다.
pub fn json_values<'a>(
    log_type: &'a str,
    raw: &'a [u8],
) -> impl Iterator<Item = Result<Value, ParseError>> + 'a {
    let mut stream = serde_json::Deserializer::from_slice(raw).into_iter::<Value>();
    let mut index = 0;
    let mut failed = false;

    std::iter::from_fn(move || {
        if failed {
            return None;
        }
        let item = match stream.next()? {
            Ok(value) => Ok(value),
            Err(e) => {
                failed = true;
                Err(ParseError::Malformed {
                    log_type: log_type.to_owned(),
                    record: index,
                    offset: error_offset(raw, e.line(), e.column()),
                    reason: e.to_string(),
                })
            }
        };
        index += 1;
        Some(item)
    })
}

/// serde_json의 줄/열 위치를 바이트 오프셋으로 변환합니다.
fn error_offset(raw: &[u8], line: usize, column: usize) -> usize {
    let line_start: usize = raw
        .split(|b| *b == b'\n')
        .take(line.saturating_sub(1))
        .map(|l| l.len() + 1)
        .sum();
    (line_start + column.saturating_sub(1)).min(raw.len())
}

/// JSON 객체 하나를 스키마에 맞춰 레코드로 변환합니다.
///
/// 메타 필드는 채우지 않습니다. 커스텀 파서가 봉투(envelope)를 벗겨낸 뒤
/// 이 함수를 재사용할 수 있도록 공개합니다.
pub fn decode_object(
    schema: &Schema,
    object: Map<String, Value>,
    record_index: usize,
    strict_timestamps: bool,
) -> Result<CanonicalRecord, ParseError> {
    let checker = Checker {
        log_type: schema.log_type(),
        record: record_index,
        strict_timestamps,
    };

    for (key, value) in &object {
        if let Some(spec) = schema.field(key) {
            checker.check(value, spec.ty(), spec.name())?;
        }
    }

    for spec in schema.fields().iter().filter(|spec| spec.is_required()) {
        if matches!(object.get(spec.name()), None | Some(Value::Null)) {
            return Err(checker.missing(spec.name()));
        }
    }

    Ok(CanonicalRecord::from_source(object, |key| {
        schema.field(key).is_some()
    }))
}

struct Checker<'a> {
    log_type: &'a str,
    record: usize,
    strict_timestamps: bool,
}

impl Checker<'_> {
    fn check(&self, value: &Value, ty: &FieldType, path: &str) -> Result<(), ParseError> {
        let ok = match (ty, value) {
            (_, Value::Null) | (FieldType::Json, _) => true,
            (FieldType::String, Value::String(_)) => true,
            (FieldType::Timestamp, Value::String(s)) => {
                if self.strict_timestamps && !is_valid_timestamp(s) {
                    return Err(self.mismatch(path, format!("invalid timestamp '{s}'")));
                }
                true
            }
            (FieldType::Int, Value::Number(n)) => n.is_i64() || n.is_u64(),
            (FieldType::Float, Value::Number(_)) => true,
            (FieldType::Bool, Value::Bool(_)) => true,
            (FieldType::Array(inner), Value::Array(items)) => {
                for (i, item) in items.iter().enumerate() {
                    self.check(item, inner, &format!("{path}[{i}]"))?;
                }
                true
            }
            (FieldType::Object(children), Value::Object(map)) => {
                self.check_object(map, children, path)?;
                true
            }
            _ => false,
        };

        if ok {
            Ok(())
        } else {
            Err(self.mismatch(path, format!("expected {ty}, found {}", json_kind(value))))
        }
    }

    fn check_object(
        &self,
        map: &Map<String, Value>,
        children: &[FieldSpec],
        path: &str,
    ) -> Result<(), ParseError> {
        for child in children {
            let child_path = format!("{path}.{}", child.name());
            match map.get(child.name()) {
                Some(Value::Null) | None if child.is_required() => {
                    return Err(self.missing(&child_path));
                }
                Some(value) => self.check(value, child.ty(), &child_path)?,
                None => {}
            }
        }
        Ok(())
    }

    fn missing(&self, field: &str) -> ParseError {
        ParseError::MissingField {
            log_type: self.log_type.to_owned(),
            record: self.record,
            field: field.to_owned(),
        }
    }

    fn mismatch(&self, field: &str, reason: String) -> ParseError {
        ParseError::SchemaMismatch {
            log_type: self.log_type.to_owned(),
            record: self.record,
            field: field.to_owned(),
            reason,
        }
    }
}

/// RFC 3339 또는 콜론 없는 오프셋(`+0000`) 형식인지 확인합니다.
fn is_valid_timestamp(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
        || DateTime::parse_from_str(value, COMPACT_OFFSET_FORMAT).is_ok()
}
