//! 로그 타입 스키마 -- 필드 타입과 지표 선언
//!
//! 각 로그 타입은 시작 시점에 한 번 [`Schema`]를 만들어 등록합니다.
//! 스키마는 필드 타입 트리와, 그 필드에 붙는 지표 선언(IP/도메인/추적 ID)을 담습니다.
//! 추출기는 이 선언만 읽어 동작하므로, 새 로그 형식을 추가할 때 추출 코드를 고칠 필요가 없습니다.
//!
//! # 사용 예시
//! ```
//! use normlog_core::schema::{FieldSpec, FieldType, SchemaBuilder};
//!
//! let schema = SchemaBuilder::new("Example.Audit")
//!     .description("Example audit log")
//!     .event_time("time")
//!     .field(FieldSpec::timestamp("time"))
//!     .field(FieldSpec::string("client_ip").ip())
//!     .field(FieldSpec::array("hosts", FieldType::String).domain())
//!     .field(FieldSpec::string("session").trace_id())
//!     .build()
//!     .unwrap();
//! assert_eq!(schema.event_time_field(), "time");
//! ```

use std::collections::HashSet;
use std::fmt;

use crate::error::SchemaError;
use crate::indicator::IndicatorKind;

/// 필드 타입
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// 문자열
    String,
    /// 문자열로 표현된 타임스탬프 (원본 표현 그대로 보존)
    Timestamp,
    /// 정수
    Int,
    /// 실수
    Float,
    /// 불리언
    Bool,
    /// 임의의 JSON 값 (타입 검사 없음)
    Json,
    /// 동일 타입 원소의 배열
    Array(Box<FieldType>),
    /// 중첩 객체 (선언된 하위 필드)
    Object(Vec<FieldSpec>),
}

impl FieldType {
    /// 배열을 모두 벗겨낸 원소 타입
    pub fn element(&self) -> &FieldType {
        match self {
            Self::Array(inner) => inner.element(),
            other => other,
        }
    }

    fn is_textual(&self) -> bool {
        matches!(self, Self::String | Self::Timestamp)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("string"),
            Self::Timestamp => f.write_str("timestamp"),
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Bool => f.write_str("bool"),
            Self::Json => f.write_str("json"),
            Self::Array(inner) => write!(f, "array<{inner}>"),
            Self::Object(_) => f.write_str("object"),
        }
    }
}

/// 지표 값 변환 방식
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValueFormat {
    /// 값을 그대로 사용
    #[default]
    Verbatim,
    /// `host:port` 형식에서 호스트만 사용 (`[::1]:22` → `::1`)
    HostPort,
}

impl ValueFormat {
    /// 원본 문자열에서 지표 값을 꺼냅니다.
    pub fn apply<'a>(&self, value: &'a str) -> &'a str {
        match self {
            Self::Verbatim => value,
            Self::HostPort => split_host_port(value),
        }
    }
}

fn split_host_port(value: &str) -> &str {
    if let Some(rest) = value.strip_prefix('[') {
        return match rest.find(']') {
            Some(end) => &rest[..end],
            None => value,
        };
    }
    match value.rsplit_once(':') {
        Some((host, port))
            if !host.contains(':') && !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) =>
        {
            host
        }
        _ => value,
    }
}

/// 지표 선언
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorDecl {
    pub kind: IndicatorKind,
    pub format: ValueFormat,
}

/// 필드 선언
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    name: String,
    ty: FieldType,
    required: bool,
    indicator: Option<IndicatorDecl>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            required: false,
            indicator: None,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::String)
    }

    pub fn timestamp(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Timestamp)
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Int)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Float)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Bool)
    }

    pub fn json(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Json)
    }

    pub fn array(name: impl Into<String>, element: FieldType) -> Self {
        Self::new(name, FieldType::Array(Box::new(element)))
    }

    pub fn object(name: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self::new(name, FieldType::Object(fields))
    }

    /// 필수 필드로 표시합니다.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// 지표 선언을 붙입니다.
    pub fn indicator(mut self, kind: IndicatorKind, format: ValueFormat) -> Self {
        self.indicator = Some(IndicatorDecl { kind, format });
        self
    }

    pub fn ip(self) -> Self {
        self.indicator(IndicatorKind::IpAddress, ValueFormat::Verbatim)
    }

    pub fn domain(self) -> Self {
        self.indicator(IndicatorKind::DomainName, ValueFormat::Verbatim)
    }

    pub fn trace_id(self) -> Self {
        self.indicator(IndicatorKind::TraceId, ValueFormat::Verbatim)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &FieldType {
        &self.ty
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn indicator_decl(&self) -> Option<IndicatorDecl> {
        self.indicator
    }
}

/// 로그 타입 스키마
///
/// [`SchemaBuilder::build`]로만 생성되므로 항상 검증된 상태입니다.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    log_type: String,
    description: String,
    reference_url: Option<String>,
    event_time_field: String,
    fields: Vec<FieldSpec>,
    extra_indicators: Vec<(String, IndicatorKind)>,
}

impl Schema {
    pub fn log_type(&self) -> &str {
        &self.log_type
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn reference_url(&self) -> Option<&str> {
        self.reference_url.as_deref()
    }

    /// `p_event_time`의 원본이 되는 최상위 필드 이름
    pub fn event_time_field(&self) -> &str {
        &self.event_time_field
    }

    /// 최상위 필드 선언 (선언 순서)
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// 이름으로 최상위 필드 선언을 찾습니다.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// 추가 필드 컨테이너에 대한 지표 선언 (선언 순서)
    pub fn extra_indicators(&self) -> &[(String, IndicatorKind)] {
        &self.extra_indicators
    }
}

/// 스키마 빌더
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    log_type: String,
    description: String,
    reference_url: Option<String>,
    event_time_field: Option<String>,
    fields: Vec<FieldSpec>,
    extra_indicators: Vec<(String, IndicatorKind)>,
}

impl SchemaBuilder {
    pub fn new(log_type: impl Into<String>) -> Self {
        Self {
            log_type: log_type.into(),
            description: String::new(),
            reference_url: None,
            event_time_field: None,
            fields: Vec::new(),
            extra_indicators: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn reference_url(mut self, url: impl Into<String>) -> Self {
        self.reference_url = Some(url.into());
        self
    }

    /// `p_event_time`의 원본 필드를 지정합니다. 해당 필드는 필수 필드가 됩니다.
    pub fn event_time(mut self, field: impl Into<String>) -> Self {
        self.event_time_field = Some(field.into());
        self
    }

    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    pub fn fields(mut self, specs: impl IntoIterator<Item = FieldSpec>) -> Self {
        self.fields.extend(specs);
        self
    }

    /// 스키마에 모델링되지 않은 키가 추가 필드로 들어왔을 때 적용할 지표를 선언합니다.
    pub fn extra_indicator(mut self, name: impl Into<String>, kind: IndicatorKind) -> Self {
        self.extra_indicators.push((name.into(), kind));
        self
    }

    /// 선언을 검증하고 스키마를 생성합니다.
    pub fn build(mut self) -> Result<Schema, SchemaError> {
        if self.log_type.trim().is_empty() {
            return Err(SchemaError::EmptyLogType);
        }
        let log_type = self.log_type.clone();

        let event_time_field = self
            .event_time_field
            .take()
            .ok_or_else(|| SchemaError::MissingEventTime {
                log_type: log_type.clone(),
            })?;

        validate_fields(&log_type, "", &self.fields)?;

        let time_spec = self
            .fields
            .iter_mut()
            .find(|f| f.name == event_time_field)
            .ok_or_else(|| SchemaError::InvalidEventTimeField {
                log_type: log_type.clone(),
                field: event_time_field.clone(),
                reason: "is not a declared top-level field".to_owned(),
            })?;
        if !time_spec.ty.is_textual() {
            return Err(SchemaError::InvalidEventTimeField {
                log_type,
                field: event_time_field,
                reason: format!("must be a string or timestamp, not {}", time_spec.ty),
            });
        }
        time_spec.required = true;

        validate_extra_indicators(&log_type, &self.fields, &self.extra_indicators)?;

        Ok(Schema {
            log_type: self.log_type,
            description: self.description,
            reference_url: self.reference_url,
            event_time_field,
            fields: self.fields,
            extra_indicators: self.extra_indicators,
        })
    }
}

fn validate_fields(log_type: &str, prefix: &str, fields: &[FieldSpec]) -> Result<(), SchemaError> {
    let mut names = HashSet::new();
    for spec in fields {
        let path = if prefix.is_empty() {
            spec.name.clone()
        } else {
            format!("{prefix}.{}", spec.name)
        };

        if !names.insert(spec.name.as_str()) {
            return Err(SchemaError::DuplicateField {
                log_type: log_type.to_owned(),
                field: path,
            });
        }

        let element = spec.ty.element();
        if spec.indicator.is_some() && !element.is_textual() {
            return Err(SchemaError::InvalidIndicator {
                log_type: log_type.to_owned(),
                field: path,
                reason: format!("expected string values, field is {}", spec.ty),
            });
        }

        if let FieldType::Object(children) = element {
            validate_fields(log_type, &path, children)?;
        }
    }
    Ok(())
}

fn validate_extra_indicators(
    log_type: &str,
    fields: &[FieldSpec],
    extra: &[(String, IndicatorKind)],
) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for (name, _) in extra {
        let reason = if name.is_empty() {
            "name must not be empty"
        } else if fields.iter().any(|f| &f.name == name) {
            "collides with a declared field"
        } else if !seen.insert(name.as_str()) {
            "declared twice"
        } else {
            continue;
        };
        return Err(SchemaError::InvalidExtraIndicator {
            log_type: log_type.to_owned(),
            field: name.clone(),
            reason: reason.to_owned(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> SchemaBuilder {
        SchemaBuilder::new("Test.Log")
            .event_time("time")
            .field(FieldSpec::timestamp("time"))
    }

    #[test]
    fn build_marks_event_time_required() {
        let schema = base().build().unwrap();
        assert!(schema.field("time").unwrap().is_required());
    }

    #[test]
    fn build_rejects_empty_log_type() {
        let err = SchemaBuilder::new(" ").build().unwrap_err();
        assert_eq!(err, SchemaError::EmptyLogType);
    }

    #[test]
    fn build_rejects_missing_event_time() {
        let err = SchemaBuilder::new("Test.Log")
            .field(FieldSpec::timestamp("time"))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::MissingEventTime { .. }));
    }

    #[test]
    fn build_rejects_undeclared_event_time() {
        let err = SchemaBuilder::new("Test.Log")
            .event_time("ts")
            .field(FieldSpec::timestamp("time"))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidEventTimeField { .. }));
    }

    #[test]
    fn build_rejects_numeric_event_time() {
        let err = SchemaBuilder::new("Test.Log")
            .event_time("time")
            .field(FieldSpec::int("time"))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("must be a string or timestamp"));
    }

    #[test]
    fn build_rejects_indicator_on_object() {
        let err = base()
            .field(FieldSpec::object("labels", vec![FieldSpec::string("env")]).ip())
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidIndicator { ref field, .. } if field == "labels"));
    }

    #[test]
    fn build_rejects_indicator_on_number_array() {
        let err = base()
            .field(FieldSpec::array("ports", FieldType::Int).trace_id())
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidIndicator { .. }));
    }

    #[test]
    fn build_rejects_indicator_on_json() {
        let err = base().field(FieldSpec::json("blob").domain()).build().unwrap_err();
        assert!(matches!(err, SchemaError::InvalidIndicator { .. }));
    }

    #[test]
    fn build_rejects_nested_indicator_on_bool() {
        let err = base()
            .field(FieldSpec::object(
                "dns",
                vec![FieldSpec::boolean("qr").domain()],
            ))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidIndicator { ref field, .. } if field == "dns.qr"));
    }

    #[test]
    fn build_rejects_duplicate_fields() {
        let err = base().field(FieldSpec::string("time")).build().unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateField { .. }));
    }

    #[test]
    fn build_accepts_indicator_on_string_array_of_objects() {
        let schema = base()
            .field(FieldSpec::array(
                "answers",
                FieldType::Object(vec![FieldSpec::string("rrname").domain()]),
            ))
            .build()
            .unwrap();
        assert_eq!(schema.fields().len(), 2);
    }

    #[test]
    fn build_rejects_extra_indicator_collision() {
        let err = base()
            .extra_indicator("time", IndicatorKind::IpAddress)
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidExtraIndicator { .. }));
    }

    #[test]
    fn host_port_format() {
        let f = ValueFormat::HostPort;
        assert_eq!(f.apply("1.1.1.1:63558"), "1.1.1.1");
        assert_eq!(f.apply("127.0.0.1:3022"), "127.0.0.1");
        assert_eq!(f.apply("[::]:3022"), "::");
        assert_eq!(f.apply("[fe80::1]"), "fe80::1");
        assert_eq!(f.apply("10.0.0.1"), "10.0.0.1");
        assert_eq!(f.apply("::1"), "::1");
        assert_eq!(f.apply("host.example.com:http"), "host.example.com:http");
    }

    #[test]
    fn field_type_display() {
        let ty = FieldType::Array(Box::new(FieldType::String));
        assert_eq!(ty.to_string(), "array<string>");
    }
}
