//! 지표 추출기 -- 스키마 선언을 따라 레코드를 순회하며 메타 필드를 채웁니다.
//!
//! 추출기는 특정 로그 형식을 알지 못합니다. [`Schema`]의 필드 선언 순서대로
//! 레코드 값 트리를 따라 내려가며(중첩 객체, 배열 포함) 지표로 선언된 문자열을
//! 해당 집합에 추가합니다. 결과 순서는 원본 페이로드의 키 순서가 아니라 선언 순서를 따릅니다.
//!
//! 값은 문법적으로만 다룹니다. 대소문자 변환이나 의미상 동일한 값의 병합은 하지 않습니다.

use serde_json::{Map, Value};

use crate::error::ParseError;
use crate::indicator::IndicatorKind;
use crate::record::{CanonicalRecord, MetaFields};
use crate::schema::{FieldType, IndicatorDecl, Schema};

/// 추출 결과 요약
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    pub ip_addresses: usize,
    pub domain_names: usize,
    pub trace_ids: usize,
}

impl ExtractionStats {
    fn from_meta(meta: &MetaFields) -> Self {
        Self {
            ip_addresses: meta.indicators(IndicatorKind::IpAddress).len(),
            domain_names: meta.indicators(IndicatorKind::DomainName).len(),
            trace_ids: meta.indicators(IndicatorKind::TraceId).len(),
        }
    }

    pub fn count(&self, kind: IndicatorKind) -> usize {
        match kind {
            IndicatorKind::IpAddress => self.ip_addresses,
            IndicatorKind::DomainName => self.domain_names,
            IndicatorKind::TraceId => self.trace_ids,
        }
    }

    pub fn total(&self) -> usize {
        self.ip_addresses + self.domain_names + self.trace_ids
    }
}

/// 스키마 기반 지표 추출기
pub struct IndicatorWalker<'a> {
    schema: &'a Schema,
}

impl<'a> IndicatorWalker<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    /// 레코드의 메타 필드를 채웁니다.
    ///
    /// 1. 지정된 이벤트 시각 필드를 원본 그대로 `p_event_time`에 복사
    /// 2. 선언된 필드를 선언 순서대로 순회하며 지표 수집
    /// 3. 추가 필드에 대한 지표 선언 처리
    /// 4. `p_log_type` 설정
    ///
    /// 이벤트 시각이 없거나 비어 있으면 `record_index`가 담긴 [`ParseError`]를 반환합니다.
    pub fn apply(
        &self,
        record: &mut CanonicalRecord,
        record_index: usize,
    ) -> Result<ExtractionStats, ParseError> {
        let schema = self.schema;
        let (fields, extra_keys, meta) = record.split_meta_mut();

        let event_time = self.event_time(fields, record_index)?;
        meta.set_event_time(event_time);

        for spec in schema.fields() {
            if let Some(value) = fields.get(spec.name()) {
                visit(value, spec.ty(), spec.indicator_decl(), meta);
            }
        }

        for (name, kind) in schema.extra_indicators() {
            if !extra_keys.iter().any(|k| k == name) {
                continue;
            }
            if let Some(value) = fields.get(name) {
                let decl = IndicatorDecl {
                    kind: *kind,
                    format: Default::default(),
                };
                visit(value, &FieldType::String, Some(decl), meta);
            }
        }

        meta.set_log_type(schema.log_type().to_owned());
        Ok(ExtractionStats::from_meta(meta))
    }

    fn event_time(
        &self,
        fields: &Map<String, Value>,
        record_index: usize,
    ) -> Result<String, ParseError> {
        let name = self.schema.event_time_field();
        match fields.get(name) {
            Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
            None | Some(Value::Null) | Some(Value::String(_)) => Err(ParseError::MissingField {
                log_type: self.schema.log_type().to_owned(),
                record: record_index,
                field: name.to_owned(),
            }),
            Some(other) => Err(ParseError::SchemaMismatch {
                log_type: self.schema.log_type().to_owned(),
                record: record_index,
                field: name.to_owned(),
                reason: format!("event time must be a string, found {}", json_kind(other)),
            }),
        }
    }
}

fn visit(value: &Value, ty: &FieldType, decl: Option<IndicatorDecl>, meta: &mut MetaFields) {
    match value {
        Value::String(s) => {
            if let Some(decl) = decl {
                meta.indicators_mut(decl.kind).insert(decl.format.apply(s));
            }
        }
        Value::Array(items) => {
            let element = match ty {
                FieldType::Array(inner) => inner.as_ref(),
                other => other,
            };
            for item in items {
                visit(item, element, decl, meta);
            }
        }
        Value::Object(map) => {
            if let FieldType::Object(children) = ty {
                for child in children {
                    if let Some(v) = map.get(child.name()) {
                        visit(v, child.ty(), child.indicator_decl(), meta);
                    }
                }
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

/// JSON 값의 종류 이름 (에러 메시지용)
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
