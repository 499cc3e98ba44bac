//! 정규화 레코드 모델
//!
//! 모든 파서가 채우고 모든 하위 소비자가 읽는 공통 구조입니다.
//! 원본 필드는 그대로 보존하고, 그 위에 메타 필드(`p_*`)를 덧붙입니다.
//!
//! # 직렬화 필드 순서
//! ```text
//! <source fields (source order, additional fields included)>
//! p_event_time p_any_ip_addresses p_any_domain_names p_any_trace_ids p_log_type
//! ```
//! 비어 있는 지표 집합은 키 자체가 생략되고, `p_event_time`과 `p_log_type`은 항상 출력됩니다.
//! 원본에 있던 `p_*` 키는 레코드에 들어오지 않으므로 메타 필드가 중복 출력되지 않습니다.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

use crate::indicator::{IndicatorKind, IndicatorSet};

/// 이벤트 시각 메타 필드
pub const P_EVENT_TIME: &str = "p_event_time";
/// IP 주소 지표 메타 필드
pub const P_ANY_IP_ADDRESSES: &str = "p_any_ip_addresses";
/// 도메인 이름 지표 메타 필드
pub const P_ANY_DOMAIN_NAMES: &str = "p_any_domain_names";
/// 추적 ID 지표 메타 필드
pub const P_ANY_TRACE_IDS: &str = "p_any_trace_ids";
/// 로그 타입 메타 필드
pub const P_LOG_TYPE: &str = "p_log_type";

/// 파생 메타 필드
///
/// 파서가 직접 채우지 않으며, [`IndicatorWalker`](crate::walker::IndicatorWalker)만 기록합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaFields {
    event_time: Option<String>,
    ip_addresses: IndicatorSet,
    domain_names: IndicatorSet,
    trace_ids: IndicatorSet,
    log_type: Option<String>,
}

impl MetaFields {
    /// 이벤트 시각 (원본 값 그대로)
    pub fn event_time(&self) -> Option<&str> {
        self.event_time.as_deref()
    }

    /// 레코드를 생성한 파서의 로그 타입
    pub fn log_type(&self) -> Option<&str> {
        self.log_type.as_deref()
    }

    /// 지정한 종류의 지표 집합을 반환합니다.
    pub fn indicators(&self, kind: IndicatorKind) -> &IndicatorSet {
        match kind {
            IndicatorKind::IpAddress => &self.ip_addresses,
            IndicatorKind::DomainName => &self.domain_names,
            IndicatorKind::TraceId => &self.trace_ids,
        }
    }

    pub(crate) fn indicators_mut(&mut self, kind: IndicatorKind) -> &mut IndicatorSet {
        match kind {
            IndicatorKind::IpAddress => &mut self.ip_addresses,
            IndicatorKind::DomainName => &mut self.domain_names,
            IndicatorKind::TraceId => &mut self.trace_ids,
        }
    }

    pub(crate) fn set_event_time(&mut self, value: String) {
        self.event_time = Some(value);
    }

    pub(crate) fn set_log_type(&mut self, value: String) {
        self.log_type = Some(value);
    }
}

/// 메타 필드 이름 목록 (직렬화 순서)
pub const META_FIELDS: [&str; 5] = [
    P_EVENT_TIME,
    P_ANY_IP_ADDRESSES,
    P_ANY_DOMAIN_NAMES,
    P_ANY_TRACE_IDS,
    P_LOG_TYPE,
];

/// 메타 필드 이름인지 확인합니다.
pub fn is_meta_field(name: &str) -> bool {
    META_FIELDS.contains(&name)
}

/// 정규화 레코드
///
/// 원시 레코드 하나당 파서가 새로 생성합니다. 파싱 직후 지표 추출기가 메타 필드를
/// 채우고, 그 이후에는 읽기 전용으로 취급됩니다.
///
/// 원본 필드는 하나의 맵에 원본 순서대로 보관합니다. 스키마에 없는 필드는
/// 같은 맵에 그대로 두고 이름만 추가 필드 목록에 기록합니다.
/// 메타 필드와 이름이 같은 원본 키는 받아들이지 않습니다.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanonicalRecord {
    /// 원본 필드 (원본 순서, 추가 필드 포함)
    fields: Map<String, Value>,
    /// 추가 필드 이름 (원본 순서)
    extra_keys: Vec<String>,
    /// 파생 메타 필드
    meta: MetaFields,
}

impl CanonicalRecord {
    /// 모든 필드를 코어 필드로 취급해 새 레코드를 생성합니다. 메타 필드는 비어 있습니다.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self::from_source(fields, |_| true)
    }

    /// 원본 객체로 레코드를 생성합니다.
    ///
    /// `is_core`가 `false`를 반환한 키는 추가 필드로 기록됩니다. 키 순서는 그대로 유지되고,
    /// 메타 필드 이름과 같은 키는 버려집니다.
    pub fn from_source(source: Map<String, Value>, is_core: impl Fn(&str) -> bool) -> Self {
        let mut fields = Map::new();
        let mut extra_keys = Vec::new();
        for (key, value) in source {
            if is_meta_field(&key) {
                continue;
            }
            if !is_core(&key) {
                extra_keys.push(key.clone());
            }
            fields.insert(key, value);
        }
        Self {
            fields,
            extra_keys,
            meta: MetaFields::default(),
        }
    }

    /// 이름으로 필드를 조회합니다.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// 원본 필드 전체 (원본 순서)
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// 추가 필드 이름 (원본 순서)
    pub fn extra_keys(&self) -> &[String] {
        &self.extra_keys
    }

    pub fn is_extra(&self, name: &str) -> bool {
        self.extra_keys.iter().any(|k| k == name)
    }

    /// 추가 필드일 때만 값을 반환합니다.
    pub fn extra_field(&self, name: &str) -> Option<&Value> {
        if self.is_extra(name) {
            self.fields.get(name)
        } else {
            None
        }
    }

    /// 추가 필드를 원본 순서대로 순회합니다.
    pub fn extra(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.extra_keys
            .iter()
            .filter_map(move |k| self.fields.get(k).map(|v| (k.as_str(), v)))
    }

    /// 코어 필드를 설정합니다. 이미 있으면 제자리에서 값을 교체하고 기존 값을 반환합니다.
    ///
    /// 메타 필드 이름은 무시되며 `None`을 반환합니다.
    pub fn insert_field(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        let name = name.into();
        if is_meta_field(&name) {
            return None;
        }
        self.extra_keys.retain(|k| *k != name);
        self.fields.insert(name, value)
    }

    /// 추가 필드를 덧붙입니다. 이미 있는 키면 제자리에서 값을 교체합니다.
    ///
    /// 메타 필드 이름은 무시되며 `None`을 반환합니다.
    pub fn insert_extra(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        let name = name.into();
        if is_meta_field(&name) {
            return None;
        }
        if !self.is_extra(&name) {
            self.extra_keys.push(name.clone());
        }
        self.fields.insert(name, value)
    }

    pub fn meta(&self) -> &MetaFields {
        &self.meta
    }

    #[cfg(test)]
    pub(crate) fn meta_mut(&mut self) -> &mut MetaFields {
        &mut self.meta
    }

    /// 필드는 읽기 전용으로, 메타 필드는 쓰기 가능하게 나누어 빌립니다.
    pub(crate) fn split_meta_mut(&mut self) -> (&Map<String, Value>, &[String], &mut MetaFields) {
        (&self.fields, &self.extra_keys, &mut self.meta)
    }

    pub fn event_time(&self) -> Option<&str> {
        self.meta.event_time()
    }

    pub fn log_type(&self) -> Option<&str> {
        self.meta.log_type()
    }

    pub fn indicators(&self, kind: IndicatorKind) -> &IndicatorSet {
        self.meta.indicators(kind)
    }

    /// 레코드를 `serde_json::Value`로 변환합니다.
    pub fn to_json_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

impl Serialize for CanonicalRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let indicator_count = IndicatorKind::ALL
            .iter()
            .filter(|kind| !self.meta.indicators(**kind).is_empty())
            .count();
        let len = self.fields.len() + indicator_count + 2;

        let mut map = serializer.serialize_map(Some(len))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry(P_EVENT_TIME, &self.meta.event_time)?;
        for kind in IndicatorKind::ALL {
            let set = self.meta.indicators(kind);
            if !set.is_empty() {
                map.serialize_entry(kind.meta_field(), set)?;
            }
        }
        map.serialize_entry(P_LOG_TYPE, &self.meta.log_type)?;
        map.end()
    }
}
