//! 지표(indicator) 종류와 순서 보존 집합
//!
//! 지표는 레코드 간 상관 분석에 쓰이는 값입니다 (IP 주소, 도메인 이름, 추적 ID).
//! [`IndicatorSet`]은 처음 발견된 순서를 유지하면서 중복을 제거합니다.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::record::{P_ANY_DOMAIN_NAMES, P_ANY_IP_ADDRESSES, P_ANY_TRACE_IDS};

/// 지표 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorKind {
    /// IP 주소
    IpAddress,
    /// 도메인/호스트 이름
    DomainName,
    /// 상관/세션 식별자
    TraceId,
}

impl IndicatorKind {
    /// 모든 지표 종류 (메타 필드 직렬화 순서)
    pub const ALL: [IndicatorKind; 3] = [Self::IpAddress, Self::DomainName, Self::TraceId];

    /// 직렬화 시 사용하는 메타 필드 이름을 반환합니다.
    pub fn meta_field(self) -> &'static str {
        match self {
            Self::IpAddress => P_ANY_IP_ADDRESSES,
            Self::DomainName => P_ANY_DOMAIN_NAMES,
            Self::TraceId => P_ANY_TRACE_IDS,
        }
    }

    /// 메트릭 레이블과 로그 필드에 쓰는 짧은 이름
    pub fn as_str(self) -> &'static str {
        match self {
            Self::IpAddress => "ip",
            Self::DomainName => "domain",
            Self::TraceId => "trace_id",
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 순서 보존 중복 제거 집합
///
/// 해시 기반 집합은 순서를 바꾸므로 쓰지 않습니다. 레코드 하나의 지표 수는
/// 작기 때문에 선형 탐색으로 멤버십을 확인합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndicatorSet {
    values: Vec<String>,
}

impl IndicatorSet {
    /// 빈 집합을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 값을 추가합니다.
    ///
    /// 빈 문자열이거나 이미 존재하는 값이면 추가하지 않고 `false`를 반환합니다.
    pub fn insert(&mut self, value: &str) -> bool {
        if value.is_empty() || self.contains(value) {
            return false;
        }
        self.values.push(value.to_owned());
        true
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.values
    }
}

impl Serialize for IndicatorSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.values.serialize(serializer)
    }
}
