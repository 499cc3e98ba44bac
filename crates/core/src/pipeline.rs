//! 파이프라인 trait -- 로그 형식 확장 포인트 정의

use crate::error::ParseError;
use crate::record::CanonicalRecord;
use crate::schema::Schema;

/// 로그 파서 trait
///
/// 새로운 로그 형식을 지원하려면 이 trait을 구현하거나, 스키마만 선언하고
/// 스키마 기반 JSON 파서를 사용합니다.
///
/// 파서는 메타 필드를 채우지 않습니다. 레지스트리가 파싱 직후
/// [`IndicatorWalker`](crate::walker::IndicatorWalker)를 실행합니다.
pub trait LogParser: Send + Sync {
    /// 이 파서의 스키마 (로그 타입 이름, 이벤트 시각 필드, 지표 선언)
    fn schema(&self) -> &Schema;

    /// 로그 타입 이름
    fn log_type(&self) -> &str {
        self.schema().log_type()
    }

    /// 원시 바이트를 0개 이상의 정규화 레코드로 파싱
    fn parse(&self, raw: &[u8]) -> Result<Vec<CanonicalRecord>, ParseError>;
}
