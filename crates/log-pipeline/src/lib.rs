//! normlog 로그 파이프라인
//!
//! 로그 타입별 파서를 레지스트리에 등록하고, 원시 페이로드를 정규화 레코드로 바꾼 뒤
//! 한 줄에 하나씩 JSONL로 기록합니다.
//!
//! # 모듈 구성
//!
//! - [`parser`]: 스키마 기반 JSON 파서와 내장 로그 형식 (Teleport, Suricata DNS, CloudTrail)
//! - [`registry`]: 로그 타입 이름 -> 파서 조회, 파싱 후 지표 추출
//! - [`encoder`]: JSONL 스트리밍 인코더와 줄바꿈 제거 유틸리티
//! - [`pipeline`]: 배치 단위 정규화 (파싱 실패 기록, 인코딩 실패 시 중단)
//! - [`config`]: 파이프라인 설정 (core 설정 확장)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! RawBatch -> ParserRegistry -> LogParser -> IndicatorWalker -> JsonlEncoder -> sink
//!                  |                |               |
//!             log type 조회    Schema 기반 디코딩   p_* 메타 필드
//! ```

pub mod config;
pub mod encoder;
pub mod error;
pub mod parser;
pub mod pipeline;
pub mod registry;

// --- 주요 타입 re-export ---

// 정규화
pub use pipeline::{BatchReport, Normalizer, RawBatch, RejectedPayload};

// 레지스트리
pub use registry::{LogTypeEntry, LogTypeMetadata, ParserRegistry, ParserRegistryBuilder};

// 인코더
pub use encoder::{append_join_lines, compact_lines, join_lines, JsonlEncoder};

// 설정
pub use config::{PipelineConfig, PipelineConfigBuilder};

// 에러
pub use error::LogPipelineError;

// 파서
pub use parser::{CloudTrailParser, JsonSchemaParser};
