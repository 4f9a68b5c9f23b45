//! 주기적 시세 수집기.
//!
//! 이 crate는 다음을 제공합니다:
//! - 심볼별 캔들 조회 + 지표 계산 (`SymbolFetcher`)
//! - 백그라운드 수집 루프 (`CollectionScheduler`)
//! - 수집 주기별 결과 묶음과 소비자 인터페이스 (`CollectionBatch`, `BatchHandler`)
//! - 환경변수 기반 설정

pub mod config;
pub mod error;
pub mod modules;
pub mod stats;

pub use config::CollectorConfig;
pub use error::{CollectorError, Result};
pub use modules::{
    BatchHandler, CollectionBatch, CollectionScheduler, CollectionSettings, CollectionStatus,
    FetchSettings, SymbolFetcher, SymbolUpdate,
};
pub use stats::CollectionStats;
