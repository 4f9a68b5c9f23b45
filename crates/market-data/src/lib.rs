//! 시세 데이터 관리.
//!
//! 이 crate는 다음을 제공합니다:
//! - 심볼별 최신 지표 시계열 캐시 (`SymbolCache`)
//! - Yahoo Finance 기반 `BarProvider` 구현

pub mod cache;
pub mod error;
pub mod provider;

pub use cache::SymbolCache;
pub use error::{DataError, Result};
pub use provider::YahooBarProvider;
