//! # Market Core
//!
//! 시세 수집기의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! - OHLCV 캔들(`Bar`)과 시계열(`BarSeries`)
//! - 지표가 추가된 시계열(`EnrichedSeries`)
//! - 캔들 간격 및 조회 기간 정의
//! - 시세 제공자 추상화(`BarProvider`)
//! - 로깅 인프라

pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
