//! 기술적 지표 계산.
//!
//! 원시 OHLCV 시계열을 받아 이동평균, MACD, RSI, 볼린저 밴드, 거래량 비율,
//! 가격 변화율이 추가된 시계열을 만듭니다. I/O나 내부 상태가 없는 순수 계산입니다.

pub mod indicators;

pub use indicators::{EnrichmentParams, IndicatorEngine, IndicatorError, IndicatorResult};
