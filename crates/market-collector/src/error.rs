//! 에러 타입 정의.

use market_analytics::IndicatorError;
use market_data::DataError;
use thiserror::Error;

/// Collector 에러 타입
#[derive(Debug, Error)]
pub enum CollectorError {
    /// 수집 루프가 이미 실행 중
    #[error("Collection loop already running for {symbols:?}")]
    AlreadyRunning { symbols: Vec<String> },

    /// 설정 에러
    #[error("Configuration error: {0}")]
    Config(String),

    /// 데이터 소스 초기화 에러
    #[error("Data source error: {0}")]
    DataSource(#[from] DataError),

    /// 지표 파라미터 에러
    #[error("Indicator error: {0}")]
    Indicator(#[from] IndicatorError),
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, CollectorError>;
