//! 시세 제공자 추상화.
//!
//! 심볼/조회 기간/캔들 간격으로 OHLCV 시계열을 가져오는 제공자 중립적인
//! 인터페이스를 정의합니다.

use async_trait::async_trait;
use thiserror::Error;

use super::BarSeries;
use crate::types::{LookbackPeriod, Timeframe};

// =============================================================================
// 에러 타입
// =============================================================================

/// BarProvider 에러.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// 네트워크 에러
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 요청 시간 초과
    #[error("요청 시간 초과: {0}")]
    Timeout(String),

    /// 알 수 없는 심볼
    #[error("알 수 없는 심볼: {0}")]
    UnknownSymbol(String),

    /// 응답 파싱 에러
    #[error("파싱 에러: {0}")]
    Parse(String),
}

impl ProviderError {
    /// 다음 주기에 다시 시도할 만한 일시적 에러인지 확인합니다.
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::Network(_) | ProviderError::Timeout(_))
    }
}

// =============================================================================
// BarProvider Trait
// =============================================================================

/// OHLCV 시세 제공자 trait.
///
/// 성공했지만 데이터가 없는 경우(장 마감, 범위 내 거래 없음)는 빈 `BarSeries`를
/// 반환해야 하며 에러로 취급하지 않습니다.
///
/// 구현체가 같은 연결에 대한 동시 호출을 지원한다고 가정하지 않습니다.
/// 호출자가 직렬화합니다.
///
/// # 구현 예시
///
/// ```ignore
/// pub struct CsvProvider { dir: PathBuf }
///
/// #[async_trait]
/// impl BarProvider for CsvProvider {
///     async fn fetch_bars(
///         &self,
///         symbol: &str,
///         period: LookbackPeriod,
///         interval: Timeframe,
///     ) -> Result<BarSeries, ProviderError> {
///         // 파일 읽기 및 변환
///     }
/// }
/// ```
#[async_trait]
pub trait BarProvider: Send + Sync {
    /// 캔들 시계열 조회.
    ///
    /// # Errors
    ///
    /// - `ProviderError::Network`: 네트워크 연결 실패
    /// - `ProviderError::UnknownSymbol`: 존재하지 않는 심볼
    /// - `ProviderError::Parse`: 응답 형식 오류
    async fn fetch_bars(
        &self,
        symbol: &str,
        period: LookbackPeriod,
        interval: Timeframe,
    ) -> Result<BarSeries, ProviderError>;

    /// 제공자 이름 (로그용).
    fn name(&self) -> &'static str {
        "unknown"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_errors() {
        assert!(ProviderError::Timeout("30s".to_string()).is_transient());
        assert!(ProviderError::Network("reset".to_string()).is_transient());
        assert!(!ProviderError::UnknownSymbol("ZZZZ".to_string()).is_transient());
        assert!(!ProviderError::Parse("bad json".to_string()).is_transient());
    }
}
