//! 도메인 모델 에러 타입.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// 시계열 구성 에러.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeriesError {
    /// 타임스탬프가 엄격하게 증가하지 않음
    #[error("타임스탬프 순서 위반 (index {index}): {previous} 이후 {current}")]
    NonIncreasingTimestamp {
        index: usize,
        previous: DateTime<Utc>,
        current: DateTime<Utc>,
    },

    /// 지표 컬럼 길이가 캔들 수와 다름
    #[error("지표 컬럼 길이 불일치 ({column}): 기대 {expected}개, 실제 {actual}개")]
    ColumnLengthMismatch {
        column: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// 시계열 작업을 위한 Result 타입.
pub type SeriesResult<T> = Result<T, SeriesError>;
