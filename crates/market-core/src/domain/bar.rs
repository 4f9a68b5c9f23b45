//! OHLCV 캔들과 시계열.
//!
//! - `Bar` - 한 시점의 OHLCV 레코드
//! - `BarSeries` - 타임스탬프가 엄격하게 증가하는 캔들 시퀀스

use crate::error::{SeriesError, SeriesResult};
use crate::types::{Price, Quantity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV 캔들 데이터.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    /// 캔들 시작 시간
    pub timestamp: DateTime<Utc>,
    /// 시가
    pub open: Price,
    /// 고가
    pub high: Price,
    /// 저가
    pub low: Price,
    /// 종가
    pub close: Price,
    /// 거래량
    pub volume: Quantity,
}

impl Bar {
    /// 새 캔들을 생성합니다.
    pub fn new(
        timestamp: DateTime<Utc>,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: Quantity,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// 오름차순 타임스탬프를 보장하는 캔들 시계열.
///
/// 생성 이후에는 변경되지 않습니다. 지표 계산은 새 시계열을 만들어 반환합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Bar>", into = "Vec<Bar>")]
pub struct BarSeries {
    bars: Vec<Bar>,
}

impl BarSeries {
    /// 캔들 목록으로 시계열을 생성합니다.
    ///
    /// 타임스탬프가 엄격하게 증가하지 않으면 에러를 반환합니다.
    pub fn new(bars: Vec<Bar>) -> SeriesResult<Self> {
        for (index, pair) in bars.windows(2).enumerate() {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(SeriesError::NonIncreasingTimestamp {
                    index: index + 1,
                    previous: pair[0].timestamp,
                    current: pair[1].timestamp,
                });
            }
        }
        Ok(Self { bars })
    }

    /// 정렬되지 않은 캔들 목록을 정렬하고 중복 타임스탬프를 제거합니다.
    ///
    /// 같은 타임스탬프가 여러 번 나오면 마지막 레코드를 남깁니다.
    pub fn from_unsorted(mut bars: Vec<Bar>) -> Self {
        // 안정 정렬이므로 같은 타임스탬프 안에서는 입력 순서가 유지됨
        bars.sort_by_key(|bar| bar.timestamp);

        let mut deduped: Vec<Bar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.timestamp == bar.timestamp => *last = bar,
                _ => deduped.push(bar),
            }
        }

        Self { bars: deduped }
    }

    /// 빈 시계열.
    pub fn empty() -> Self {
        Self::default()
    }

    /// 캔들 수.
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// 비어있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// 캔들 슬라이스.
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// 종가 목록.
    pub fn closes(&self) -> Vec<Price> {
        self.bars.iter().map(|bar| bar.close).collect()
    }

    /// 거래량 목록.
    pub fn volumes(&self) -> Vec<Quantity> {
        self.bars.iter().map(|bar| bar.volume).collect()
    }

    /// 첫 캔들.
    pub fn first(&self) -> Option<&Bar> {
        self.bars.first()
    }

    /// 마지막 캔들.
    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// 끝에서부터 `offset`번째 캔들 (0 = 마지막).
    pub fn from_end(&self, offset: usize) -> Option<&Bar> {
        self.bars
            .len()
            .checked_sub(offset + 1)
            .and_then(|index| self.bars.get(index))
    }

    /// 내부 캔들 벡터를 꺼냅니다.
    pub fn into_bars(self) -> Vec<Bar> {
        self.bars
    }
}

impl TryFrom<Vec<Bar>> for BarSeries {
    type Error = SeriesError;

    fn try_from(bars: Vec<Bar>) -> Result<Self, Self::Error> {
        Self::new(bars)
    }
}

impl From<BarSeries> for Vec<Bar> {
    fn from(series: BarSeries) -> Self {
        series.bars
    }
}
