//! 기술적 지표가 추가된 시계열.
//!
//! 지표 값은 캔들과 인덱스 단위로 정렬된 컬럼(`Vec<Option<Decimal>>`)으로 보관합니다.
//! 워밍업 구간이나 0으로 나누는 구간의 값은 `None`이며, 임의의 값으로 채우지 않습니다.

use crate::domain::bar::{Bar, BarSeries};
use crate::error::{SeriesError, SeriesResult};
use crate::types::{pct_change, Price, Ratio};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 파생 지표 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Indicator {
    Sma5,
    Sma20,
    Ema12,
    Ema26,
    Macd,
    MacdSignal,
    MacdHistogram,
    Rsi,
    BbMiddle,
    BbUpper,
    BbLower,
    VolumeSma,
    VolumeRatio,
    PriceChange,
    PriceChange5,
}

impl Indicator {
    /// 모든 지표 (컬럼 순서).
    pub const ALL: [Indicator; 15] = [
        Indicator::Sma5,
        Indicator::Sma20,
        Indicator::Ema12,
        Indicator::Ema26,
        Indicator::Macd,
        Indicator::MacdSignal,
        Indicator::MacdHistogram,
        Indicator::Rsi,
        Indicator::BbMiddle,
        Indicator::BbUpper,
        Indicator::BbLower,
        Indicator::VolumeSma,
        Indicator::VolumeRatio,
        Indicator::PriceChange,
        Indicator::PriceChange5,
    ];

    /// 컬럼 이름.
    pub fn name(&self) -> &'static str {
        match self {
            Indicator::Sma5 => "SMA_5",
            Indicator::Sma20 => "SMA_20",
            Indicator::Ema12 => "EMA_12",
            Indicator::Ema26 => "EMA_26",
            Indicator::Macd => "MACD",
            Indicator::MacdSignal => "MACD_Signal",
            Indicator::MacdHistogram => "MACD_Histogram",
            Indicator::Rsi => "RSI",
            Indicator::BbMiddle => "BB_Middle",
            Indicator::BbUpper => "BB_Upper",
            Indicator::BbLower => "BB_Lower",
            Indicator::VolumeSma => "Volume_SMA",
            Indicator::VolumeRatio => "Volume_Ratio",
            Indicator::PriceChange => "Price_Change",
            Indicator::PriceChange5 => "Price_Change_5",
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 지표 컬럼 모음.
///
/// 모든 컬럼의 길이는 원본 캔들 수와 같습니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorColumns {
    pub sma_5: Vec<Option<Decimal>>,
    pub sma_20: Vec<Option<Decimal>>,
    pub ema_12: Vec<Option<Decimal>>,
    pub ema_26: Vec<Option<Decimal>>,
    pub macd: Vec<Option<Decimal>>,
    pub macd_signal: Vec<Option<Decimal>>,
    pub macd_histogram: Vec<Option<Decimal>>,
    pub rsi: Vec<Option<Decimal>>,
    pub bb_middle: Vec<Option<Decimal>>,
    pub bb_upper: Vec<Option<Decimal>>,
    pub bb_lower: Vec<Option<Decimal>>,
    pub volume_sma: Vec<Option<Decimal>>,
    pub volume_ratio: Vec<Option<Decimal>>,
    pub price_change: Vec<Option<Decimal>>,
    pub price_change_5: Vec<Option<Decimal>>,
}

impl IndicatorColumns {
    /// 지표 이름으로 컬럼을 조회합니다.
    pub fn column(&self, indicator: Indicator) -> &[Option<Decimal>] {
        match indicator {
            Indicator::Sma5 => &self.sma_5,
            Indicator::Sma20 => &self.sma_20,
            Indicator::Ema12 => &self.ema_12,
            Indicator::Ema26 => &self.ema_26,
            Indicator::Macd => &self.macd,
            Indicator::MacdSignal => &self.macd_signal,
            Indicator::MacdHistogram => &self.macd_histogram,
            Indicator::Rsi => &self.rsi,
            Indicator::BbMiddle => &self.bb_middle,
            Indicator::BbUpper => &self.bb_upper,
            Indicator::BbLower => &self.bb_lower,
            Indicator::VolumeSma => &self.volume_sma,
            Indicator::VolumeRatio => &self.volume_ratio,
            Indicator::PriceChange => &self.price_change,
            Indicator::PriceChange5 => &self.price_change_5,
        }
    }

    /// 특정 인덱스의 지표 값.
    pub fn value(&self, indicator: Indicator, index: usize) -> Option<Decimal> {
        self.column(indicator).get(index).copied().flatten()
    }

    /// 모든 컬럼 길이가 `expected`인지 검증합니다.
    pub fn validate_len(&self, expected: usize) -> SeriesResult<()> {
        for indicator in Indicator::ALL {
            let actual = self.column(indicator).len();
            if actual != expected {
                return Err(SeriesError::ColumnLengthMismatch {
                    column: indicator.name(),
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }
}

/// 한 시점의 캔들과 지표 값.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub timestamp: DateTime<Utc>,
    pub close: Price,
    pub sma_5: Option<Decimal>,
    pub sma_20: Option<Decimal>,
    pub ema_12: Option<Decimal>,
    pub ema_26: Option<Decimal>,
    pub macd: Option<Decimal>,
    pub macd_signal: Option<Decimal>,
    pub macd_histogram: Option<Decimal>,
    pub rsi: Option<Decimal>,
    pub bb_middle: Option<Decimal>,
    pub bb_upper: Option<Decimal>,
    pub bb_lower: Option<Decimal>,
    pub volume_sma: Option<Decimal>,
    pub volume_ratio: Option<Decimal>,
    pub price_change: Option<Decimal>,
    pub price_change_5: Option<Decimal>,
}

/// 지표가 추가된 시계열.
///
/// 캔들이 20개 미만이면 `indicators`가 `None`인 채로 원본 캔들만 보관합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawEnrichedSeries")]
pub struct EnrichedSeries {
    bars: BarSeries,
    indicators: Option<IndicatorColumns>,
}

/// 역직렬화 직후 컬럼 길이 검증 전의 형태.
#[derive(Deserialize)]
struct RawEnrichedSeries {
    bars: BarSeries,
    indicators: Option<IndicatorColumns>,
}

impl TryFrom<RawEnrichedSeries> for EnrichedSeries {
    type Error = SeriesError;

    fn try_from(raw: RawEnrichedSeries) -> Result<Self, Self::Error> {
        match raw.indicators {
            Some(indicators) => Self::with_indicators(raw.bars, indicators),
            None => Ok(Self::raw(raw.bars)),
        }
    }
}

impl EnrichedSeries {
    /// 지표 없이 캔들만 보관하는 시계열.
    pub fn raw(bars: BarSeries) -> Self {
        Self {
            bars,
            indicators: None,
        }
    }

    /// 지표 컬럼을 붙인 시계열. 컬럼 길이가 캔들 수와 다르면 에러.
    pub fn with_indicators(bars: BarSeries, indicators: IndicatorColumns) -> SeriesResult<Self> {
        indicators.validate_len(bars.len())?;
        Ok(Self {
            bars,
            indicators: Some(indicators),
        })
    }

    /// 캔들 시계열.
    pub fn series(&self) -> &BarSeries {
        &self.bars
    }

    /// 캔들 슬라이스.
    pub fn bars(&self) -> &[Bar] {
        self.bars.bars()
    }

    /// 지표 컬럼 (짧은 시계열이면 `None`).
    pub fn indicators(&self) -> Option<&IndicatorColumns> {
        self.indicators.as_ref()
    }

    /// 지표가 계산되었는지 여부.
    pub fn is_enriched(&self) -> bool {
        self.indicators.is_some()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// 마지막 캔들의 종가.
    pub fn latest_close(&self) -> Option<Price> {
        self.bars.last().map(|bar| bar.close)
    }

    /// 마지막 종가와 `periods`개 이전 종가 사이의 변화율.
    ///
    /// 캔들이 `periods + 1`개 미만이거나 기준 종가가 0이면 `None`.
    pub fn close_change(&self, periods: usize) -> Option<Ratio> {
        let current = self.bars.from_end(0)?;
        let previous = self.bars.from_end(periods)?;
        pct_change(current.close, previous.close)
    }

    /// `index` 시점의 스냅샷. 지표가 없거나 범위를 벗어나면 `None`.
    pub fn snapshot(&self, index: usize) -> Option<IndicatorSnapshot> {
        let bar = self.bars.bars().get(index)?;
        let columns = self.indicators.as_ref()?;
        let value = |indicator| columns.value(indicator, index);

        Some(IndicatorSnapshot {
            timestamp: bar.timestamp,
            close: bar.close,
            sma_5: value(Indicator::Sma5),
            sma_20: value(Indicator::Sma20),
            ema_12: value(Indicator::Ema12),
            ema_26: value(Indicator::Ema26),
            macd: value(Indicator::Macd),
            macd_signal: value(Indicator::MacdSignal),
            macd_histogram: value(Indicator::MacdHistogram),
            rsi: value(Indicator::Rsi),
            bb_middle: value(Indicator::BbMiddle),
            bb_upper: value(Indicator::BbUpper),
            bb_lower: value(Indicator::BbLower),
            volume_sma: value(Indicator::VolumeSma),
            volume_ratio: value(Indicator::VolumeRatio),
            price_change: value(Indicator::PriceChange),
            price_change_5: value(Indicator::PriceChange5),
        })
    }

    /// 마지막 시점의 스냅샷.
    pub fn latest_snapshot(&self) -> Option<IndicatorSnapshot> {
        self.len().checked_sub(1).and_then(|index| self.snapshot(index))
    }
}
