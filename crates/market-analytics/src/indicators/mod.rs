//! 기술적 지표 모듈.
//!
//! # 지원 지표
//!
//! ## 추세 지표 (Trend Indicators)
//! - **SMA**: 단순 이동평균 (5, 20)
//! - **EMA**: 편향 보정 지수 이동평균 (12, 26)
//! - **MACD**: MACD 라인, 시그널(9), 히스토그램
//!
//! ## 모멘텀 지표 (Momentum Indicators)
//! - **RSI**: 상대강도지수 (14, 단순 이동평균 방식)
//! - **가격 변화율**: 1기간, 5기간
//!
//! ## 변동성 지표 (Volatility Indicators)
//! - **Bollinger Bands**: 20기간, 2σ
//!
//! ## 거래량 지표 (Volume Indicators)
//! - **Volume SMA / Volume Ratio**: 20기간
//!
//! # 사용 예시
//!
//! ```ignore
//! use market_analytics::IndicatorEngine;
//!
//! let engine = IndicatorEngine::new();
//! let enriched = engine.enrich(series);
//! let rsi = enriched.latest_snapshot().and_then(|s| s.rsi);
//! ```

pub mod momentum;
pub mod trend;
pub mod volatility;
pub mod volume;

use market_core::{BarSeries, EnrichedSeries, IndicatorColumns};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use momentum::{MomentumCalculator, RsiParams};
pub use trend::{EmaParams, MacdParams, MacdResult, SmaParams, TrendIndicators};
pub use volatility::{BollingerBandsParams, BollingerBandsResult, VolatilityIndicators};
pub use volume::{VolumeIndicators, VolumeParams, VolumeResult};

/// 지표 계산 오류.
#[derive(Debug, Error)]
pub enum IndicatorError {
    /// 잘못된 파라미터
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),

    /// 계산 오류
    #[error("계산 오류: {0}")]
    CalculationError(String),
}

/// 지표 계산 결과 타입.
pub type IndicatorResult<T> = Result<T, IndicatorError>;

/// 기간 파라미터가 0이 아닌지 확인합니다.
pub(crate) fn ensure_period(indicator: &str, period: usize) -> IndicatorResult<usize> {
    if period == 0 {
        return Err(IndicatorError::InvalidParameter(format!(
            "{} 기간은 0보다 커야 합니다",
            indicator
        )));
    }
    Ok(period)
}

/// 지표 일괄 계산 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EnrichmentParams {
    /// 이보다 짧은 시계열은 지표 없이 그대로 반환 (기본: 20).
    pub min_bars: usize,
    /// 단기 SMA 기간 (기본: 5).
    pub sma_fast: usize,
    /// 장기 SMA 기간 (기본: 20).
    pub sma_slow: usize,
    pub macd: MacdParams,
    pub rsi: RsiParams,
    pub bollinger: BollingerBandsParams,
    pub volume: VolumeParams,
    /// 장기 가격 변화율 시차 (기본: 5).
    pub change_lag: usize,
}

impl Default for EnrichmentParams {
    fn default() -> Self {
        Self {
            min_bars: 20,
            sma_fast: 5,
            sma_slow: 20,
            macd: MacdParams::default(),
            rsi: RsiParams::default(),
            bollinger: BollingerBandsParams::default(),
            volume: VolumeParams::default(),
            change_lag: 5,
        }
    }
}

impl EnrichmentParams {
    /// 모든 기간 파라미터가 0보다 큰지 검증합니다.
    pub fn validate(&self) -> IndicatorResult<()> {
        ensure_period("SMA(fast)", self.sma_fast)?;
        ensure_period("SMA(slow)", self.sma_slow)?;
        ensure_period("EMA(fast)", self.macd.fast_span)?;
        ensure_period("EMA(slow)", self.macd.slow_span)?;
        ensure_period("MACD signal", self.macd.signal_span)?;
        ensure_period("RSI", self.rsi.period)?;
        ensure_period("Bollinger Bands", self.bollinger.period)?;
        ensure_period("Volume SMA", self.volume.period)?;
        ensure_period("Price change", self.change_lag)?;
        Ok(())
    }
}

/// 통합 지표 엔진.
///
/// `enrich`는 결정적이며 부수 효과가 없습니다. 같은 입력에 대해 항상 같은 결과를
/// 반환하고, 엔진 내부에 상태를 남기지 않습니다.
#[derive(Debug, Default)]
pub struct IndicatorEngine {
    params: EnrichmentParams,
    trend: TrendIndicators,
    momentum: MomentumCalculator,
    volatility: VolatilityIndicators,
    volume: VolumeIndicators,
}

impl IndicatorEngine {
    /// 기본 파라미터로 엔진 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 사용자 정의 파라미터로 엔진 생성.
    pub fn with_params(params: EnrichmentParams) -> IndicatorResult<Self> {
        params.validate()?;
        Ok(Self {
            params,
            ..Self::default()
        })
    }

    /// 캔들 시계열에 지표를 추가합니다.
    ///
    /// 캔들이 `min_bars`(기본 20)개 미만이면 지표 없이 원본을 그대로 감싸 반환합니다.
    /// 이는 에러가 아니라 정해진 정책입니다.
    pub fn enrich(&self, series: BarSeries) -> EnrichedSeries {
        if series.len() < self.params.min_bars {
            tracing::debug!(
                bars = series.len(),
                min_bars = self.params.min_bars,
                "캔들 부족, 지표 계산 생략"
            );
            return EnrichedSeries::raw(series);
        }

        match self.try_enrich(&series) {
            Ok(enriched) => enriched,
            Err(e) => {
                tracing::warn!(error = %e, bars = series.len(), "지표 계산 실패, 원본 시계열 반환");
                EnrichedSeries::raw(series)
            }
        }
    }

    /// 길이 정책 없이 모든 지표 컬럼을 계산합니다.
    pub fn try_enrich(&self, series: &BarSeries) -> IndicatorResult<EnrichedSeries> {
        let columns = self.compute_columns(series)?;
        EnrichedSeries::with_indicators(series.clone(), columns)
            .map_err(|e| IndicatorError::CalculationError(e.to_string()))
    }

    fn compute_columns(&self, series: &BarSeries) -> IndicatorResult<IndicatorColumns> {
        let params = &self.params;
        let closes = series.closes();
        let volumes = series.volumes();

        let sma_5 = self.trend.sma(&closes, SmaParams { period: params.sma_fast })?;
        let sma_20 = self.trend.sma(&closes, SmaParams { period: params.sma_slow })?;
        let macd = self.trend.macd(&closes, params.macd)?;
        let rsi = self.momentum.rsi(&closes, params.rsi)?;
        let bands = self.volatility.bollinger_bands(&closes, params.bollinger)?;
        let volume = self.volume.volume_ratio(&volumes, params.volume)?;
        let price_change = self.momentum.rate_of_change(&closes, 1)?;
        let price_change_5 = self.momentum.rate_of_change(&closes, params.change_lag)?;

        Ok(IndicatorColumns {
            sma_5,
            sma_20,
            ema_12: pluck(&macd, |m| m.fast_ema),
            ema_26: pluck(&macd, |m| m.slow_ema),
            macd: pluck(&macd, |m| m.macd),
            macd_signal: pluck(&macd, |m| m.signal),
            macd_histogram: pluck(&macd, |m| m.histogram),
            rsi,
            bb_middle: pluck(&bands, |b| b.middle),
            bb_upper: pluck(&bands, |b| b.upper),
            bb_lower: pluck(&bands, |b| b.lower),
            volume_sma: pluck(&volume, |v| v.volume_sma),
            volume_ratio: pluck(&volume, |v| v.volume_ratio),
            price_change,
            price_change_5,
        })
    }
}

fn pluck<T>(rows: &[T], field: impl Fn(&T) -> Option<Decimal>) -> Vec<Option<Decimal>> {
    rows.iter().map(field).collect()
}
