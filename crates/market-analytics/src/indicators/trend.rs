//! 추세 지표 (Trend Indicators).
//!
//! - SMA (Simple Moving Average)
//! - EMA (Exponential Moving Average, 편향 보정형)
//! - MACD (Moving Average Convergence Divergence)

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{ensure_period, IndicatorResult};

/// SMA 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SmaParams {
    /// 이동평균 기간.
    pub period: usize,
}

impl Default for SmaParams {
    fn default() -> Self {
        Self { period: 20 }
    }
}

/// EMA 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EmaParams {
    /// span (α = 2 / (span + 1)).
    pub span: usize,
}

impl Default for EmaParams {
    fn default() -> Self {
        Self { span: 12 }
    }
}

/// MACD 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MacdParams {
    /// 단기 EMA span (기본: 12).
    pub fast_span: usize,
    /// 장기 EMA span (기본: 26).
    pub slow_span: usize,
    /// 시그널 EMA span (기본: 9).
    pub signal_span: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast_span: 12,
            slow_span: 26,
            signal_span: 9,
        }
    }
}

/// MACD 결과 (시점별).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacdResult {
    /// 단기 EMA.
    pub fast_ema: Option<Decimal>,
    /// 장기 EMA.
    pub slow_ema: Option<Decimal>,
    /// MACD 라인 (단기 EMA - 장기 EMA).
    pub macd: Option<Decimal>,
    /// 시그널 라인 (MACD의 EMA).
    pub signal: Option<Decimal>,
    /// 히스토그램 (MACD - 시그널).
    pub histogram: Option<Decimal>,
}

/// 추세 지표 계산기.
#[derive(Debug, Default)]
pub struct TrendIndicators;

impl TrendIndicators {
    pub fn new() -> Self {
        Self
    }

    /// 단순 이동평균 (SMA) 계산.
    ///
    /// SMA = (P1 + P2 + ... + Pn) / n
    ///
    /// 처음 period-1개는 None. 데이터가 period보다 짧으면 전부 None입니다.
    pub fn sma(&self, values: &[Decimal], params: SmaParams) -> IndicatorResult<Vec<Option<Decimal>>> {
        let period = ensure_period("SMA", params.period)?;
        let period_decimal = Decimal::from(period);

        let result = (0..values.len())
            .map(|i| {
                if i + 1 < period {
                    None
                } else {
                    let sum: Decimal = values[i + 1 - period..=i].iter().sum();
                    Some(sum / period_decimal)
                }
            })
            .collect();

        Ok(result)
    }

    /// 지수 이동평균 (EMA) 계산.
    ///
    /// 편향 보정(adjusted) 형태를 사용합니다:
    ///
    /// EMA_t = Σ (1-α)^i × P_{t-i} / Σ (1-α)^i,  α = 2 / (span + 1)
    ///
    /// 워밍업 없이 첫 시점부터 값이 정의됩니다. MACD가 이 성질에 의존합니다.
    pub fn ema(&self, values: &[Decimal], params: EmaParams) -> IndicatorResult<Vec<Option<Decimal>>> {
        let span = ensure_period("EMA", params.span)?;
        let alpha = dec!(2) / Decimal::from(span + 1);
        let decay = Decimal::ONE - alpha;

        let mut numerator = Decimal::ZERO;
        let mut denominator = Decimal::ZERO;
        let mut result = Vec::with_capacity(values.len());

        for &value in values {
            numerator = value + decay * numerator;
            denominator = Decimal::ONE + decay * denominator;
            // denominator >= 1 이므로 0으로 나누지 않음
            result.push(Some(numerator / denominator));
        }

        Ok(result)
    }

    /// MACD 계산.
    ///
    /// MACD 라인 = 단기 EMA - 장기 EMA
    /// 시그널 라인 = MACD 라인의 EMA
    /// 히스토그램 = MACD 라인 - 시그널 라인
    pub fn macd(&self, prices: &[Decimal], params: MacdParams) -> IndicatorResult<Vec<MacdResult>> {
        let fast_ema = self.ema(prices, EmaParams { span: params.fast_span })?;
        let slow_ema = self.ema(prices, EmaParams { span: params.slow_span })?;

        let macd_line: Vec<Option<Decimal>> = fast_ema
            .iter()
            .zip(&slow_ema)
            .map(|(fast, slow)| Some((*fast)? - (*slow)?))
            .collect();

        // EMA는 첫 시점부터 정의되므로 MACD 라인에 빈 구간이 없음
        let macd_values: Vec<Decimal> = macd_line.iter().flatten().copied().collect();
        let signal_line = if macd_values.len() == macd_line.len() {
            self.ema(&macd_values, EmaParams { span: params.signal_span })?
        } else {
            vec![None; macd_line.len()]
        };

        let result = (0..prices.len())
            .map(|i| {
                let macd = macd_line[i];
                let signal = signal_line[i];
                let histogram = match (macd, signal) {
                    (Some(m), Some(s)) => Some(m - s),
                    _ => None,
                };
                MacdResult {
                    fast_ema: fast_ema[i],
                    slow_ema: slow_ema[i],
                    macd,
                    signal,
                    histogram,
                }
            })
            .collect();

        Ok(result)
    }
}
