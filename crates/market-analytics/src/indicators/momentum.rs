//! 모멘텀 지표 (Momentum Indicators).
//!
//! - RSI (Relative Strength Index, 단순 이동평균 방식)
//! - 가격 변화율 (Rate of Change)

use market_core::pct_change;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{ensure_period, IndicatorResult};

/// RSI 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RsiParams {
    /// RSI 기간 (기본: 14).
    pub period: usize,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// 모멘텀 지표 계산기.
#[derive(Debug, Default)]
pub struct MomentumCalculator;

impl MomentumCalculator {
    pub fn new() -> Self {
        Self
    }

    /// RSI (Relative Strength Index) 계산.
    ///
    /// RSI = 100 - (100 / (1 + RS))
    /// RS = 평균 상승폭 / 평균 하락폭
    ///
    /// 상승폭/하락폭은 최근 period개 시점에 대한 단순 평균입니다.
    /// 첫 시점의 변화량은 0으로 취급하므로 인덱스 period-1부터 값이 정의됩니다.
    /// 평균 하락폭이 정확히 0이면 RSI는 100입니다.
    pub fn rsi(&self, prices: &[Decimal], params: RsiParams) -> IndicatorResult<Vec<Option<Decimal>>> {
        let period = ensure_period("RSI", params.period)?;

        let mut gains = Vec::with_capacity(prices.len());
        let mut losses = Vec::with_capacity(prices.len());
        for i in 0..prices.len() {
            let delta = if i == 0 {
                Decimal::ZERO
            } else {
                prices[i] - prices[i - 1]
            };
            gains.push(delta.max(Decimal::ZERO));
            losses.push((-delta).max(Decimal::ZERO));
        }

        let period_decimal = Decimal::from(period);
        let result = (0..prices.len())
            .map(|i| {
                if i + 1 < period {
                    return None;
                }
                let window = i + 1 - period..=i;
                let avg_gain = gains[window.clone()].iter().sum::<Decimal>() / period_decimal;
                let avg_loss = losses[window].iter().sum::<Decimal>() / period_decimal;

                if avg_loss.is_zero() {
                    return Some(dec!(100));
                }
                let rs = avg_gain / avg_loss;
                Some(dec!(100) - dec!(100) / (Decimal::ONE + rs))
            })
            .collect();

        Ok(result)
    }

    /// 가격 변화율 계산.
    ///
    /// ROC_t = (P_t - P_{t-lag}) / P_{t-lag}
    ///
    /// t < lag 이거나 기준 가격이 0이면 None.
    pub fn rate_of_change(&self, prices: &[Decimal], lag: usize) -> IndicatorResult<Vec<Option<Decimal>>> {
        let lag = ensure_period("ROC", lag)?;

        let result = (0..prices.len())
            .map(|i| {
                let base = prices.get(i.checked_sub(lag)?)?;
                pct_change(prices[i], *base)
            })
            .collect();

        Ok(result)
    }
}
