//! 변동성 지표 (Volatility Indicators).
//!
//! - Bollinger Bands (볼린저 밴드, 표본 표준편차)

use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{ensure_period, IndicatorResult};

/// 볼린저 밴드 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BollingerBandsParams {
    /// 이동평균 기간 (기본: 20).
    pub period: usize,
    /// 표준편차 배수 (기본: 2.0).
    pub std_dev_multiplier: Decimal,
}

impl Default for BollingerBandsParams {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev_multiplier: dec!(2.0),
        }
    }
}

/// 볼린저 밴드 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BollingerBandsResult {
    /// 상단 밴드 (MA + k × σ).
    pub upper: Option<Decimal>,
    /// 중간 밴드 (이동평균).
    pub middle: Option<Decimal>,
    /// 하단 밴드 (MA - k × σ).
    pub lower: Option<Decimal>,
}

impl BollingerBandsResult {
    const UNDEFINED: Self = Self {
        upper: None,
        middle: None,
        lower: None,
    };
}

/// 변동성 지표 계산기.
#[derive(Debug, Default)]
pub struct VolatilityIndicators;

impl VolatilityIndicators {
    pub fn new() -> Self {
        Self
    }

    /// 볼린저 밴드 계산.
    ///
    /// 상단 밴드 = MA + (k × σ)
    /// 중간 밴드 = MA (이동평균)
    /// 하단 밴드 = MA - (k × σ)
    ///
    /// σ는 기간 내 종가의 표본 표준편차(n-1로 나눔)입니다.
    /// 기간이 1이면 σ가 정의되지 않으므로 상단/하단은 None입니다.
    pub fn bollinger_bands(
        &self,
        prices: &[Decimal],
        params: BollingerBandsParams,
    ) -> IndicatorResult<Vec<BollingerBandsResult>> {
        let period = ensure_period("Bollinger Bands", params.period)?;
        let period_decimal = Decimal::from(period);

        let result = (0..prices.len())
            .map(|i| {
                if i + 1 < period {
                    return BollingerBandsResult::UNDEFINED;
                }
                let window = &prices[i + 1 - period..=i];
                let Some(ma) = checked_sum(window).and_then(|sum| sum.checked_div(period_decimal))
                else {
                    return BollingerBandsResult::UNDEFINED;
                };

                let deviation = self
                    .sample_std_dev(window, ma)
                    .and_then(|std_dev| params.std_dev_multiplier.checked_mul(std_dev));

                BollingerBandsResult {
                    upper: deviation.and_then(|d| ma.checked_add(d)),
                    middle: Some(ma),
                    lower: deviation.and_then(|d| ma.checked_sub(d)),
                }
            })
            .collect();

        Ok(result)
    }

    /// 표본 표준편차. 중간 계산이 Decimal 범위를 넘으면 None.
    fn sample_std_dev(&self, window: &[Decimal], mean: Decimal) -> Option<Decimal> {
        let degrees_of_freedom = window.len().checked_sub(1).filter(|&n| n > 0)?;

        let squared_sum = window.iter().try_fold(Decimal::ZERO, |acc, &p| {
            let diff = p.checked_sub(mean)?;
            acc.checked_add(diff.checked_mul(diff)?)
        })?;
        let variance = squared_sum.checked_div(Decimal::from(degrees_of_freedom))?;

        variance.sqrt()
    }
}

fn checked_sum(values: &[Decimal]) -> Option<Decimal> {
    values
        .iter()
        .try_fold(Decimal::ZERO, |acc, &value| acc.checked_add(value))
}
