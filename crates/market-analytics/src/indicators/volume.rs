//! 거래량 지표 (Volume Indicators).
//!
//! - Volume SMA (거래량 이동평균)
//! - Volume Ratio (현재 거래량 / 거래량 이동평균)

use market_core::checked_ratio;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::trend::{SmaParams, TrendIndicators};
use super::IndicatorResult;

/// 거래량 지표 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VolumeParams {
    /// 거래량 이동평균 기간 (기본: 20).
    pub period: usize,
}

impl Default for VolumeParams {
    fn default() -> Self {
        Self { period: 20 }
    }
}

/// 거래량 지표 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeResult {
    /// 거래량 이동평균.
    pub volume_sma: Option<Decimal>,
    /// 거래량 비율 (이동평균이 0이거나 없으면 None).
    pub volume_ratio: Option<Decimal>,
}

/// 거래량 지표 계산기.
#[derive(Debug, Default)]
pub struct VolumeIndicators {
    trend: TrendIndicators,
}

impl VolumeIndicators {
    pub fn new() -> Self {
        Self::default()
    }

    /// 거래량 이동평균과 거래량 비율 계산.
    pub fn volume_ratio(
        &self,
        volumes: &[Decimal],
        params: VolumeParams,
    ) -> IndicatorResult<Vec<VolumeResult>> {
        let sma = self.trend.sma(volumes, SmaParams { period: params.period })?;

        let result = volumes
            .iter()
            .zip(sma)
            .map(|(&volume, volume_sma)| VolumeResult {
                volume_sma,
                volume_ratio: volume_sma.and_then(|avg| checked_ratio(volume, avg)),
            })
            .collect();

        Ok(result)
    }
}
