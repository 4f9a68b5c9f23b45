//! 심볼 조회 + 지표 계산.
//!
//! 수집 루프와 수동 조회가 같은 `SymbolFetcher`를 사용합니다. 제공자 호출은
//! 내부 async mutex로 직렬화되므로 두 경로가 동시에 제공자를 호출하지 않습니다.

use std::sync::Arc;
use std::time::Duration;

use market_analytics::{EnrichmentParams, IndicatorEngine};
use market_core::{BarProvider, LookbackPeriod, ProviderError, Timeframe};
use market_data::YahooBarProvider;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::batch::SymbolUpdate;
use crate::error::Result;

/// 과거 데이터 조회 시 캔들 간격
const HISTORY_INTERVAL: Timeframe = Timeframe::H1;

/// 조회 설정
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchSettings {
    /// 조회 기간
    pub period: LookbackPeriod,
    /// 캔들 간격
    pub interval: Timeframe,
    /// 심볼 간 요청 딜레이
    pub request_delay: Duration,
    /// 제공자 호출 타임아웃
    pub request_timeout: Duration,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            period: LookbackPeriod::D1,
            interval: Timeframe::M1,
            request_delay: Duration::from_millis(100),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// 심볼별 캔들 조회 후 지표를 계산합니다.
pub struct SymbolFetcher {
    provider: Arc<dyn BarProvider>,
    engine: IndicatorEngine,
    settings: FetchSettings,
    provider_gate: Mutex<()>,
}

impl SymbolFetcher {
    pub fn new(provider: Arc<dyn BarProvider>, settings: FetchSettings) -> Self {
        Self {
            provider,
            engine: IndicatorEngine::new(),
            settings,
            provider_gate: Mutex::new(()),
        }
    }

    /// Yahoo Finance 제공자를 사용하는 fetcher.
    pub fn yahoo(settings: FetchSettings) -> Result<Self> {
        let provider = YahooBarProvider::new()?;
        Ok(Self::new(Arc::new(provider), settings))
    }

    /// 사용자 정의 지표 파라미터 사용
    ///
    /// # Errors
    ///
    /// - `CollectorError::Indicator`: 기간 파라미터가 0
    pub fn with_params(mut self, params: EnrichmentParams) -> Result<Self> {
        self.engine = IndicatorEngine::with_params(params)?;
        Ok(self)
    }

    /// 심볼 하나를 설정된 기간/간격으로 조회합니다.
    pub async fn fetch_one(&self, symbol: &str) -> SymbolUpdate {
        self.fetch_with(symbol, self.settings.period, self.settings.interval)
            .await
    }

    /// 여러 심볼을 입력 순서대로 하나씩 조회합니다.
    ///
    /// 요청 사이에 `request_delay`만큼 대기하며, 마지막 요청 뒤에는 대기하지 않습니다.
    /// 한 심볼의 실패는 나머지 심볼 조회에 영향을 주지 않습니다.
    pub async fn fetch_many<S: AsRef<str>>(&self, symbols: &[S]) -> Vec<(String, SymbolUpdate)> {
        let mut results = Vec::with_capacity(symbols.len());

        for (idx, symbol) in symbols.iter().enumerate() {
            let symbol = symbol.as_ref();
            if idx > 0 && !self.settings.request_delay.is_zero() {
                tokio::time::sleep(self.settings.request_delay).await;
            }

            debug!(
                symbol,
                progress = format!("{}/{}", idx + 1, symbols.len()),
                "조회 시작"
            );
            let update = self.fetch_one(symbol).await;
            results.push((symbol.to_string(), update));
        }

        results
    }

    /// 과거 데이터 조회 (1시간 캔들).
    pub async fn fetch_history(&self, symbol: &str, period: LookbackPeriod) -> SymbolUpdate {
        info!(symbol, period = %period, "과거 데이터 조회");
        self.fetch_with(symbol, period, HISTORY_INTERVAL).await
    }

    async fn fetch_with(
        &self,
        symbol: &str,
        period: LookbackPeriod,
        interval: Timeframe,
    ) -> SymbolUpdate {
        let result = {
            let _gate = self.provider_gate.lock().await;
            tokio::time::timeout(
                self.settings.request_timeout,
                self.provider.fetch_bars(symbol, period, interval),
            )
            .await
        };

        let series = match result {
            Ok(Ok(series)) => series,
            Ok(Err(e)) => {
                warn!(
                    symbol,
                    provider = self.provider.name(),
                    transient = e.is_transient(),
                    error = %e,
                    "캔들 조회 실패"
                );
                return SymbolUpdate::Failed(e);
            }
            Err(_) => {
                let e = ProviderError::Timeout(format!(
                    "{} ({}s)",
                    symbol,
                    self.settings.request_timeout.as_secs_f64()
                ));
                warn!(symbol, provider = self.provider.name(), error = %e, "캔들 조회 시간 초과");
                return SymbolUpdate::Failed(e);
            }
        };

        if series.is_empty() {
            info!(symbol, period = %period, interval = %interval, "조회 결과 없음");
            return SymbolUpdate::NoData;
        }

        let enriched = self.engine.enrich(series);
        debug!(
            symbol,
            bars = enriched.len(),
            enriched = enriched.is_enriched(),
            "지표 계산 완료"
        );
        SymbolUpdate::Updated(Arc::new(enriched))
    }
}
