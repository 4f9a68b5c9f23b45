//! Yahoo Finance 시세 제공자.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use market_core::{Bar, BarProvider, BarSeries, LookbackPeriod, ProviderError, Timeframe};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::error::{DataError, Result};

/// Yahoo Finance `BarProvider` 구현.
///
/// 하나의 `YahooConnector`를 재사용합니다. 동시 호출 직렬화는 호출자 책임입니다.
pub struct YahooBarProvider {
    connector: yahoo_finance_api::YahooConnector,
}

impl YahooBarProvider {
    pub fn new() -> Result<Self> {
        let connector = yahoo_finance_api::YahooConnector::new()
            .map_err(|e| DataError::ConnectionError(format!("Yahoo Finance 연결 실패: {}", e)))?;
        Ok(Self { connector })
    }
}

#[async_trait]
impl BarProvider for YahooBarProvider {
    async fn fetch_bars(
        &self,
        symbol: &str,
        period: LookbackPeriod,
        interval: Timeframe,
    ) -> std::result::Result<BarSeries, ProviderError> {
        let interval_str = interval.as_yahoo_interval();
        let range = period.as_yahoo_range();

        debug!(symbol, interval = interval_str, range, "Yahoo Finance API 호출");

        let response = self
            .connector
            .get_quote_range(symbol, interval_str, range)
            .await
            .map_err(|e| ProviderError::Network(format!("Yahoo Finance API 오류 ({}): {}", symbol, e)))?;

        let quotes = response
            .quotes()
            .map_err(|e| ProviderError::Parse(format!("Quote 파싱 오류 ({}): {}", symbol, e)))?;

        if quotes.is_empty() {
            return Ok(BarSeries::empty());
        }

        let total = quotes.len();
        let bars: Vec<Bar> = quotes
            .iter()
            .filter_map(|q| {
                let bar = quote_to_bar(q.timestamp as i64, q.open, q.high, q.low, q.close, q.volume);
                if bar.is_none() {
                    warn!(symbol, timestamp = q.timestamp, "표현할 수 없는 시세 값, 캔들 건너뜀");
                }
                bar
            })
            .collect();

        debug!(symbol, quotes = total, bars = bars.len(), "Yahoo Finance 캔들 변환 완료");

        Ok(BarSeries::from_unsorted(bars))
    }

    fn name(&self) -> &'static str {
        "yahoo"
    }
}

/// Yahoo 시세 한 건을 캔들로 변환합니다.
///
/// 가격이 NaN/무한대이거나 타임스탬프가 범위를 벗어나면 `None`.
fn quote_to_bar(
    timestamp: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
) -> Option<Bar> {
    let timestamp = Utc.timestamp_opt(timestamp, 0).single()?;
    Some(Bar::new(
        timestamp,
        Decimal::from_f64_retain(open)?,
        Decimal::from_f64_retain(high)?,
        Decimal::from_f64_retain(low)?,
        Decimal::from_f64_retain(close)?,
        Decimal::from(volume),
    ))
}
