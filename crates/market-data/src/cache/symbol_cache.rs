//! 심볼별 최신 지표 시계열 캐시.
//!
//! 항목은 갱신할 때마다 통째로 교체되며 병합하거나 이어 붙이지 않습니다.
//! 이전 시계열은 보관하지 않으므로 메모리 사용량은 심볼 수에 비례합니다.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use market_core::{EnrichedSeries, Price, Ratio};
use tracing::debug;

/// 심볼 → 최신 `EnrichedSeries` 저장소.
///
/// 단일 `RwLock`으로 맵 전체를 보호합니다. 읽기는 `Arc`를 복제해서 바로 잠금을
/// 해제하므로 느린 소비자가 수집 루프의 쓰기를 막지 않습니다.
///
/// 심볼은 대소문자를 구분하며 호출자가 넘긴 문자열 그대로 키로 사용합니다.
#[derive(Debug, Default)]
pub struct SymbolCache {
    entries: RwLock<HashMap<String, Arc<EnrichedSeries>>>,
}

impl SymbolCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 심볼 항목을 교체합니다.
    ///
    /// 쓰기 잠금이 해제된 뒤에야 다른 스레드에서 새 값이 보입니다.
    pub fn update(&self, symbol: impl Into<String>, series: impl Into<Arc<EnrichedSeries>>) {
        let symbol = symbol.into();
        let series = series.into();
        let bars = series.len();

        let previous = self.write().insert(symbol.clone(), series);
        debug!(
            symbol = %symbol,
            bars,
            replaced = previous.is_some(),
            "캐시 항목 갱신"
        );
    }

    /// 여러 심볼을 한 번의 잠금으로 교체합니다.
    pub fn update_many<I, S>(&self, items: I) -> usize
    where
        I: IntoIterator<Item = (S, Arc<EnrichedSeries>)>,
        S: Into<String>,
    {
        let mut entries = self.write();
        let mut count = 0;
        for (symbol, series) in items {
            entries.insert(symbol.into(), series);
            count += 1;
        }
        count
    }

    /// 캐시된 시계열. 한 번도 성공한 적 없는 심볼이면 `None`.
    pub fn get(&self, symbol: &str) -> Option<Arc<EnrichedSeries>> {
        self.read().get(symbol).cloned()
    }

    /// 캐시된 시계열의 마지막 종가.
    pub fn latest_price(&self, symbol: &str) -> Option<Price> {
        self.read().get(symbol)?.latest_close()
    }

    /// 마지막 종가와 `periods`개 이전 종가 사이의 변화율.
    ///
    /// 항목이 없거나 캔들이 `periods + 1`개 미만이면 `None`.
    pub fn price_change(&self, symbol: &str, periods: usize) -> Option<Ratio> {
        self.read().get(symbol)?.close_change(periods)
    }

    /// 캐시에 있는 심볼 목록 (정렬됨).
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.read().keys().cloned().collect();
        symbols.sort();
        symbols
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.read().contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // 잠금을 쥔 채 패닉한 스레드가 있어도 맵 자체는 항상 일관된 상태이므로
    // 오염 표시를 무시하고 계속 사용합니다.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<EnrichedSeries>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<EnrichedSeries>>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use market_core::{Bar, BarSeries};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn enriched(closes: &[Decimal]) -> EnrichedSeries {
        let start = Utc.with_ymd_and_hms(2025, 7, 25, 13, 30, 0).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::new(start + Duration::minutes(i as i64), c, c, c, c, dec!(100)))
            .collect();
        EnrichedSeries::raw(BarSeries::new(bars).unwrap())
    }

    #[test]
    fn test_missing_symbol() {
        let cache = SymbolCache::new();
        assert!(cache.get("AAPL").is_none());
        assert!(cache.latest_price("AAPL").is_none());
        assert!(cache.price_change("AAPL", 1).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_latest_price_and_change() {
        let cache = SymbolCache::new();
        cache.update("AAPL", enriched(&[dec!(100), dec!(105), dec!(110)]));

        assert_eq!(cache.latest_price("AAPL"), Some(dec!(110)));
        // (110 - 105) / 105
        assert_eq!(cache.price_change("AAPL", 1), Some(dec!(5) / dec!(105)));
        // (110 - 100) / 100
        assert_eq!(cache.price_change("AAPL", 2), Some(dec!(0.1)));
        // 캔들 3개로는 3기간 변화율 불가
        assert_eq!(cache.price_change("AAPL", 3), None);
    }

    #[test]
    fn test_single_bar_has_no_change() {
        let cache = SymbolCache::new();
        cache.update("MSFT", enriched(&[dec!(420)]));

        assert_eq!(cache.latest_price("MSFT"), Some(dec!(420)));
        assert_eq!(cache.price_change("MSFT", 1), None);
    }

    #[test]
    fn test_update_replaces_wholesale() {
        let cache = SymbolCache::new();
        cache.update("TSLA", enriched(&[dec!(1), dec!(2), dec!(3), dec!(4)]));
        cache.update("TSLA", enriched(&[dec!(250)]));

        let entry = cache.get("TSLA").unwrap();
        assert_eq!(entry.len(), 1);
        assert_eq!(cache.latest_price("TSLA"), Some(dec!(250)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_symbols_are_case_sensitive() {
        let cache = SymbolCache::new();
        cache.update("aapl", enriched(&[dec!(1)]));

        assert!(cache.contains("aapl"));
        assert!(!cache.contains("AAPL"));
    }

    #[test]
    fn test_update_many() {
        let cache = SymbolCache::new();
        let items = vec![
            ("NVDA", Arc::new(enriched(&[dec!(10)]))),
            ("AMZN", Arc::new(enriched(&[dec!(20)]))),
        ];

        assert_eq!(cache.update_many(items), 2);
        assert_eq!(cache.symbols(), vec!["AMZN".to_string(), "NVDA".to_string()]);
    }

    #[test]
    fn test_concurrent_readers_and_writer() {
        let cache = Arc::new(SymbolCache::new());
        cache.update("META", enriched(&[dec!(1), dec!(2)]));

        let writer = {
            let cache = Arc::clone(&cache);
            std::thread::spawn(move || {
                for i in 0..100 {
                    cache.update("META", enriched(&[dec!(1), Decimal::from(i + 2)]));
                }
            })
        };
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        let entry = cache.get("META").unwrap();
                        assert_eq!(entry.len(), 2);
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(cache.latest_price("META"), Some(dec!(101)));
    }
}
