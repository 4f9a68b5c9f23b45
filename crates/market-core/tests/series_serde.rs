//! 시계열 직렬화 통합 테스트.

use chrono::{Duration, TimeZone, Utc};
use market_core::{Bar, BarSeries, EnrichedSeries, IndicatorColumns};
use rust_decimal_macros::dec;

fn bar(minute: i64, close: rust_decimal::Decimal) -> Bar {
    let start = Utc.with_ymd_and_hms(2025, 7, 25, 13, 30, 0).unwrap();
    Bar::new(start + Duration::minutes(minute), close, close, close, close, dec!(10))
}

#[test]
fn deserialize_rejects_unordered_bars() {
    let json = serde_json::to_string(&vec![bar(1, dec!(101)), bar(0, dec!(100))]).unwrap();

    let result: Result<BarSeries, _> = serde_json::from_str(&json);
    assert!(result.is_err());
}

#[test]
fn enriched_series_survives_json() {
    let series = BarSeries::new(vec![bar(0, dec!(100)), bar(1, dec!(101.5))]).unwrap();
    let enriched = EnrichedSeries::raw(series);

    let json = serde_json::to_string(&enriched).unwrap();
    let restored: EnrichedSeries = serde_json::from_str(&json).unwrap();

    assert_eq!(restored, enriched);
    assert!(!restored.is_enriched());
    assert_eq!(restored.latest_close(), Some(dec!(101.5)));
}

fn empty_columns(len: usize) -> IndicatorColumns {
    let column = vec![None; len];
    IndicatorColumns {
        sma_5: column.clone(),
        sma_20: column.clone(),
        ema_12: column.clone(),
        ema_26: column.clone(),
        macd: column.clone(),
        macd_signal: column.clone(),
        macd_histogram: column.clone(),
        rsi: column.clone(),
        bb_middle: column.clone(),
        bb_upper: column.clone(),
        bb_lower: column.clone(),
        volume_sma: column.clone(),
        volume_ratio: column.clone(),
        price_change: column.clone(),
        price_change_5: column,
    }
}

#[test]
fn deserialize_rejects_misaligned_indicator_columns() {
    let series = BarSeries::new(vec![bar(0, dec!(100)), bar(1, dec!(101))]).unwrap();
    let mut columns = empty_columns(2);
    columns.rsi[1] = Some(dec!(100));
    let enriched = EnrichedSeries::with_indicators(series, columns).unwrap();

    let mut value = serde_json::to_value(&enriched).unwrap();
    let restored: EnrichedSeries = serde_json::from_value(value.clone()).unwrap();
    assert_eq!(restored, enriched);

    // 캔들 1개, 지표 컬럼 2개
    value["bars"].as_array_mut().unwrap().pop();
    let result = serde_json::from_value::<EnrichedSeries>(value);
    assert!(result.is_err());
}
