//! CollectionScheduler 통합 테스트.
//!
//! 모든 테스트는 tokio 가상 시간(`start_paused = true`)에서 실행됩니다.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use market_collector::{
    CollectionBatch, CollectionScheduler, CollectionSettings, CollectionStatus, CollectorError,
    FetchSettings, SymbolFetcher, SymbolUpdate,
};
use market_core::{Bar, BarProvider, BarSeries, LookbackPeriod, ProviderError, Timeframe};
use market_data::SymbolCache;
use rust_decimal::Decimal;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// 심볼별로 미리 정한 결과를 돌려주는 제공자
struct ScriptedProvider {
    responses: HashMap<String, Result<usize, ProviderError>>,
    latency: Duration,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    fn new(latency: Duration) -> Self {
        Self {
            responses: HashMap::new(),
            latency,
            calls: AtomicUsize::new(0),
        }
    }

    fn bars(mut self, symbol: &str, count: usize) -> Self {
        self.responses.insert(symbol.to_string(), Ok(count));
        self
    }

    fn fails(mut self, symbol: &str, error: ProviderError) -> Self {
        self.responses.insert(symbol.to_string(), Err(error));
        self
    }
}

#[async_trait]
impl BarProvider for ScriptedProvider {
    async fn fetch_bars(
        &self,
        symbol: &str,
        _period: LookbackPeriod,
        _interval: Timeframe,
    ) -> Result<BarSeries, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.latency).await;

        let count = match self.responses.get(symbol) {
            Some(Ok(count)) => *count,
            Some(Err(e)) => return Err(e.clone()),
            None => return Err(ProviderError::UnknownSymbol(symbol.to_string())),
        };

        let start = Utc.with_ymd_and_hms(2025, 7, 25, 13, 30, 0).unwrap();
        let bars = (0..count)
            .map(|i| {
                let close = Decimal::from(200 + (i as i64 % 7));
                Bar::new(
                    start + chrono::Duration::minutes(i as i64),
                    close,
                    close,
                    close,
                    close,
                    Decimal::from(5_000),
                )
            })
            .collect();
        Ok(BarSeries::new(bars).unwrap())
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

fn scheduler(provider: Arc<ScriptedProvider>) -> CollectionScheduler {
    let settings = FetchSettings {
        request_delay: Duration::from_millis(100),
        ..FetchSettings::default()
    };
    let fetcher = Arc::new(SymbolFetcher::new(provider, settings));
    CollectionScheduler::new(fetcher, Arc::new(SymbolCache::new()))
}

fn symbols(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[tokio::test(start_paused = true)]
async fn cycle_with_one_failing_symbol() {
    let provider = Arc::new(
        ScriptedProvider::new(Duration::from_millis(50))
            .bars("AAPL", 30)
            .fails("BROKEN", ProviderError::Network("connection reset".to_string()))
            .bars("MSFT", 30),
    );
    let scheduler = scheduler(provider);
    let (tx, mut rx) = mpsc::unbounded_channel::<CollectionBatch>();

    scheduler
        .start(
            symbols(&["AAPL", "BROKEN", "MSFT"]),
            CollectionSettings::new(Duration::from_secs(60)),
            tx,
        )
        .unwrap();

    let batch = rx.recv().await.unwrap();
    scheduler.stop().await;

    assert_eq!(batch.cycle, 1);
    let order: Vec<&str> = batch.entries.iter().map(|(s, _)| s.as_str()).collect();
    assert_eq!(order, vec!["AAPL", "BROKEN", "MSFT"]);
    assert!(batch.is_updated("AAPL"));
    assert!(batch.is_updated("MSFT"));
    assert!(matches!(
        batch.get("BROKEN"),
        Some(SymbolUpdate::Failed(ProviderError::Network(_)))
    ));
    assert_eq!(batch.stats.success, 2);
    assert_eq!(batch.stats.errors, 1);

    let cache = scheduler.cache();
    assert_eq!(cache.symbols(), symbols(&["AAPL", "MSFT"]));
    assert!(cache.get("BROKEN").is_none());
    assert!(cache.get("AAPL").unwrap().is_enriched());
    assert_eq!(
        cache.get("AAPL"),
        batch.get("AAPL").and_then(|u| u.series()).cloned()
    );
}

#[tokio::test(start_paused = true)]
async fn empty_result_is_no_update() {
    let provider = Arc::new(ScriptedProvider::new(Duration::ZERO).bars("AAPL", 0));
    let scheduler = scheduler(provider);
    let (tx, mut rx) = mpsc::unbounded_channel::<CollectionBatch>();

    scheduler
        .start(symbols(&["AAPL"]), CollectionSettings::default(), tx)
        .unwrap();
    let batch = rx.recv().await.unwrap();
    scheduler.stop().await;

    assert_eq!(batch.get("AAPL"), Some(&SymbolUpdate::NoData));
    assert_eq!(batch.stats.empty, 1);
    assert!(scheduler.cache().is_empty());
}

#[tokio::test(start_paused = true)]
async fn fixed_delay_between_cycles() {
    // 조회 5초 + 주기 60초 → 다음 주기는 이전 주기 완료 60초 뒤 시작
    let provider = Arc::new(ScriptedProvider::new(Duration::from_secs(5)).bars("AAPL", 25));
    let scheduler = scheduler(provider.clone());
    let (tx, mut rx) = mpsc::unbounded_channel();

    let started = Instant::now();
    scheduler
        .start(
            symbols(&["AAPL"]),
            CollectionSettings::new(Duration::from_secs(60)),
            move |batch: &CollectionBatch| {
                tx.send((batch.cycle, Instant::now())).ok();
            },
        )
        .unwrap();

    let (first_cycle, first_at) = rx.recv().await.unwrap();
    let (second_cycle, second_at) = rx.recv().await.unwrap();
    scheduler.stop().await;

    assert_eq!((first_cycle, second_cycle), (1, 2));
    assert_eq!(first_at - started, Duration::from_secs(5));
    assert_eq!(second_at - first_at, Duration::from_secs(65));
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn stop_right_after_start_leaves_cache_untouched() {
    let provider = Arc::new(ScriptedProvider::new(Duration::from_millis(10)).bars("AAPL", 25));
    let scheduler = scheduler(provider);

    scheduler
        .start(symbols(&["AAPL"]), CollectionSettings::default(), |_: &CollectionBatch| {})
        .unwrap();
    scheduler.stop().await;

    assert!(!scheduler.is_running());
    assert_eq!(scheduler.state(), CollectionStatus::Idle);

    let cached = scheduler.cache().len();
    tokio::time::sleep(Duration::from_secs(600)).await;
    assert_eq!(scheduler.cache().len(), cached);
}

#[tokio::test(start_paused = true)]
async fn stop_waits_for_running_cycle() {
    let provider = Arc::new(ScriptedProvider::new(Duration::from_secs(5)).bars("AAPL", 25));
    let scheduler = scheduler(provider);
    let batches = Arc::new(Mutex::new(0usize));

    let seen = Arc::clone(&batches);
    scheduler
        .start(
            symbols(&["AAPL"]),
            CollectionSettings::default(),
            move |_: &CollectionBatch| *seen.lock().unwrap() += 1,
        )
        .unwrap();

    // 첫 주기의 조회가 진행 중일 때 정지
    tokio::time::sleep(Duration::from_secs(1)).await;
    scheduler.stop().await;

    // 진행 중이던 주기는 끝까지 수행됨
    assert_eq!(*batches.lock().unwrap(), 1);
    assert!(scheduler.cache().contains("AAPL"));
}

#[tokio::test(start_paused = true)]
async fn start_while_running_is_rejected() {
    let provider = Arc::new(ScriptedProvider::new(Duration::ZERO).bars("AAPL", 25));
    let scheduler = scheduler(provider);
    let noop = |_: &CollectionBatch| {};

    scheduler
        .start(symbols(&["AAPL"]), CollectionSettings::default(), noop)
        .unwrap();
    let second = scheduler.start(symbols(&["MSFT"]), CollectionSettings::default(), noop);

    assert!(matches!(
        second,
        Err(CollectorError::AlreadyRunning { ref symbols }) if symbols == &["AAPL".to_string()]
    ));
    assert!(matches!(
        scheduler.state(),
        CollectionStatus::Running { ref symbols, .. } if symbols == &["AAPL".to_string()]
    ));

    scheduler.stop().await;
    // 정지 후에는 다시 시작 가능
    scheduler
        .start(symbols(&["MSFT"]), CollectionSettings::default(), noop)
        .unwrap();
    scheduler.stop().await;
}

#[tokio::test(start_paused = true)]
async fn invalid_start_arguments() {
    let provider = Arc::new(ScriptedProvider::new(Duration::ZERO));
    let scheduler = scheduler(provider);
    let noop = |_: &CollectionBatch| {};

    assert!(matches!(
        scheduler.start(Vec::new(), CollectionSettings::default(), noop),
        Err(CollectorError::Config(_))
    ));
    assert!(matches!(
        scheduler.start(
            symbols(&["AAPL"]),
            CollectionSettings::new(Duration::ZERO),
            noop
        ),
        Err(CollectorError::Config(_))
    ));
    assert!(!scheduler.is_running());
}

#[tokio::test(start_paused = true)]
async fn stop_when_idle_is_noop() {
    let scheduler = scheduler(Arc::new(ScriptedProvider::new(Duration::ZERO)));

    scheduler.stop().await;
    scheduler.stop().await;

    assert_eq!(scheduler.state(), CollectionStatus::Idle);
}

#[tokio::test(start_paused = true)]
async fn crashed_loop_reports_idle_and_can_restart() {
    let provider = Arc::new(ScriptedProvider::new(Duration::ZERO).bars("AAPL", 25));
    let scheduler = scheduler(provider);

    scheduler
        .start(
            symbols(&["AAPL"]),
            CollectionSettings::default(),
            |_: &CollectionBatch| panic!("handler failure"),
        )
        .unwrap();

    let deadline = Instant::now() + Duration::from_secs(10);
    while scheduler.is_running() && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(scheduler.state(), CollectionStatus::Idle);
    // 캐시 반영은 소비자 호출 전에 끝남
    assert!(scheduler.cache().contains("AAPL"));

    let (tx, mut rx) = mpsc::unbounded_channel::<CollectionBatch>();
    scheduler
        .start(symbols(&["AAPL"]), CollectionSettings::default(), tx)
        .unwrap();
    assert_eq!(rx.recv().await.unwrap().cycle, 1);
    scheduler.stop().await;
}

#[tokio::test(start_paused = true)]
async fn running_state_counts_cycles() {
    let provider = Arc::new(ScriptedProvider::new(Duration::ZERO).bars("AAPL", 25));
    let scheduler = scheduler(provider);
    let (tx, mut rx) = mpsc::unbounded_channel::<CollectionBatch>();

    scheduler
        .start(
            symbols(&["AAPL"]),
            CollectionSettings::new(Duration::from_secs(30)),
            tx,
        )
        .unwrap();
    rx.recv().await.unwrap();
    rx.recv().await.unwrap();
    // 두 번째 배치가 전달된 직후 카운터 갱신을 기다림
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(
        scheduler.state(),
        CollectionStatus::Running {
            symbols: symbols(&["AAPL"]),
            cycles: 2,
        }
    );
    scheduler.stop().await;
}

#[tokio::test(start_paused = true)]
async fn start_during_pending_stop_is_rejected() {
    let provider = Arc::new(
        ScriptedProvider::new(Duration::from_secs(5))
            .bars("OLD", 25)
            .bars("NEW", 25),
    );
    let scheduler = scheduler(provider);
    let (tx, mut rx) = mpsc::unbounded_channel::<CollectionBatch>();

    scheduler
        .start(symbols(&["OLD"]), CollectionSettings::default(), tx)
        .unwrap();
    // 첫 주기의 조회가 진행 중
    tokio::time::sleep(Duration::from_secs(1)).await;

    // 정지 대기를 중간에 포기해도 루프는 추적됨
    let abandoned = tokio::time::timeout(Duration::from_millis(100), scheduler.stop()).await;
    assert!(abandoned.is_err());

    assert!(scheduler.is_running());
    assert_eq!(
        scheduler.state(),
        CollectionStatus::Stopping {
            symbols: symbols(&["OLD"]),
            cycles: 0,
        }
    );
    let second = scheduler.start(
        symbols(&["NEW"]),
        CollectionSettings::default(),
        |_: &CollectionBatch| {},
    );
    assert!(matches!(
        second,
        Err(CollectorError::AlreadyRunning { ref symbols }) if symbols == &["OLD".to_string()]
    ));

    // 진행 중이던 주기는 끝나고 루프는 더 이상 주기를 시작하지 않음
    assert_eq!(rx.recv().await.unwrap().cycle, 1);
    assert!(rx.recv().await.is_none());

    scheduler.stop().await;
    assert_eq!(scheduler.state(), CollectionStatus::Idle);
    assert_eq!(scheduler.cache().symbols(), symbols(&["OLD"]));

    let (tx, mut rx) = mpsc::unbounded_channel::<CollectionBatch>();
    scheduler
        .start(symbols(&["NEW"]), CollectionSettings::default(), tx)
        .unwrap();
    assert_eq!(rx.recv().await.unwrap().cycle, 1);
    scheduler.stop().await;
    assert!(scheduler.cache().contains("NEW"));
}

#[test]
fn start_outside_runtime_is_config_error() {
    let provider = Arc::new(ScriptedProvider::new(Duration::ZERO).bars("AAPL", 25));
    let scheduler = scheduler(provider);

    let result = scheduler.start(
        symbols(&["AAPL"]),
        CollectionSettings::default(),
        |_: &CollectionBatch| {},
    );

    assert!(matches!(result, Err(CollectorError::Config(_))));
    assert_eq!(scheduler.state(), CollectionStatus::Idle);
}
