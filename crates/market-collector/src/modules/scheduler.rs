//! 백그라운드 수집 루프.
//!
//! 상태 전이는 `Idle → Running → Stopping → Idle` 하나뿐입니다.
//!
//! - `start()`: 백그라운드 task를 하나 띄웁니다. 루프가 아직 살아 있으면
//!   (`Stopping` 포함) `AlreadyRunning`.
//! - `stop()`: 진행 중인 주기가 끝나기를 기다린 뒤 task가 완전히 종료되면 반환합니다.
//!   반환 이후에는 캐시 쓰기가 일어나지 않습니다. `stop()` future가 중간에 버려져도
//!   루프는 슬롯에 남아 있으므로 종료될 때까지 `Stopping`으로 보고됩니다.
//!
//! 스케줄링은 고정 지연(fixed-delay) 방식입니다. 주기가 끝나고 소비자 호출이
//! 반환된 시점부터 `refresh_interval`만큼 대기합니다.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use chrono::Utc;
use market_data::SymbolCache;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::batch::{BatchHandler, CollectionBatch};
use super::fetch::SymbolFetcher;
use crate::error::{CollectorError, Result};
use crate::stats::CollectionStats;

/// 수집 루프 설정
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionSettings {
    /// 주기 사이 대기 시간
    pub refresh_interval: Duration,
}

impl CollectionSettings {
    pub fn new(refresh_interval: Duration) -> Self {
        Self { refresh_interval }
    }
}

impl Default for CollectionSettings {
    fn default() -> Self {
        Self::new(Duration::from_secs(60))
    }
}

/// 수집 루프 상태
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionStatus {
    Idle,
    Running {
        /// 수집 중인 심볼
        symbols: Vec<String>,
        /// 완료된 주기 수
        cycles: u64,
    },
    /// 정지 요청을 받았지만 진행 중인 주기가 아직 끝나지 않음
    Stopping {
        symbols: Vec<String>,
        cycles: u64,
    },
}

struct ActiveLoop {
    symbols: Arc<[String]>,
    completed_cycles: Arc<AtomicU64>,
    shutdown: CancellationToken,
    /// 감시 task가 끝날 때 취소됨 (패닉 포함)
    finished: CancellationToken,
    handle: JoinHandle<()>,
}

impl ActiveLoop {
    fn is_finished(&self) -> bool {
        self.finished.is_cancelled()
    }

    fn status(&self) -> CollectionStatus {
        let symbols = self.symbols.to_vec();
        let cycles = self.completed_cycles.load(Ordering::SeqCst);
        if self.shutdown.is_cancelled() {
            CollectionStatus::Stopping { symbols, cycles }
        } else {
            CollectionStatus::Running { symbols, cycles }
        }
    }
}

/// 주기적 수집 스케줄러.
///
/// 동시에 하나의 수집 루프만 실행합니다.
pub struct CollectionScheduler {
    fetcher: Arc<SymbolFetcher>,
    cache: Arc<SymbolCache>,
    active: Mutex<Option<ActiveLoop>>,
}

impl CollectionScheduler {
    pub fn new(fetcher: Arc<SymbolFetcher>, cache: Arc<SymbolCache>) -> Self {
        Self {
            fetcher,
            cache,
            active: Mutex::new(None),
        }
    }

    pub fn cache(&self) -> &Arc<SymbolCache> {
        &self.cache
    }

    /// 수집 루프 시작.
    ///
    /// 첫 주기는 즉시 시작됩니다.
    ///
    /// # Errors
    ///
    /// - `CollectorError::AlreadyRunning`: 실행 중이거나 정지 중인 루프가 있음
    /// - `CollectorError::Config`: 심볼 목록이 비었거나 주기가 0, 또는 tokio 런타임 밖에서 호출
    pub fn start<H: BatchHandler>(
        &self,
        symbols: Vec<String>,
        settings: CollectionSettings,
        handler: H,
    ) -> Result<()> {
        if symbols.is_empty() {
            return Err(CollectorError::Config("수집할 심볼이 없습니다".to_string()));
        }
        if settings.refresh_interval.is_zero() {
            return Err(CollectorError::Config(
                "수집 주기는 0보다 커야 합니다".to_string(),
            ));
        }
        let runtime = Handle::try_current()
            .map_err(|e| CollectorError::Config(format!("tokio 런타임 밖에서 호출됨: {}", e)))?;

        let mut active = self.lock_active();
        if let Some(current) = active.as_ref() {
            if !current.is_finished() {
                return Err(CollectorError::AlreadyRunning {
                    symbols: current.symbols.to_vec(),
                });
            }
            warn!("이전 수집 루프가 비정상 종료됨, 새 루프로 교체");
        }

        let symbols: Arc<[String]> = symbols.into();
        let completed_cycles = Arc::new(AtomicU64::new(0));
        let shutdown = CancellationToken::new();
        let finished = CancellationToken::new();

        let collection = CollectionLoop {
            fetcher: Arc::clone(&self.fetcher),
            cache: Arc::clone(&self.cache),
            symbols: Arc::clone(&symbols),
            settings,
            handler: Box::new(handler),
            completed_cycles: Arc::clone(&completed_cycles),
        };
        let handle = spawn_supervised(&runtime, collection, shutdown.clone(), finished.clone());

        info!(
            symbols = ?symbols,
            interval_secs = settings.refresh_interval.as_secs_f64(),
            "수집 루프 시작"
        );

        *active = Some(ActiveLoop {
            symbols,
            completed_cycles,
            shutdown,
            finished,
            handle,
        });
        Ok(())
    }

    /// 수집 루프 정지.
    ///
    /// 진행 중인 주기는 끝까지 수행되며, 루프가 완전히 종료된 뒤 반환합니다.
    /// 실행 중이 아니면 아무것도 하지 않습니다.
    ///
    /// 루프는 종료될 때까지 슬롯에 남아 있으므로, 정지 중에 호출된 `start()`는
    /// `AlreadyRunning`으로 거부됩니다.
    pub async fn stop(&self) {
        let tokens = self
            .lock_active()
            .as_ref()
            .map(|active| (active.shutdown.clone(), active.finished.clone()));
        let Some((shutdown, finished)) = tokens else {
            return;
        };

        if !shutdown.is_cancelled() {
            info!("수집 루프 정지 요청");
            shutdown.cancel();
        }
        finished.cancelled().await;

        let stopped = {
            let mut active = self.lock_active();
            if active.as_ref().is_some_and(ActiveLoop::is_finished) {
                active.take()
            } else {
                None
            }
        };
        let Some(stopped) = stopped else {
            return;
        };

        if let Err(e) = stopped.handle.await {
            error!(error = %e, "수집 루프 종료 대기 실패");
        }
        info!(
            cycles = stopped.completed_cycles.load(Ordering::SeqCst),
            "수집 루프 정지 완료"
        );
    }

    /// 루프 task가 살아 있는지 확인합니다. 정지 중인 루프도 포함하며,
    /// 비정상 종료된 루프는 제외합니다.
    pub fn is_running(&self) -> bool {
        self.lock_active()
            .as_ref()
            .is_some_and(|active| !active.is_finished())
    }

    pub fn state(&self) -> CollectionStatus {
        match self.lock_active().as_ref() {
            Some(active) if !active.is_finished() => active.status(),
            _ => CollectionStatus::Idle,
        }
    }

    // 상태 전이 중 패닉은 Option 교체 사이에서만 일어날 수 있어 값은 항상 유효합니다.
    fn lock_active(&self) -> MutexGuard<'_, Option<ActiveLoop>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// 루프 task를 감시 task로 감싸서 띄웁니다. 루프가 패닉하면 여기서 기록합니다.
///
/// 감시 task가 어떤 식으로 끝나든 `finished`는 취소됩니다.
fn spawn_supervised(
    runtime: &Handle,
    collection: CollectionLoop,
    shutdown: CancellationToken,
    finished: CancellationToken,
) -> JoinHandle<()> {
    let inner = runtime.clone();
    runtime.spawn(async move {
        let _finished = finished.drop_guard();
        let result = inner.spawn(collection.run(shutdown)).await;
        if let Err(e) = result {
            if e.is_panic() {
                error!(error = %e, "수집 루프 비정상 종료");
            }
        }
    })
}

struct CollectionLoop {
    fetcher: Arc<SymbolFetcher>,
    cache: Arc<SymbolCache>,
    symbols: Arc<[String]>,
    settings: CollectionSettings,
    handler: Box<dyn BatchHandler>,
    completed_cycles: Arc<AtomicU64>,
}

impl CollectionLoop {
    async fn run(self, shutdown: CancellationToken) {
        let mut cycle = 0u64;

        loop {
            if shutdown.is_cancelled() {
                break;
            }

            cycle += 1;
            let batch = self.run_cycle(cycle).await;
            self.handler.on_batch(&batch);
            self.completed_cycles.store(cycle, Ordering::SeqCst);

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.settings.refresh_interval) => {}
            }
        }

        info!(cycles = cycle, "수집 루프 종료");
    }

    /// 한 주기: 전체 심볼 조회 → 성공분 캐시 반영 → 배치 생성.
    async fn run_cycle(&self, cycle: u64) -> CollectionBatch {
        let start = Instant::now();
        let entries = self.fetcher.fetch_many(&self.symbols[..]).await;

        let updated = self.cache.update_many(
            entries
                .iter()
                .filter_map(|(symbol, update)| Some((symbol.clone(), Arc::clone(update.series()?)))),
        );

        let stats =
            CollectionStats::from_updates(entries.iter().map(|(_, update)| update), start.elapsed());
        stats.log_summary("수집 주기");
        tracing::debug!(cycle, cached = updated, "캐시 반영 완료");

        CollectionBatch {
            cycle,
            collected_at: Utc::now(),
            entries,
            stats,
        }
    }
}
