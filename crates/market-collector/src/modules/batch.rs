//! 수집 주기 결과 묶음과 소비자 인터페이스.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use market_core::{EnrichedSeries, ProviderError};
use tokio::sync::mpsc::UnboundedSender;

use crate::stats::CollectionStats;

/// 심볼 한 건의 조회 결과.
///
/// `NoData`와 `Failed`는 "이번 주기에 갱신 없음"을 뜻합니다. 배치에 아예 없는
/// 심볼은 수집 대상이 아닌 심볼입니다.
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolUpdate {
    /// 조회 및 지표 계산 성공
    Updated(Arc<EnrichedSeries>),
    /// 조회는 성공했지만 캔들이 없음 (장 마감 등)
    NoData,
    /// 조회 실패
    Failed(ProviderError),
}

impl SymbolUpdate {
    /// 갱신된 시계열 (성공한 경우만)
    pub fn series(&self) -> Option<&Arc<EnrichedSeries>> {
        match self {
            SymbolUpdate::Updated(series) => Some(series),
            _ => None,
        }
    }

    pub fn is_updated(&self) -> bool {
        matches!(self, SymbolUpdate::Updated(_))
    }
}

/// 수집 한 주기의 결과.
#[derive(Debug, Clone)]
pub struct CollectionBatch {
    /// 주기 번호 (1부터 시작)
    pub cycle: u64,
    /// 주기 완료 시각
    pub collected_at: DateTime<Utc>,
    /// 심볼별 결과 (수집 순서 유지)
    pub entries: Vec<(String, SymbolUpdate)>,
    /// 주기 통계
    pub stats: CollectionStats,
}

impl CollectionBatch {
    /// 심볼의 결과. 수집 대상이 아니었으면 `None`.
    pub fn get(&self, symbol: &str) -> Option<&SymbolUpdate> {
        self.entries
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, update)| update)
    }

    /// 이번 주기에 갱신된 심볼과 시계열.
    pub fn updated(&self) -> impl Iterator<Item = (&str, &Arc<EnrichedSeries>)> + '_ {
        self.entries
            .iter()
            .filter_map(|(symbol, update)| Some((symbol.as_str(), update.series()?)))
    }

    pub fn is_updated(&self, symbol: &str) -> bool {
        self.get(symbol).is_some_and(SymbolUpdate::is_updated)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 수집 주기마다 호출되는 소비자.
///
/// 수집 루프 안에서 동기적으로 호출되며, 반환될 때까지 다음 주기가 시작되지
/// 않습니다. 오래 걸리는 처리는 채널로 넘겨 별도 task에서 하십시오.
pub trait BatchHandler: Send + Sync + 'static {
    fn on_batch(&self, batch: &CollectionBatch);
}

impl<F> BatchHandler for F
where
    F: Fn(&CollectionBatch) + Send + Sync + 'static,
{
    fn on_batch(&self, batch: &CollectionBatch) {
        self(batch)
    }
}

/// 채널 전달형 소비자. 수신자가 닫혔으면 배치를 버립니다.
impl BatchHandler for UnboundedSender<CollectionBatch> {
    fn on_batch(&self, batch: &CollectionBatch) {
        if self.send(batch.clone()).is_err() {
            tracing::debug!(cycle = batch.cycle, "배치 수신자 없음, 전달 생략");
        }
    }
}
