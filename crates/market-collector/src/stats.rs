//! 수집 통계 구조체.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::modules::SymbolUpdate;

/// 수집 작업 통계
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionStats {
    /// 총 시도 횟수
    pub total: usize,
    /// 성공 횟수 (지표 시계열 갱신)
    pub success: usize,
    /// 에러 횟수
    pub errors: usize,
    /// 빈 데이터 (조회 성공, 데이터 없음)
    pub empty: usize,
    /// 갱신된 총 캔들 수
    pub total_bars: usize,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl CollectionStats {
    /// 새 통계 객체 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 심볼별 결과 목록에서 통계 집계
    pub fn from_updates<'a, I>(updates: I, elapsed: Duration) -> Self
    where
        I: IntoIterator<Item = &'a SymbolUpdate>,
    {
        let mut stats = Self {
            elapsed,
            ..Self::default()
        };
        for update in updates {
            stats.record(update);
        }
        stats
    }

    /// 결과 한 건 반영
    pub fn record(&mut self, update: &SymbolUpdate) {
        self.total += 1;
        match update {
            SymbolUpdate::Updated(series) => {
                self.success += 1;
                self.total_bars += series.len();
            }
            SymbolUpdate::NoData => self.empty += 1,
            SymbolUpdate::Failed(_) => self.errors += 1,
        }
    }

    /// 성공률 계산 (%)
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.success as f64 / self.total as f64) * 100.0
        }
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            total = self.total,
            success = self.success,
            errors = self.errors,
            empty = self.empty,
            total_bars = self.total_bars,
            success_rate = format!("{:.1}%", self.success_rate()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "수집 완료"
        );
    }
}
