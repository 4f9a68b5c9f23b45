//! 환경변수 기반 설정 모듈.
//!
//! 라이브러리 코드는 설정 소스를 직접 읽지 않습니다. 바이너리만
//! `CollectorConfig::from_env()`로 설정을 만들어 각 구성요소에 넘깁니다.

use std::time::Duration;

use market_core::{LookbackPeriod, Timeframe};

use crate::modules::{CollectionSettings, FetchSettings};

/// 기본 수집 대상 심볼
pub const DEFAULT_SYMBOLS: [&str; 8] = ["AAPL", "GOOGL", "MSFT", "AMZN", "TSLA", "META", "NFLX", "NVDA"];

/// Collector 전체 설정
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// 수집 대상 심볼 (입력 순서 유지)
    pub symbols: Vec<String>,
    /// 조회 설정
    pub fetch: FetchConfig,
    /// 데몬 모드 설정
    pub daemon: DaemonConfig,
}

/// 조회 설정
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// 조회 기간 (기본: 1d)
    pub period: LookbackPeriod,
    /// 캔들 간격 (기본: 1m)
    pub interval: Timeframe,
    /// 과거 데이터 조회 기간 (기본: 1y)
    pub history_period: LookbackPeriod,
    /// API 요청 간 딜레이 (밀리초)
    pub api_delay_ms: u64,
    /// 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
}

/// 데몬 모드 설정
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// 수집 주기 (초 단위)
    pub update_interval_secs: u64,
}

impl CollectorConfig {
    /// 환경변수에서 설정 로드 (`.env` 파일 포함)
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 키 조회 함수로 설정 생성. 값이 없거나 파싱에 실패하면 기본값을 사용합니다.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let symbols = lookup("COLLECTOR_SYMBOLS")
            .map(|s| parse_symbols(&s))
            .filter(|symbols| !symbols.is_empty())
            .unwrap_or_else(|| DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect());

        Self {
            symbols,
            fetch: FetchConfig {
                period: parse_or(&lookup, "COLLECTOR_PERIOD", LookbackPeriod::D1),
                interval: parse_or(&lookup, "COLLECTOR_INTERVAL", Timeframe::M1),
                history_period: parse_or(&lookup, "COLLECTOR_HISTORY_PERIOD", LookbackPeriod::Y1),
                api_delay_ms: parse_or(&lookup, "COLLECTOR_API_DELAY_MS", 100),
                request_timeout_secs: parse_or(&lookup, "COLLECTOR_REQUEST_TIMEOUT_SECS", 30),
            },
            daemon: DaemonConfig {
                update_interval_secs: parse_or(&lookup, "COLLECTOR_UPDATE_INTERVAL_SECS", 60),
            },
        }
    }

    /// `SymbolFetcher`용 설정
    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            period: self.fetch.period,
            interval: self.fetch.interval,
            request_delay: self.fetch.request_delay(),
            request_timeout: Duration::from_secs(self.fetch.request_timeout_secs),
        }
    }

    /// `CollectionScheduler::start`용 설정
    pub fn collection_settings(&self) -> CollectionSettings {
        CollectionSettings::new(self.daemon.update_interval())
    }
}

impl FetchConfig {
    /// API 요청 간 딜레이를 Duration으로 반환
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.api_delay_ms)
    }
}

impl DaemonConfig {
    /// 수집 주기를 Duration으로 반환
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }
}

/// 쉼표로 구분된 심볼 목록 파싱 (빈 항목 제거, 순서 유지)
pub fn parse_symbols(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// 값을 파싱 (실패 시 기본값 사용)
fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "설정값 파싱 실패, 기본값 사용");
            default
        }),
        None => default,
    }
}
