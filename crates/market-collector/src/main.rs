//! Market collector CLI.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use market_collector::config::parse_symbols;
use market_collector::{
    CollectionBatch, CollectionScheduler, CollectionStats, CollectorConfig, SymbolFetcher,
    SymbolUpdate,
};
use market_core::logging::{init_logging, LogConfig, LogFormat};
use market_core::{EnrichedSeries, IndicatorSnapshot, LookbackPeriod};
use market_data::SymbolCache;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "market-collector")]
#[command(about = "Market data collector with technical indicators", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// 로그 형식 (pretty, json, compact)
    #[arg(long)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// 심볼 조회 + 지표 계산 (1회)
    Fetch {
        /// 특정 심볼만 조회 (쉼표로 구분, 예: "AAPL,MSFT")
        #[arg(long)]
        symbols: Option<String>,

        /// 최신 지표 스냅샷을 JSON으로 출력
        #[arg(long)]
        json: bool,
    },

    /// 과거 데이터 조회 (1시간 캔들)
    History {
        /// 조회할 심볼
        #[arg(long)]
        symbol: String,

        /// 조회 기간 (예: 1mo, 6mo, 1y). 기본값은 COLLECTOR_HISTORY_PERIOD
        #[arg(long)]
        period: Option<LookbackPeriod>,

        /// 최신 지표 스냅샷을 JSON으로 출력
        #[arg(long)]
        json: bool,
    },

    /// 데몬 모드: 주기적으로 수집 (Ctrl-C로 종료)
    Daemon,
}

/// 심볼별 요약 (JSON 출력용)
#[derive(Debug, Serialize)]
struct SymbolSummary<'a> {
    symbol: &'a str,
    status: &'static str,
    bars: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    latest: Option<IndicatorSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<'a> SymbolSummary<'a> {
    fn new(symbol: &'a str, update: &SymbolUpdate) -> Self {
        let (status, series, error) = match update {
            SymbolUpdate::Updated(series) => ("updated", Some(&**series), None),
            SymbolUpdate::NoData => ("no_data", None, None),
            SymbolUpdate::Failed(e) => ("failed", None, Some(e.to_string())),
        };
        Self {
            symbol,
            status,
            bars: series.map_or(0, EnrichedSeries::len),
            latest: series.and_then(EnrichedSeries::latest_snapshot),
            error,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // 로깅 초기화 (dotenvy::var는 첫 호출 시 .env를 읽음)
    let default_filter = format!(
        "market_collector={level},market_data={level},market_analytics={level}",
        level = cli.log_level
    );
    let mut log_config = LogConfig::from_lookup(&default_filter, |key| dotenvy::var(key).ok());
    if let Some(format) = cli.log_format {
        log_config = log_config.with_format(format);
    }
    init_logging(log_config)?;

    tracing::info!("Market Collector 시작");

    // 설정 로드
    let config = CollectorConfig::from_env();
    tracing::debug!(symbols = ?config.symbols, "설정 로드 완료");

    let fetcher = Arc::new(SymbolFetcher::yahoo(config.fetch_settings())?);

    // 명령 실행
    match cli.command {
        Commands::Fetch { symbols, json } => {
            let targets = symbols
                .as_deref()
                .map(parse_symbols)
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| config.symbols.clone());

            let start = std::time::Instant::now();
            let results = fetcher.fetch_many(targets.as_slice()).await;
            let stats =
                CollectionStats::from_updates(results.iter().map(|(_, u)| u), start.elapsed());

            report(&results, json)?;
            stats.log_summary("수동 조회");
        }
        Commands::History {
            symbol,
            period,
            json,
        } => {
            let period = period.unwrap_or(config.fetch.history_period);
            let update = fetcher.fetch_history(&symbol, period).await;
            report(&[(symbol, update)], json)?;
        }
        Commands::Daemon => {
            tracing::info!(
                "=== 데몬 모드 시작 (주기: {}초) ===",
                config.daemon.update_interval_secs
            );

            let cache = Arc::new(SymbolCache::new());
            let scheduler = CollectionScheduler::new(fetcher, Arc::clone(&cache));
            scheduler.start(
                config.symbols.clone(),
                config.collection_settings(),
                move |batch: &CollectionBatch| log_batch(batch, &cache),
            )?;

            tokio::signal::ctrl_c().await?;
            tracing::info!("종료 신호 수신, 데몬 종료 중...");
            scheduler.stop().await;
        }
    }

    tracing::info!("Market Collector 종료");

    Ok(())
}

/// 조회 결과 출력
fn report(results: &[(String, SymbolUpdate)], json: bool) -> Result<(), serde_json::Error> {
    let summaries: Vec<SymbolSummary<'_>> = results
        .iter()
        .map(|(symbol, update)| SymbolSummary::new(symbol, update))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    for summary in &summaries {
        match &summary.latest {
            Some(latest) => tracing::info!(
                symbol = summary.symbol,
                bars = summary.bars,
                close = %latest.close,
                rsi = ?latest.rsi,
                macd = ?latest.macd,
                change = ?latest.price_change,
                "조회 완료"
            ),
            None => tracing::info!(
                symbol = summary.symbol,
                status = summary.status,
                bars = summary.bars,
                error = ?summary.error,
                "지표 없음"
            ),
        }
    }
    Ok(())
}

/// 배치 수신 시 심볼별 최신 가격 로그
fn log_batch(batch: &CollectionBatch, cache: &SymbolCache) {
    for (symbol, _) in batch.updated() {
        tracing::info!(
            cycle = batch.cycle,
            symbol,
            price = ?cache.latest_price(symbol),
            change = ?cache.price_change(symbol, 1),
            "가격 갱신"
        );
    }
    tracing::info!(
        cycle = batch.cycle,
        updated = batch.stats.success,
        failed = batch.stats.errors,
        "=== 수집 주기 완료 ==="
    );
}
