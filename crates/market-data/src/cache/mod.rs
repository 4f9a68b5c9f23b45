//! 캐싱 레이어.
//!
//! - Symbol 캐시: 심볼별 최신 지표 시계열 (메모리)

pub mod symbol_cache;

pub use symbol_cache::SymbolCache;
