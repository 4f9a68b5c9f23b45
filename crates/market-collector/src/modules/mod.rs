//! 데이터 수집 모듈.

pub mod batch;
pub mod fetch;
pub mod scheduler;

pub use batch::{BatchHandler, CollectionBatch, SymbolUpdate};
pub use fetch::{FetchSettings, SymbolFetcher};
pub use scheduler::{CollectionScheduler, CollectionSettings, CollectionStatus};
