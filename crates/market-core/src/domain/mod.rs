//! 시세 수집을 위한 도메인 모델.

mod bar;
mod bar_provider;
mod enriched;

pub use bar::*;
pub use bar_provider::*;
pub use enriched::*;
