//! 외부 시세 제공자 구현.

pub mod yahoo;

pub use yahoo::YahooBarProvider;
