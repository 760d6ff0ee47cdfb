//! Background services

mod fee_collector;

pub use fee_collector::{CollectorError, FeeCollector};
