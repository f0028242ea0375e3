//! Core domain types and logic.
//!
//! Everything under this module is a pure computation over in-memory data;
//! I/O lives behind the traits in [`crate::ports`].

pub mod ohlcv;
pub mod price;
pub mod period;
pub mod moving_average;
pub mod signal;
pub mod portfolio;
pub mod performance;
pub mod backtest;
pub mod run;
pub mod config_validation;
pub mod error;
