//! Persistence port traits for market bars and backtest runs.

use crate::domain::backtest::BacktestSummary;
use crate::domain::error::AxiomError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::run::{BacktestRequest, BacktestRun};

use super::price_port::PricePort;

pub trait BarStore {
    /// Upserts bars keyed by (ticker, date) and returns the number written.
    fn insert_bars(&self, bars: &[OhlcvBar]) -> Result<usize, AxiomError>;
}

pub trait RunStore {
    /// Records a new run in `PENDING` state and returns its id.
    fn create_run(&self, request: &BacktestRequest) -> Result<i64, AxiomError>;

    fn complete_run(&self, id: i64, summary: &BacktestSummary) -> Result<(), AxiomError>;

    fn fail_run(&self, id: i64) -> Result<(), AxiomError>;

    fn get_run(&self, id: i64) -> Result<Option<BacktestRun>, AxiomError>;
}

/// A database that serves prices and stores bars and runs.
pub trait BacktestStore: PricePort + BarStore + RunStore + Send + Sync {}

impl<T> BacktestStore for T where T: PricePort + BarStore + RunStore + Send + Sync {}
