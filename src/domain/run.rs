//! Backtest run requests and their persisted records.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use super::backtest::{BacktestConfig, DEFAULT_LONG_WINDOW, DEFAULT_SHORT_WINDOW};
use super::error::AxiomError;
use super::moving_average::window_from_i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Pending,
    Completed,
    Failed,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Pending => write!(f, "PENDING"),
            RunStatus::Completed => write!(f, "COMPLETED"),
            RunStatus::Failed => write!(f, "FAILED"),
        }
    }
}

impl FromStr for RunStatus {
    type Err = AxiomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(RunStatus::Pending),
            "COMPLETED" => Ok(RunStatus::Completed),
            "FAILED" => Ok(RunStatus::Failed),
            other => Err(AxiomError::DatabaseQuery {
                reason: format!("unknown run status: {other}"),
            }),
        }
    }
}

/// Parameters of a single backtest run. Windows stay signed here because they
/// arrive from config files and request bodies; `to_config` validates them.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestRequest {
    pub ticker: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub short_window: i64,
    pub long_window: i64,
}

impl BacktestRequest {
    pub fn new(ticker: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        BacktestRequest {
            ticker: ticker.into(),
            start_date,
            end_date,
            short_window: DEFAULT_SHORT_WINDOW as i64,
            long_window: DEFAULT_LONG_WINDOW as i64,
        }
    }

    /// Validated config for this request; capital and risk-free rate use defaults.
    pub fn to_config(&self) -> Result<BacktestConfig, AxiomError> {
        Ok(BacktestConfig {
            short_window: window_from_i64(self.short_window)?,
            long_window: window_from_i64(self.long_window)?,
            ..BacktestConfig::default()
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestRun {
    pub id: i64,
    pub ticker: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub short_window: i64,
    pub long_window: i64,
    pub status: RunStatus,
    pub sharpe_ratio: Option<f64>,
    pub trade_count: Option<i64>,
    pub final_portfolio_value: Option<f64>,
}
