//! Crossover backtest pipeline.
//!
//! BacktestConfig carries every parameter a run needs; nothing is read from
//! process state.

use super::error::AxiomError;
use super::performance::{daily_returns, sharpe_ratio};
use super::portfolio::{simulate_portfolio, PortfolioSnapshot, DEFAULT_INITIAL_CAPITAL};
use super::price::PriceSeries;
use super::signal::{generate_crossover_signal, Trade};

pub const DEFAULT_SHORT_WINDOW: usize = 50;
pub const DEFAULT_LONG_WINDOW: usize = 200;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub short_window: usize,
    pub long_window: usize,
    pub initial_capital: f64,
    pub risk_free_rate: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            short_window: DEFAULT_SHORT_WINDOW,
            long_window: DEFAULT_LONG_WINDOW,
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            risk_free_rate: 0.0,
        }
    }
}

/// Trade log plus portfolio valuation of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    trades: Vec<Trade>,
    portfolio: Vec<PortfolioSnapshot>,
}

impl BacktestResult {
    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn portfolio(&self) -> &[PortfolioSnapshot] {
        &self.portfolio
    }

    pub fn is_empty(&self) -> bool {
        self.portfolio.is_empty()
    }

    pub fn final_total(&self) -> Option<f64> {
        self.portfolio.last().map(|s| s.total)
    }

    pub fn daily_returns(&self) -> Vec<f64> {
        daily_returns(&self.portfolio)
    }
}

pub fn run_backtest(
    prices: &PriceSeries,
    config: &BacktestConfig,
) -> Result<BacktestResult, AxiomError> {
    let (signal, trades) =
        generate_crossover_signal(prices, config.short_window, config.long_window)?;
    let portfolio = simulate_portfolio(&signal, config.initial_capital);
    Ok(BacktestResult { trades, portfolio })
}

/// Scalar outcome of a run, as persisted alongside the run record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BacktestSummary {
    pub sharpe_ratio: f64,
    pub trade_count: usize,
    pub final_portfolio_value: f64,
}

impl BacktestSummary {
    /// An empty portfolio reports no trades, a zero Sharpe ratio and the
    /// untouched initial capital.
    pub fn from_result(result: &BacktestResult, config: &BacktestConfig) -> Self {
        match result.final_total() {
            None => BacktestSummary {
                sharpe_ratio: 0.0,
                trade_count: 0,
                final_portfolio_value: config.initial_capital,
            },
            Some(final_total) => BacktestSummary {
                sharpe_ratio: sharpe_ratio(&result.daily_returns(), config.risk_free_rate),
                trade_count: result.trades().len(),
                final_portfolio_value: final_total,
            },
        }
    }
}
