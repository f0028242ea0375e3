//! Orchestration of backtest runs and ingestion over the ports.
//!
//! These functions sit between the entry points (CLI, HTTP) and the pure
//! domain core: they load data through ports, run the core, persist the
//! outcome and log what happened.

use chrono::NaiveDate;
use tracing::{error, info, warn};

use crate::domain::backtest::{run_backtest, BacktestConfig, BacktestResult, BacktestSummary};
use crate::domain::error::AxiomError;
use crate::domain::period::Period;
use crate::domain::run::{BacktestRequest, RunStatus};
use crate::ports::market_data_port::MarketDataPort;
use crate::ports::price_port::PricePort;
use crate::ports::store_port::{BarStore, RunStore};

/// Loads `ticker` prices for the date range and runs the crossover backtest.
/// A ticker without data yields an empty result, not an error.
pub fn backtest_ticker<P: PricePort + ?Sized>(
    prices: &P,
    ticker: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
    config: &BacktestConfig,
) -> Result<(BacktestResult, BacktestSummary), AxiomError> {
    let series = prices.fetch_prices(ticker, start_date, end_date)?;
    if series.is_empty() {
        warn!(ticker, %start_date, %end_date, "no prices in range");
    }

    let result = run_backtest(&series, config)?;
    let summary = BacktestSummary::from_result(&result, config);
    Ok((result, summary))
}

/// Runs a stored request to completion and records the outcome on the run row.
///
/// Any failure while loading prices or computing marks the run `FAILED`.
/// Only a failure to write the final status is returned as an error.
pub fn execute_run<S: PricePort + RunStore + ?Sized>(
    store: &S,
    run_id: i64,
    request: &BacktestRequest,
) -> Result<RunStatus, AxiomError> {
    info!(run_id, ticker = %request.ticker, "backtest run started");

    let outcome = request.to_config().and_then(|config| {
        backtest_ticker(
            store,
            &request.ticker,
            request.start_date,
            request.end_date,
            &config,
        )
    });

    match outcome {
        Ok((_, summary)) => {
            store.complete_run(run_id, &summary)?;
            info!(
                run_id,
                sharpe_ratio = summary.sharpe_ratio,
                trade_count = summary.trade_count,
                final_portfolio_value = summary.final_portfolio_value,
                "backtest run completed"
            );
            Ok(RunStatus::Completed)
        }
        Err(e) => {
            error!(run_id, error = %e, "backtest run failed");
            store.fail_run(run_id)?;
            Ok(RunStatus::Failed)
        }
    }
}

/// Fetches bars for `tickers` from `source` and upserts them into `store`.
/// Returns the number of bars written.
pub fn ingest<M, B>(
    source: &M,
    store: &B,
    tickers: &[String],
    period: Period,
) -> Result<usize, AxiomError>
where
    M: MarketDataPort + ?Sized,
    B: BarStore + ?Sized,
{
    if tickers.is_empty() {
        warn!("no tickers given, nothing to ingest");
        return Ok(0);
    }

    info!(tickers = ?tickers, %period, "starting data ingestion");
    let bars = source.fetch_market_data(tickers, period)?;
    if bars.is_empty() {
        warn!("source returned no bars");
        return Ok(0);
    }

    let written = store.insert_bars(&bars)?;
    info!(bars = written, "ingestion complete");
    Ok(written)
}
