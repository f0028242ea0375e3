//! CSV report adapter implementing ReportPort.
//!
//! Writes `trades.csv`, `portfolio.csv` and `summary.csv` into the output
//! directory, creating it if needed.

use std::fs;
use std::path::Path;

use crate::domain::backtest::{BacktestResult, BacktestSummary};
use crate::domain::error::AxiomError;
use crate::ports::report_port::ReportPort;

pub const TRADES_FILE: &str = "trades.csv";
pub const PORTFOLIO_FILE: &str = "portfolio.csv";
pub const SUMMARY_FILE: &str = "summary.csv";

pub struct CsvReportAdapter;

fn csv_err(e: csv::Error) -> AxiomError {
    AxiomError::Io(std::io::Error::other(e))
}

impl CsvReportAdapter {
    fn write_trades(result: &BacktestResult, path: &Path) -> Result<(), AxiomError> {
        let mut wtr = csv::Writer::from_path(path).map_err(csv_err)?;
        wtr.write_record(["date", "action", "price"]).map_err(csv_err)?;
        for trade in result.trades() {
            wtr.write_record([
                trade.date.format("%Y-%m-%d").to_string(),
                trade.action.to_string(),
                trade.price.to_string(),
            ])
            .map_err(csv_err)?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_portfolio(result: &BacktestResult, path: &Path) -> Result<(), AxiomError> {
        let mut wtr = csv::Writer::from_path(path).map_err(csv_err)?;
        wtr.write_record(["date", "position", "price", "holdings", "cash", "total"])
            .map_err(csv_err)?;
        for snapshot in result.portfolio() {
            wtr.write_record([
                snapshot.date.format("%Y-%m-%d").to_string(),
                snapshot.position.units().to_string(),
                snapshot.price.to_string(),
                snapshot.holdings.to_string(),
                snapshot.cash.to_string(),
                snapshot.total.to_string(),
            ])
            .map_err(csv_err)?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_summary(summary: &BacktestSummary, path: &Path) -> Result<(), AxiomError> {
        let mut wtr = csv::Writer::from_path(path).map_err(csv_err)?;
        wtr.write_record(["metric", "value"]).map_err(csv_err)?;
        wtr.write_record(["sharpe_ratio", &summary.sharpe_ratio.to_string()])
            .map_err(csv_err)?;
        wtr.write_record(["trade_count", &summary.trade_count.to_string()])
            .map_err(csv_err)?;
        wtr.write_record([
            "final_portfolio_value",
            &summary.final_portfolio_value.to_string(),
        ])
        .map_err(csv_err)?;
        wtr.flush()?;
        Ok(())
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        summary: &BacktestSummary,
        output: &Path,
    ) -> Result<(), AxiomError> {
        fs::create_dir_all(output)?;
        Self::write_trades(result, &output.join(TRADES_FILE))?;
        Self::write_portfolio(result, &output.join(PORTFOLIO_FILE))?;
        Self::write_summary(summary, &output.join(SUMMARY_FILE))?;
        Ok(())
    }
}
