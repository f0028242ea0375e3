//! Report generation port trait.

use std::path::Path;

use crate::domain::backtest::{BacktestResult, BacktestSummary};
use crate::domain::error::AxiomError;

/// Port for writing backtest reports.
pub trait ReportPort {
    fn write(
        &self,
        result: &BacktestResult,
        summary: &BacktestSummary,
        output: &Path,
    ) -> Result<(), AxiomError>;
}
