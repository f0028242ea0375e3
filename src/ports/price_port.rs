//! Price history access port trait.

use crate::domain::error::AxiomError;
use crate::domain::price::PriceSeries;
use chrono::NaiveDate;

pub trait PricePort {
    /// Close prices for `ticker` between `start_date` and `end_date` inclusive,
    /// ordered by date. A ticker without rows yields an empty series.
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, AxiomError>;

    fn list_tickers(&self) -> Result<Vec<String>, AxiomError>;

    /// First date, last date and row count for `ticker`.
    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, AxiomError>;
}
