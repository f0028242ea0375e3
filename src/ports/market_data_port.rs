//! External market data source port trait.

use crate::domain::error::AxiomError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::period::Period;

pub trait MarketDataPort {
    /// Daily bars for every ticker over the lookback period. Rows with a
    /// missing field are dropped; an empty ticker list returns no bars.
    fn fetch_market_data(
        &self,
        tickers: &[String],
        period: Period,
    ) -> Result<Vec<OhlcvBar>, AxiomError>;
}
