#![allow(dead_code)]

use axiomquant::domain::backtest::BacktestSummary;
use axiomquant::domain::error::AxiomError;
pub use axiomquant::domain::ohlcv::OhlcvBar;
use axiomquant::domain::price::{PricePoint, PriceSeries};
use axiomquant::domain::run::{BacktestRequest, BacktestRun, RunStatus};
use axiomquant::ports::price_port::PricePort;
use axiomquant::ports::store_port::{BarStore, RunStore};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

pub const REFERENCE_CLOSES: [f64; 20] = [
    10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 14.0, 13.0, 12.0, 11.0, 10.0, 9.0, 8.0, 9.0, 10.0, 11.0,
    12.0, 13.0, 14.0, 15.0,
];

#[derive(Default)]
struct MockState {
    bars: BTreeMap<(String, NaiveDate), OhlcvBar>,
    runs: BTreeMap<i64, BacktestRun>,
    next_id: i64,
}

/// In-memory store implementing every persistence port.
#[derive(Default)]
pub struct MockStore {
    state: Mutex<MockState>,
    pub errors: HashMap<String, String>,
    own_runtime: bool,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bars(self, bars: Vec<OhlcvBar>) -> Self {
        self.insert_bars(&bars).unwrap();
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }

    /// Drive a private runtime on every run call, the way synchronous
    /// database clients do. Panics if called from an async worker.
    pub fn with_own_runtime(mut self) -> Self {
        self.own_runtime = true;
        self
    }

    fn client_round_trip(&self) {
        if self.own_runtime {
            tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap()
                .block_on(async {});
        }
    }

    pub fn bar_count(&self) -> usize {
        self.state.lock().unwrap().bars.len()
    }

    fn check(&self, ticker: &str) -> Result<(), AxiomError> {
        match self.errors.get(ticker) {
            Some(reason) => Err(AxiomError::Database {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl PricePort for MockStore {
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, AxiomError> {
        self.check(ticker)?;
        let state = self.state.lock().unwrap();
        let points = state
            .bars
            .values()
            .filter(|b| b.ticker == ticker && b.date >= start_date && b.date <= end_date)
            .map(|b| PricePoint::new(b.date, b.close))
            .collect();
        PriceSeries::new(points)
    }

    fn list_tickers(&self) -> Result<Vec<String>, AxiomError> {
        let state = self.state.lock().unwrap();
        let mut tickers: Vec<String> = state.bars.keys().map(|(t, _)| t.clone()).collect();
        tickers.dedup();
        Ok(tickers)
    }

    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, AxiomError> {
        self.check(ticker)?;
        let state = self.state.lock().unwrap();
        let dates: Vec<NaiveDate> = state
            .bars
            .values()
            .filter(|b| b.ticker == ticker)
            .map(|b| b.date)
            .collect();
        Ok(match (dates.first(), dates.last()) {
            (Some(&first), Some(&last)) => Some((first, last, dates.len())),
            _ => None,
        })
    }
}

impl BarStore for MockStore {
    fn insert_bars(&self, bars: &[OhlcvBar]) -> Result<usize, AxiomError> {
        let mut state = self.state.lock().unwrap();
        for bar in bars {
            state
                .bars
                .insert((bar.ticker.clone(), bar.date), bar.clone());
        }
        Ok(bars.len())
    }
}

impl RunStore for MockStore {
    fn create_run(&self, request: &BacktestRequest) -> Result<i64, AxiomError> {
        self.client_round_trip();
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id;
        state.runs.insert(
            id,
            BacktestRun {
                id,
                ticker: request.ticker.clone(),
                start_date: request.start_date,
                end_date: request.end_date,
                short_window: request.short_window,
                long_window: request.long_window,
                status: RunStatus::Pending,
                sharpe_ratio: None,
                trade_count: None,
                final_portfolio_value: None,
            },
        );
        Ok(id)
    }

    fn complete_run(&self, id: i64, summary: &BacktestSummary) -> Result<(), AxiomError> {
        let mut state = self.state.lock().unwrap();
        let run = state
            .runs
            .get_mut(&id)
            .ok_or(AxiomError::RunNotFound { id })?;
        run.status = RunStatus::Completed;
        run.sharpe_ratio = Some(summary.sharpe_ratio);
        run.trade_count = Some(summary.trade_count as i64);
        run.final_portfolio_value = Some(summary.final_portfolio_value);
        Ok(())
    }

    fn fail_run(&self, id: i64) -> Result<(), AxiomError> {
        let mut state = self.state.lock().unwrap();
        let run = state
            .runs
            .get_mut(&id)
            .ok_or(AxiomError::RunNotFound { id })?;
        run.status = RunStatus::Failed;
        run.sharpe_ratio = None;
        run.trade_count = None;
        run.final_portfolio_value = None;
        Ok(())
    }

    fn get_run(&self, id: i64) -> Result<Option<BacktestRun>, AxiomError> {
        self.client_round_trip();
        Ok(self.state.lock().unwrap().runs.get(&id).cloned())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(ticker: &str, date: NaiveDate, close: f64) -> OhlcvBar {
    OhlcvBar {
        ticker: ticker.to_string(),
        date,
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000,
    }
}

/// One bar per consecutive calendar day starting at `start`.
pub fn make_bars(ticker: &str, start: NaiveDate, closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(ticker, start + chrono::Duration::days(i as i64), c))
        .collect()
}

pub fn make_prices(start: NaiveDate, closes: &[f64]) -> PriceSeries {
    PriceSeries::from_bars(&make_bars("TEST", start, closes)).unwrap()
}

pub fn reference_prices() -> PriceSeries {
    make_prices(date(2025, 1, 1), &REFERENCE_CLOSES)
}

/// Writes `<dir>/<ticker>.csv` in the usual daily download layout.
pub fn write_ticker_csv(dir: &std::path::Path, ticker: &str, bars: &[OhlcvBar]) {
    let mut content = String::from("Date,Open,High,Low,Close,Adj Close,Volume\n");
    for b in bars {
        content.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            b.date.format("%Y-%m-%d"),
            b.open,
            b.high,
            b.low,
            b.close,
            b.close,
            b.volume
        ));
    }
    std::fs::write(dir.join(format!("{ticker}.csv")), content).unwrap();
}
