//! CSV file data adapter.
//!
//! Reads one `<TICKER>.csv` per ticker from a directory, in the usual daily
//! download layout: `Date,Open,High,Low,Close[,Adj Close],Volume`. Columns are
//! located by header name; rows with an empty or `null` field are skipped.

use crate::domain::error::AxiomError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::period::Period;
use crate::domain::price::PriceSeries;
use crate::ports::market_data_port::MarketDataPort;
use crate::ports::price_port::PricePort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use tracing::warn;

pub struct CsvAdapter {
    base_path: PathBuf,
}

struct Columns {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: usize,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, AxiomError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| AxiomError::MarketData {
                    reason: format!("missing {name} column"),
                })
        };
        Ok(Columns {
            date: find("date")?,
            open: find("open")?,
            high: find("high")?,
            low: find("low")?,
            close: find("close")?,
            volume: find("volume")?,
        })
    }
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }

    /// All complete bars in the ticker's file, sorted by date.
    pub fn read_bars(&self, ticker: &str) -> Result<Vec<OhlcvBar>, AxiomError> {
        let path = self.csv_path(ticker);
        let content = fs::read_to_string(&path).map_err(|e| AxiomError::MarketData {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| AxiomError::MarketData {
            reason: format!("CSV header error in {}: {}", path.display(), e),
        })?;
        let columns = Columns::from_headers(headers)?;

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| AxiomError::MarketData {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(columns.date).unwrap_or_default().trim();
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                AxiomError::MarketData {
                    reason: format!("invalid date {:?}: {}", date_str, e),
                }
            })?;

            let field = |idx: usize| -> Option<f64> {
                record
                    .get(idx)
                    .map(str::trim)
                    .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("null"))
                    .and_then(|s| s.parse::<f64>().ok())
            };

            let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = (
                field(columns.open),
                field(columns.high),
                field(columns.low),
                field(columns.close),
                field(columns.volume),
            ) else {
                continue;
            };

            let bar = OhlcvBar {
                ticker: ticker.to_string(),
                date,
                open,
                high,
                low,
                close,
                volume: volume as i64,
            };
            if bar.is_complete() {
                bars.push(bar);
            }
        }

        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        Ok(bars)
    }
}

impl PricePort for CsvAdapter {
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, AxiomError> {
        if !self.csv_path(ticker).exists() {
            return Ok(PriceSeries::empty());
        }
        let bars: Vec<OhlcvBar> = self
            .read_bars(ticker)?
            .into_iter()
            .filter(|b| b.date >= start_date && b.date <= end_date)
            .collect();
        PriceSeries::from_bars(&bars)
    }

    fn list_tickers(&self) -> Result<Vec<String>, AxiomError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| AxiomError::MarketData {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut tickers = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| AxiomError::MarketData {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(ticker) = name_str.strip_suffix(".csv") {
                tickers.push(ticker.to_string());
            }
        }

        tickers.sort();
        Ok(tickers)
    }

    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, AxiomError> {
        if !self.csv_path(ticker).exists() {
            return Ok(None);
        }
        let bars = self.read_bars(ticker)?;
        Ok(match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date, bars.len())),
            _ => None,
        })
    }
}

impl MarketDataPort for CsvAdapter {
    fn fetch_market_data(
        &self,
        tickers: &[String],
        period: Period,
    ) -> Result<Vec<OhlcvBar>, AxiomError> {
        let mut all = Vec::new();
        for ticker in tickers {
            if !self.csv_path(ticker).exists() {
                warn!(ticker = %ticker, "no CSV file for ticker, skipping");
                continue;
            }
            let bars = self.read_bars(ticker)?;
            let start = bars
                .last()
                .and_then(|last| period.start_date(last.date));
            all.extend(
                bars.into_iter()
                    .filter(|b| start.is_none_or(|s| b.date >= s)),
            );
        }
        Ok(all)
    }
}
