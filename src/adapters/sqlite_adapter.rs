//! SQLite storage adapter.

use crate::domain::backtest::BacktestSummary;
use crate::domain::error::AxiomError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::price::{PricePoint, PriceSeries};
use crate::domain::run::{BacktestRequest, BacktestRun, RunStatus};
use crate::ports::config_port::ConfigPort;
use crate::ports::price_port::PricePort;
use crate::ports::store_port::{BarStore, RunStore};
use chrono::NaiveDate;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

fn query_err(e: rusqlite::Error) -> AxiomError {
    AxiomError::DatabaseQuery {
        reason: e.to_string(),
    }
}

fn parse_date(text: &str) -> Result<NaiveDate, AxiomError> {
    NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|e| AxiomError::Database {
        reason: format!("bad stored date {text:?}: {e}"),
    })
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, AxiomError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| AxiomError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        let pool_size = config.get_int("sqlite", "pool_size", 4).max(1) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool =
            Pool::builder()
                .max_size(pool_size)
                .build(manager)
                .map_err(|e: r2d2::Error| AxiomError::Database {
                    reason: e.to_string(),
                })?;

        Ok(Self { pool })
    }

    /// Single-connection in-memory database, so every checkout sees the same data.
    pub fn in_memory() -> Result<Self, AxiomError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| AxiomError::Database {
                reason: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, AxiomError> {
        self.pool
            .get()
            .map_err(|e: r2d2::Error| AxiomError::Database {
                reason: e.to_string(),
            })
    }

    pub fn initialize_schema(&self) -> Result<(), AxiomError> {
        let conn = self.conn()?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS historical_market_data (
                trade_date TEXT NOT NULL,
                ticker TEXT NOT NULL,
                open_price REAL NOT NULL,
                high_price REAL NOT NULL,
                low_price REAL NOT NULL,
                close_price REAL NOT NULL,
                volume INTEGER NOT NULL,
                PRIMARY KEY (ticker, trade_date)
            );
            CREATE INDEX IF NOT EXISTS idx_market_data_trade_date
                ON historical_market_data(trade_date);
            CREATE TABLE IF NOT EXISTS backtest_results (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ticker TEXT NOT NULL,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                short_window INTEGER NOT NULL,
                long_window INTEGER NOT NULL,
                status TEXT NOT NULL,
                sharpe_ratio REAL,
                trade_count INTEGER,
                final_portfolio_value REAL
            );",
        )
        .map_err(query_err)?;

        Ok(())
    }

    fn set_status(
        &self,
        id: i64,
        status: RunStatus,
        summary: Option<&BacktestSummary>,
    ) -> Result<(), AxiomError> {
        let conn = self.conn()?;
        let changed = conn
            .execute(
                "UPDATE backtest_results
                 SET status = ?1, sharpe_ratio = ?2, trade_count = ?3, final_portfolio_value = ?4
                 WHERE id = ?5",
                params![
                    status.to_string(),
                    summary.map(|s| s.sharpe_ratio),
                    summary.map(|s| s.trade_count as i64),
                    summary.map(|s| s.final_portfolio_value),
                    id
                ],
            )
            .map_err(query_err)?;

        if changed == 0 {
            return Err(AxiomError::RunNotFound { id });
        }
        Ok(())
    }
}

impl PricePort for SqliteAdapter {
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, AxiomError> {
        let conn = self.conn()?;

        let start_str = start_date.format(DATE_FORMAT).to_string();
        let end_str = end_date.format(DATE_FORMAT).to_string();

        let mut stmt = conn
            .prepare(
                "SELECT trade_date, close_price
                 FROM historical_market_data
                 WHERE ticker = ?1 AND trade_date >= ?2 AND trade_date <= ?3
                 ORDER BY trade_date ASC",
            )
            .map_err(query_err)?;

        let rows = stmt
            .query_map(params![ticker, start_str, end_str], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
            })
            .map_err(query_err)?;

        let mut points = Vec::new();
        for row in rows {
            let (date_str, close) = row.map_err(query_err)?;
            points.push(PricePoint::new(parse_date(&date_str)?, close));
        }

        PriceSeries::new(points)
    }

    fn list_tickers(&self) -> Result<Vec<String>, AxiomError> {
        let conn = self.conn()?;

        let mut stmt = conn
            .prepare("SELECT DISTINCT ticker FROM historical_market_data ORDER BY ticker")
            .map_err(query_err)?;

        let rows = stmt.query_map([], |row| row.get(0)).map_err(query_err)?;

        let mut tickers = Vec::new();
        for row in rows {
            tickers.push(row.map_err(query_err)?);
        }

        Ok(tickers)
    }

    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, AxiomError> {
        let conn = self.conn()?;

        let result: (Option<String>, Option<String>, i64) = conn
            .query_row(
                "SELECT MIN(trade_date), MAX(trade_date), COUNT(*)
                 FROM historical_market_data WHERE ticker = ?1",
                params![ticker],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .map_err(query_err)?;

        match result {
            (Some(min_str), Some(max_str), count) if count > 0 => Ok(Some((
                parse_date(&min_str)?,
                parse_date(&max_str)?,
                count as usize,
            ))),
            _ => Ok(None),
        }
    }
}

impl BarStore for SqliteAdapter {
    fn insert_bars(&self, bars: &[OhlcvBar]) -> Result<usize, AxiomError> {
        if bars.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_err)?;

        for bar in bars {
            tx.execute(
                "INSERT OR REPLACE INTO historical_market_data
                 (trade_date, ticker, open_price, high_price, low_price, close_price, volume)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    bar.date.format(DATE_FORMAT).to_string(),
                    bar.ticker,
                    bar.open,
                    bar.high,
                    bar.low,
                    bar.close,
                    bar.volume
                ],
            )
            .map_err(query_err)?;
        }

        tx.commit().map_err(query_err)?;

        Ok(bars.len())
    }
}

impl RunStore for SqliteAdapter {
    fn create_run(&self, request: &BacktestRequest) -> Result<i64, AxiomError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO backtest_results
             (ticker, start_date, end_date, short_window, long_window, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                request.ticker,
                request.start_date.format(DATE_FORMAT).to_string(),
                request.end_date.format(DATE_FORMAT).to_string(),
                request.short_window,
                request.long_window,
                RunStatus::Pending.to_string()
            ],
        )
        .map_err(query_err)?;

        Ok(conn.last_insert_rowid())
    }

    fn complete_run(&self, id: i64, summary: &BacktestSummary) -> Result<(), AxiomError> {
        self.set_status(id, RunStatus::Completed, Some(summary))
    }

    fn fail_run(&self, id: i64) -> Result<(), AxiomError> {
        self.set_status(id, RunStatus::Failed, None)
    }

    fn get_run(&self, id: i64) -> Result<Option<BacktestRun>, AxiomError> {
        let conn = self.conn()?;

        type Row = (
            i64,
            String,
            String,
            String,
            i64,
            i64,
            String,
            Option<f64>,
            Option<i64>,
            Option<f64>,
        );

        let row: Option<Row> = conn
            .query_row(
                "SELECT id, ticker, start_date, end_date, short_window, long_window,
                        status, sharpe_ratio, trade_count, final_portfolio_value
                 FROM backtest_results WHERE id = ?1",
                params![id],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                        row.get(6)?,
                        row.get(7)?,
                        row.get(8)?,
                        row.get(9)?,
                    ))
                },
            )
            .optional()
            .map_err(query_err)?;

        let Some((
            id,
            ticker,
            start,
            end,
            short_window,
            long_window,
            status,
            sharpe_ratio,
            trade_count,
            final_portfolio_value,
        )) = row
        else {
            return Ok(None);
        };

        Ok(Some(BacktestRun {
            id,
            ticker,
            start_date: parse_date(&start)?,
            end_date: parse_date(&end)?,
            short_window,
            long_window,
            status: status.parse()?,
            sharpe_ratio,
            trade_count,
            final_portfolio_value,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bar(ticker: &str, day: u32, close: f64) -> OhlcvBar {
        OhlcvBar {
            ticker: ticker.to_string(),
            date: date(2024, 1, day),
            open: close - 0.5,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000,
        }
    }

    fn store() -> SqliteAdapter {
        let adapter = SqliteAdapter::in_memory().unwrap();
        adapter.initialize_schema().unwrap();
        adapter
    }

    fn request() -> BacktestRequest {
        BacktestRequest {
            short_window: 5,
            long_window: 10,
            ..BacktestRequest::new("AAPL", date(2024, 1, 1), date(2024, 3, 1))
        }
    }

    #[test]
    fn from_config_missing_path() {
        let config = FileConfigAdapter::empty();
        let result = SqliteAdapter::from_config(&config);
        match result {
            Err(AxiomError::ConfigMissing { section, key }) => {
                assert_eq!(section, "sqlite");
                assert_eq!(key, "path");
            }
            Err(other) => panic!("expected ConfigMissing, got: {other}"),
            Ok(_) => panic!("expected error, got Ok"),
        }
    }

    #[test]
    fn schema_initialization_is_repeatable() {
        let adapter = store();
        adapter.initialize_schema().unwrap();
    }

    #[test]
    fn fetch_prices_returns_ordered_closes_in_range() {
        let adapter = store();
        adapter
            .insert_bars(&[bar("AAPL", 3, 12.0), bar("AAPL", 1, 10.0), bar("AAPL", 2, 11.0)])
            .unwrap();

        let series = adapter
            .fetch_prices("AAPL", date(2024, 1, 2), date(2024, 1, 3))
            .unwrap();
        let closes: Vec<f64> = series.iter().map(|p| p.close).collect();
        assert_eq!(closes, vec![11.0, 12.0]);
        assert_eq!(series.points()[0].date, date(2024, 1, 2));
    }

    #[test]
    fn fetch_prices_unknown_ticker_is_empty() {
        let adapter = store();
        let series = adapter
            .fetch_prices("NOPE", date(2024, 1, 1), date(2024, 12, 31))
            .unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn insert_bars_upserts_on_ticker_and_date() {
        let adapter = store();
        assert_eq!(adapter.insert_bars(&[bar("AAPL", 1, 10.0)]).unwrap(), 1);
        assert_eq!(adapter.insert_bars(&[bar("AAPL", 1, 20.0)]).unwrap(), 1);

        let series = adapter
            .fetch_prices("AAPL", date(2024, 1, 1), date(2024, 1, 1))
            .unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.points()[0].close, 20.0);
    }

    #[test]
    fn insert_empty_slice_writes_nothing() {
        let adapter = store();
        assert_eq!(adapter.insert_bars(&[]).unwrap(), 0);
        assert!(adapter.list_tickers().unwrap().is_empty());
    }

    #[test]
    fn list_tickers_is_sorted_and_distinct() {
        let adapter = store();
        adapter
            .insert_bars(&[bar("MSFT", 1, 1.0), bar("AAPL", 1, 1.0), bar("AAPL", 2, 1.0)])
            .unwrap();
        assert_eq!(adapter.list_tickers().unwrap(), vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn data_range_reports_bounds() {
        let adapter = store();
        adapter
            .insert_bars(&[bar("AAPL", 1, 1.0), bar("AAPL", 5, 2.0)])
            .unwrap();
        assert_eq!(
            adapter.get_data_range("AAPL").unwrap(),
            Some((date(2024, 1, 1), date(2024, 1, 5), 2))
        );
        assert!(adapter.get_data_range("MSFT").unwrap().is_none());
    }

    #[test]
    fn run_lifecycle_completed() {
        let adapter = store();
        let id = adapter.create_run(&request()).unwrap();

        let pending = adapter.get_run(id).unwrap().unwrap();
        assert_eq!(pending.status, RunStatus::Pending);
        assert_eq!(pending.ticker, "AAPL");
        assert_eq!(pending.short_window, 5);
        assert_eq!(pending.sharpe_ratio, None);

        let summary = BacktestSummary {
            sharpe_ratio: 1.25,
            trade_count: 2,
            final_portfolio_value: 100_002.0,
        };
        adapter.complete_run(id, &summary).unwrap();

        let done = adapter.get_run(id).unwrap().unwrap();
        assert_eq!(done.status, RunStatus::Completed);
        assert_eq!(done.sharpe_ratio, Some(1.25));
        assert_eq!(done.trade_count, Some(2));
        assert_eq!(done.final_portfolio_value, Some(100_002.0));
    }

    #[test]
    fn run_lifecycle_failed() {
        let adapter = store();
        let id = adapter.create_run(&request()).unwrap();
        adapter.fail_run(id).unwrap();

        let run = adapter.get_run(id).unwrap().unwrap();
        assert_eq!(run.status, RunStatus::Failed);
        assert_eq!(run.trade_count, None);
    }

    #[test]
    fn run_ids_are_distinct() {
        let adapter = store();
        let a = adapter.create_run(&request()).unwrap();
        let b = adapter.create_run(&request()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn missing_run() {
        let adapter = store();
        assert!(adapter.get_run(42).unwrap().is_none());
        assert!(matches!(
            adapter.fail_run(42),
            Err(AxiomError::RunNotFound { id: 42 })
        ));
    }
}
