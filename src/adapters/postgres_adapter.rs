//! PostgreSQL storage adapter.

use crate::domain::backtest::BacktestSummary;
use crate::domain::error::AxiomError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::price::{PricePoint, PriceSeries};
use crate::domain::run::{BacktestRequest, BacktestRun, RunStatus};
use crate::ports::config_port::ConfigPort;
use crate::ports::price_port::PricePort;
use crate::ports::store_port::{BarStore, RunStore};
use chrono::NaiveDate;
use postgres::NoTls;
use r2d2::{Pool, PooledConnection};
use r2d2_postgres::PostgresConnectionManager;
use std::env;

type Manager = PostgresConnectionManager<NoTls>;

pub struct PostgresAdapter {
    pool: Pool<Manager>,
}

fn query_err(e: postgres::Error) -> AxiomError {
    AxiomError::DatabaseQuery {
        reason: e.to_string(),
    }
}

/// `[postgres] key`, falling back to the `POSTGRES_<KEY>` environment variable.
fn setting(config: &dyn ConfigPort, key: &str) -> Option<String> {
    config
        .get_string("postgres", key)
        .or_else(|| env::var(format!("POSTGRES_{}", key.to_uppercase())).ok())
        .filter(|v| !v.trim().is_empty())
}

/// Connection string from `[postgres] connection_string`, or assembled from
/// the individual host/port/user/password/dbname settings.
pub fn connection_string(config: &dyn ConfigPort) -> Result<String, AxiomError> {
    if let Some(conn) = setting(config, "connection_string") {
        return Ok(conn);
    }

    let required = |key: &str| {
        setting(config, key).ok_or_else(|| AxiomError::ConfigMissing {
            section: "postgres".into(),
            key: key.into(),
        })
    };

    let host = setting(config, "host").unwrap_or_else(|| "localhost".to_string());
    let port = setting(config, "port").unwrap_or_else(|| "5432".to_string());
    let user = required("user")?;
    let dbname = required("dbname")?;

    let mut conn = format!("host={host} port={port} user={user} dbname={dbname}");
    if let Some(password) = setting(config, "password") {
        conn.push_str(&format!(" password={password}"));
    }
    Ok(conn)
}

impl PostgresAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, AxiomError> {
        let conn_str = connection_string(config)?;
        let pg_config = conn_str
            .parse::<postgres::Config>()
            .map_err(|e| AxiomError::ConfigInvalid {
                section: "postgres".into(),
                key: "connection_string".into(),
                reason: e.to_string(),
            })?;

        let pool_size = config.get_int("postgres", "pool_size", 4).max(1) as u32;
        let manager = PostgresConnectionManager::new(pg_config, NoTls);
        let pool =
            Pool::builder()
                .max_size(pool_size)
                .build(manager)
                .map_err(|e: r2d2::Error| AxiomError::Database {
                    reason: e.to_string(),
                })?;

        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection<Manager>, AxiomError> {
        self.pool
            .get()
            .map_err(|e: r2d2::Error| AxiomError::Database {
                reason: e.to_string(),
            })
    }

    pub fn initialize_schema(&self) -> Result<(), AxiomError> {
        let mut conn = self.conn()?;
        conn.batch_execute(
            "CREATE TABLE IF NOT EXISTS historical_market_data (
                trade_date DATE NOT NULL,
                ticker VARCHAR(20) NOT NULL,
                open_price DOUBLE PRECISION NOT NULL,
                high_price DOUBLE PRECISION NOT NULL,
                low_price DOUBLE PRECISION NOT NULL,
                close_price DOUBLE PRECISION NOT NULL,
                volume BIGINT NOT NULL,
                PRIMARY KEY (ticker, trade_date)
            );
            CREATE INDEX IF NOT EXISTS idx_market_data_trade_date
                ON historical_market_data(trade_date);
            CREATE TABLE IF NOT EXISTS backtest_results (
                id BIGSERIAL PRIMARY KEY,
                ticker VARCHAR(20) NOT NULL,
                start_date DATE NOT NULL,
                end_date DATE NOT NULL,
                short_window BIGINT NOT NULL,
                long_window BIGINT NOT NULL,
                status VARCHAR(20) NOT NULL,
                sharpe_ratio DOUBLE PRECISION,
                trade_count BIGINT,
                final_portfolio_value DOUBLE PRECISION
            );",
        )
        .map_err(query_err)
    }

    fn set_status(
        &self,
        id: i64,
        status: RunStatus,
        summary: Option<&BacktestSummary>,
    ) -> Result<(), AxiomError> {
        let mut conn = self.conn()?;
        let changed = conn
            .execute(
                "UPDATE backtest_results
                 SET status = $1, sharpe_ratio = $2, trade_count = $3, final_portfolio_value = $4
                 WHERE id = $5",
                &[
                    &status.to_string(),
                    &summary.map(|s| s.sharpe_ratio),
                    &summary.map(|s| s.trade_count as i64),
                    &summary.map(|s| s.final_portfolio_value),
                    &id,
                ],
            )
            .map_err(query_err)?;

        if changed == 0 {
            return Err(AxiomError::RunNotFound { id });
        }
        Ok(())
    }
}

impl PricePort for PostgresAdapter {
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, AxiomError> {
        let mut conn = self.conn()?;
        let rows = conn
            .query(
                "SELECT trade_date, close_price
                 FROM historical_market_data
                 WHERE ticker = $1 AND trade_date >= $2 AND trade_date <= $3
                 ORDER BY trade_date ASC",
                &[&ticker, &start_date, &end_date],
            )
            .map_err(query_err)?;

        PriceSeries::new(
            rows.iter()
                .map(|row| PricePoint::new(row.get(0), row.get(1)))
                .collect(),
        )
    }

    fn list_tickers(&self) -> Result<Vec<String>, AxiomError> {
        let mut conn = self.conn()?;
        let rows = conn
            .query(
                "SELECT DISTINCT ticker FROM historical_market_data ORDER BY ticker",
                &[],
            )
            .map_err(query_err)?;

        Ok(rows.iter().map(|row| row.get(0)).collect())
    }

    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, AxiomError> {
        let mut conn = self.conn()?;
        let row = conn
            .query_one(
                "SELECT MIN(trade_date), MAX(trade_date), COUNT(*)
                 FROM historical_market_data WHERE ticker = $1",
                &[&ticker],
            )
            .map_err(query_err)?;

        let min: Option<NaiveDate> = row.get(0);
        let max: Option<NaiveDate> = row.get(1);
        let count: i64 = row.get(2);

        match (min, max) {
            (Some(min), Some(max)) if count > 0 => Ok(Some((min, max, count as usize))),
            _ => Ok(None),
        }
    }
}

impl BarStore for PostgresAdapter {
    fn insert_bars(&self, bars: &[OhlcvBar]) -> Result<usize, AxiomError> {
        if bars.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn()?;
        let mut tx = conn.transaction().map_err(query_err)?;
        let stmt = tx
            .prepare(
                "INSERT INTO historical_market_data
                 (trade_date, ticker, open_price, high_price, low_price, close_price, volume)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)
                 ON CONFLICT (ticker, trade_date) DO UPDATE SET
                    open_price = EXCLUDED.open_price,
                    high_price = EXCLUDED.high_price,
                    low_price = EXCLUDED.low_price,
                    close_price = EXCLUDED.close_price,
                    volume = EXCLUDED.volume",
            )
            .map_err(query_err)?;

        for bar in bars {
            tx.execute(
                &stmt,
                &[
                    &bar.date,
                    &bar.ticker,
                    &bar.open,
                    &bar.high,
                    &bar.low,
                    &bar.close,
                    &bar.volume,
                ],
            )
            .map_err(query_err)?;
        }

        tx.commit().map_err(query_err)?;
        Ok(bars.len())
    }
}

impl RunStore for PostgresAdapter {
    fn create_run(&self, request: &BacktestRequest) -> Result<i64, AxiomError> {
        let mut conn = self.conn()?;
        let row = conn
            .query_one(
                "INSERT INTO backtest_results
                 (ticker, start_date, end_date, short_window, long_window, status)
                 VALUES ($1, $2, $3, $4, $5, $6)
                 RETURNING id",
                &[
                    &request.ticker,
                    &request.start_date,
                    &request.end_date,
                    &request.short_window,
                    &request.long_window,
                    &RunStatus::Pending.to_string(),
                ],
            )
            .map_err(query_err)?;

        Ok(row.get(0))
    }

    fn complete_run(&self, id: i64, summary: &BacktestSummary) -> Result<(), AxiomError> {
        self.set_status(id, RunStatus::Completed, Some(summary))
    }

    fn fail_run(&self, id: i64) -> Result<(), AxiomError> {
        self.set_status(id, RunStatus::Failed, None)
    }

    fn get_run(&self, id: i64) -> Result<Option<BacktestRun>, AxiomError> {
        let mut conn = self.conn()?;
        let row = conn
            .query_opt(
                "SELECT id, ticker, start_date, end_date, short_window, long_window,
                        status, sharpe_ratio, trade_count, final_portfolio_value
                 FROM backtest_results WHERE id = $1",
                &[&id],
            )
            .map_err(query_err)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let status: String = row.get(6);
        Ok(Some(BacktestRun {
            id: row.get(0),
            ticker: row.get(1),
            start_date: row.get(2),
            end_date: row.get(3),
            short_window: row.get(4),
            long_window: row.get(5),
            status: status.parse()?,
            sharpe_ratio: row.get(7),
            trade_count: row.get(8),
            final_portfolio_value: row.get(9),
        }))
    }
}
