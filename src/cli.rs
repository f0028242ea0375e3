//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{
    BacktestConfig, BacktestResult, BacktestSummary, DEFAULT_LONG_WINDOW, DEFAULT_SHORT_WINDOW,
};
use crate::domain::config_validation::{
    parse_optional_date, validate_backtest_config, validate_ingest_config,
};
use crate::domain::error::AxiomError;
use crate::domain::moving_average::window_from_i64;
use crate::domain::period::Period;
use crate::domain::portfolio::DEFAULT_INITIAL_CAPITAL;
use crate::ports::config_port::ConfigPort;
use crate::ports::market_data_port::MarketDataPort;
use crate::ports::price_port::PricePort;
use crate::ports::report_port::ReportPort;
use crate::ports::store_port::BacktestStore;
use crate::service;

pub const DEFAULT_LISTEN: &str = "127.0.0.1:8000";

#[derive(Parser, Debug)]
#[command(name = "axiomquant", about = "Moving-average crossover backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the database tables
    InitDb {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Fetch daily bars and store them
    Ingest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long, num_args = 1.., required = true)]
        tickers: Vec<String>,
        /// Lookback such as 1mo, 1y, 5y, ytd or max
        #[arg(long)]
        period: Option<Period>,
        /// csv or yahoo
        #[arg(long)]
        source: Option<String>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Run a crossover backtest for one ticker
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        ticker: String,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long)]
        short_window: Option<i64>,
        #[arg(long)]
        long_window: Option<i64>,
        /// Read prices from <DIR>/<TICKER>.csv instead of the database
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Directory for trades.csv, portfolio.csv and summary.csv
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List tickers with stored prices
    ListTickers {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the stored date range for a ticker
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        ticker: String,
    },
    /// Start the HTTP API
    Serve {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::InitDb { config } => run_init_db(&config),
        Command::Ingest {
            config,
            tickers,
            period,
            source,
            data_dir,
        } => run_ingest(&config, &tickers, period, source.as_deref(), data_dir),
        Command::Backtest {
            config,
            ticker,
            start,
            end,
            short_window,
            long_window,
            data_dir,
            output,
        } => run_backtest(
            &config,
            &BacktestArgs {
                ticker,
                start,
                end,
                short_window,
                long_window,
                data_dir,
                output,
            },
        ),
        Command::ListTickers { config } => run_list_tickers(&config),
        Command::Info { config, ticker } => run_info(&config, &ticker),
        Command::Serve { config } => run_serve(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, AxiomError> {
    info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path)
}

fn default_backend() -> &'static str {
    if cfg!(feature = "sqlite") {
        "sqlite"
    } else {
        "postgres"
    }
}

/// Opens the store named by `[database] backend` and makes sure its tables exist.
pub fn open_store(config: &dyn ConfigPort) -> Result<Arc<dyn BacktestStore>, AxiomError> {
    let backend = config
        .get_string("database", "backend")
        .unwrap_or_else(|| default_backend().to_string());

    match backend.as_str() {
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let adapter = crate::adapters::sqlite_adapter::SqliteAdapter::from_config(config)?;
            adapter.initialize_schema()?;
            Ok(Arc::new(adapter))
        }
        #[cfg(feature = "postgres")]
        "postgres" => {
            let adapter = crate::adapters::postgres_adapter::PostgresAdapter::from_config(config)?;
            adapter.initialize_schema()?;
            Ok(Arc::new(adapter))
        }
        other => Err(AxiomError::ConfigInvalid {
            section: "database".into(),
            key: "backend".into(),
            reason: format!("backend {other:?} is not available in this build"),
        }),
    }
}

/// Backtest parameters from `[backtest]`, with the library defaults for
/// anything not set.
pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, AxiomError> {
    validate_backtest_config(config)?;
    Ok(BacktestConfig {
        short_window: window_from_i64(config.get_int(
            "backtest",
            "short_window",
            DEFAULT_SHORT_WINDOW as i64,
        ))?,
        long_window: window_from_i64(config.get_int(
            "backtest",
            "long_window",
            DEFAULT_LONG_WINDOW as i64,
        ))?,
        initial_capital: config.get_double("backtest", "initial_capital", DEFAULT_INITIAL_CAPITAL),
        risk_free_rate: config.get_double("backtest", "risk_free_rate", 0.0),
    })
}

fn run_init_db(config_path: &Path) -> Result<(), AxiomError> {
    let config = load_config(config_path)?;
    open_store(&config)?;
    println!("Database schema initialized");
    Ok(())
}

/// Ingest source from `--source`, `[ingest] source`, or `csv` when a data
/// directory is known and `yahoo` otherwise.
pub fn build_market_data_source(
    config: &dyn ConfigPort,
    source: Option<&str>,
    data_dir: Option<PathBuf>,
) -> Result<Box<dyn MarketDataPort>, AxiomError> {
    let data_dir = data_dir.or_else(|| config.get_string("ingest", "data_dir").map(PathBuf::from));
    let source = source
        .map(str::to_string)
        .or_else(|| config.get_string("ingest", "source"))
        .unwrap_or_else(|| (if data_dir.is_some() { "csv" } else { "yahoo" }).to_string());

    match source.as_str() {
        "csv" => {
            let dir = data_dir.ok_or_else(|| AxiomError::ConfigMissing {
                section: "ingest".into(),
                key: "data_dir".into(),
            })?;
            Ok(Box::new(CsvAdapter::new(dir)))
        }
        #[cfg(feature = "yahoo")]
        "yahoo" => Ok(Box::new(crate::adapters::yahoo_adapter::YahooAdapter::new()?)),
        other => Err(AxiomError::ConfigInvalid {
            section: "ingest".into(),
            key: "source".into(),
            reason: format!("source {other:?} is not available in this build"),
        }),
    }
}

fn run_ingest(
    config_path: &Path,
    tickers: &[String],
    period: Option<Period>,
    source: Option<&str>,
    data_dir: Option<PathBuf>,
) -> Result<(), AxiomError> {
    let config = load_config(config_path)?;
    validate_ingest_config(&config)?;

    let period = match period {
        Some(p) => p,
        None => config
            .get_string("ingest", "period")
            .map(|p| p.parse::<Period>())
            .transpose()?
            .unwrap_or_default(),
    };
    let tickers: Vec<String> = tickers
        .iter()
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .collect();

    let source = build_market_data_source(&config, source, data_dir)?;
    let store = open_store(&config)?;
    let written = service::ingest(source.as_ref(), store.as_ref(), &tickers, period)?;

    println!("Stored {} bars for {} tickers", written, tickers.len());
    Ok(())
}

#[derive(Debug, Default)]
pub struct BacktestArgs {
    pub ticker: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub short_window: Option<i64>,
    pub long_window: Option<i64>,
    pub data_dir: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

/// Runs the backtest described by `args` and the config file, writing the
/// CSV report when an output directory is given.
pub fn execute_backtest(
    config: &dyn ConfigPort,
    args: &BacktestArgs,
) -> Result<(BacktestResult, BacktestSummary), AxiomError> {
    let mut bt_config = build_backtest_config(config)?;
    if let Some(w) = args.short_window {
        bt_config.short_window = window_from_i64(w)?;
    }
    if let Some(w) = args.long_window {
        bt_config.long_window = window_from_i64(w)?;
    }

    let start_date = match args.start {
        Some(d) => d,
        None => parse_optional_date(config, "start_date")?.ok_or_else(|| {
            AxiomError::ConfigMissing {
                section: "backtest".into(),
                key: "start_date".into(),
            }
        })?,
    };
    let end_date = match args.end {
        Some(d) => d,
        None => parse_optional_date(config, "end_date")?
            .unwrap_or_else(|| chrono::Local::now().date_naive()),
    };
    if start_date > end_date {
        return Err(AxiomError::invalid_argument(format!(
            "start date {start_date} is after end date {end_date}"
        )));
    }

    let ticker = args.ticker.trim().to_uppercase();
    let (result, summary) = match &args.data_dir {
        Some(dir) => service::backtest_ticker(
            &CsvAdapter::new(dir.clone()),
            &ticker,
            start_date,
            end_date,
            &bt_config,
        )?,
        None => {
            let store = open_store(config)?;
            service::backtest_ticker(store.as_ref(), &ticker, start_date, end_date, &bt_config)?
        }
    };

    if let Some(output) = &args.output {
        CsvReportAdapter.write(&result, &summary, output)?;
        info!(path = %output.display(), "report written");
    }

    Ok((result, summary))
}

fn run_backtest(config_path: &Path, args: &BacktestArgs) -> Result<(), AxiomError> {
    let config = load_config(config_path)?;
    let (result, summary) = execute_backtest(&config, args)?;

    println!("Ticker:                {}", args.ticker.trim().to_uppercase());
    println!("Trading days:          {}", result.portfolio().len());
    println!("Trades:                {}", summary.trade_count);
    for trade in result.trades() {
        println!("  {} {:<4} @ {:.2}", trade.date, trade.action, trade.price);
    }
    println!("Sharpe ratio:          {:.4}", summary.sharpe_ratio);
    println!("Final portfolio value: {:.2}", summary.final_portfolio_value);
    Ok(())
}

fn run_list_tickers(config_path: &Path) -> Result<(), AxiomError> {
    let config = load_config(config_path)?;
    let store = open_store(&config)?;
    let tickers = store.list_tickers()?;

    if tickers.is_empty() {
        eprintln!("No tickers found");
    } else {
        for ticker in &tickers {
            println!("{}", ticker);
        }
        eprintln!("{} tickers found", tickers.len());
    }
    Ok(())
}

fn run_info(config_path: &Path, ticker: &str) -> Result<(), AxiomError> {
    let config = load_config(config_path)?;
    let store = open_store(&config)?;
    let ticker = ticker.trim().to_uppercase();

    match store.get_data_range(&ticker)? {
        Some((first, last, count)) => {
            println!("{}: {} bars, {} to {}", ticker, count, first, last);
            Ok(())
        }
        None => Err(AxiomError::NoData { ticker }),
    }
}

#[cfg(any(feature = "web-sqlite", feature = "web-postgres"))]
fn run_serve(config_path: &Path) -> Result<(), AxiomError> {
    use crate::adapters::web::{AppState, build_router};
    use std::net::SocketAddr;

    let config = load_config(config_path)?;
    let store = open_store(&config)?;

    let listen = config
        .get_string("web", "listen")
        .unwrap_or_else(|| DEFAULT_LISTEN.to_string());
    let addr: SocketAddr = listen.parse().map_err(|_| AxiomError::ConfigInvalid {
        section: "web".into(),
        key: "listen".into(),
        reason: format!("{listen:?} is not a socket address"),
    })?;

    let router = build_router(AppState { store });
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(%addr, "web server listening");
        axum::serve(listener, router).await?;
        Ok::<(), AxiomError>(())
    })
}

#[cfg(not(any(feature = "web-sqlite", feature = "web-postgres")))]
fn run_serve(config_path: &Path) -> Result<(), AxiomError> {
    let _ = config_path;
    Err(AxiomError::invalid_argument(
        "web feature is required for serve",
    ))
}
