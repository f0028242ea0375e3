//! Concrete adapter implementations for ports.

#[cfg(feature = "postgres")]
pub mod postgres_adapter;
#[cfg(feature = "sqlite")]
pub mod sqlite_adapter;
#[cfg(any(feature = "web-sqlite", feature = "web-postgres"))]
pub mod web;
#[cfg(feature = "yahoo")]
pub mod yahoo_adapter;
pub mod csv_adapter;
pub mod csv_report_adapter;
pub mod file_config_adapter;
