//! axiomquant: moving-average crossover backtesting.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`]. [`service`] wires ports to the
//! domain for the CLI and the HTTP API.

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod service;
pub mod telemetry;
pub mod cli;
