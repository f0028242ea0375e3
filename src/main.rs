use clap::Parser;
use axiomquant::cli::{run, Cli};
use axiomquant::telemetry::init_tracing;

fn main() -> std::process::ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();
    run(Cli::parse())
}
