//! echoline binary: dispatches to the echo client or server driver.
//!
//! The drivers own all user-visible failure behavior: errors from the
//! core are printed here and turned into a nonzero exit code.

use echoline::config::{Config, Mode};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> std::process::ExitCode {
    // Load configuration
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("echoline: {e}");
            return std::process::ExitCode::FAILURE;
        }
    };

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let result = match config.mode.clone() {
        Mode::Client {
            host,
            service,
            nodelay,
        } => {
            info!(%host, %service, nodelay, "starting echo client");
            echoline::client::run(&host, &service, nodelay, config.max_line)
        }
        Mode::Server { service } => {
            info!(%service, "starting echo server");
            echoline::server::run(&service, config.max_line)
        }
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("echoline: {e}");
            std::process::ExitCode::FAILURE
        }
    }
}
