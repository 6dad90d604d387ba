//! tcactl
//!
//! Command line client for VMware Telco Cloud Automation. Connection settings come
//! from flags or the TCA_* environment variables; the process exit code identifies
//! the failure kind.

mod cli;
mod commands;
mod config;
mod output;

use clap::Parser;
use std::process::ExitCode;
use tca_client::TcaError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::Cli;

/// Exit status for a failed command: the library error's code when there is one
/// in the chain, else 1
fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<TcaError>())
        .and_then(|tca| u8::try_from(tca.exit_code()).ok())
        .unwrap_or(1)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match commands::run(cli).await {
        Ok(out) => {
            if !out.is_empty() {
                println!("{}", out);
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}
