use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;
use viewer::ViewerConfig;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Stdout carries frames; diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = ViewerConfig::parse();
    match viewer::host::run(config).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "viewer failed");
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
