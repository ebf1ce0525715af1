use anyhow::Context;
use capital_gains::{config::Config, driver};
use std::io;

fn main() {
    // Logs go to stderr; stdout carries only result lines.
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    driver::run(stdin.lock(), stdout.lock(), &config).context("failed to process input")?;

    Ok(())
}
