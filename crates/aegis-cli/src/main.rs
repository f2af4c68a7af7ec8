//! Aegis CLI - redact, classify and watch email messages.

use aegis_cli::commands;
use aegis_cli::config;
use aegis_cli::{Cli, Command, Formatter};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> aegis_cli::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = config::load(cli.config.as_deref())?;
    let config = config::apply_overrides(config, cli.endpoint, cli.always_show)?;
    let formatter = Formatter::new(cli.format, !cli.no_color);

    match cli.command {
        Command::Redact(args) => commands::execute_redact(args, &formatter)?,
        Command::Analyze(args) => commands::execute_analyze(args, &config, &formatter).await?,
        Command::Watch(args) => commands::execute_watch(args, config, &formatter).await?,
        Command::Config => commands::execute_config(&config, &formatter)?,
    }

    Ok(())
}

/// Log to stderr; RUST_LOG wins unless -v asks for debug
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}
