//! Demo server for "Login with Mail.Ru"

mod app;

use anyhow::Result;
use clap::Parser;
use mailru_auth::observability::{self, LogFormat, ObservabilityConfig};
use mailru_auth::prelude::*;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mailru-auth-server")]
#[command(version)]
#[command(about = "Demo server for Login with Mail.Ru", long_about = None)]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "MAILRU_BIND", default_value = "127.0.0.1:3000")]
    bind: SocketAddr,

    /// Configuration file (defaults to the standard search path)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Service name used for the system config path and logs
    #[arg(long, default_value = "mailru-auth")]
    service: String,

    /// Enable debug logging for mailru-auth
    #[arg(long, short)]
    verbose: bool,

    /// Log output: pretty, compact or json (defaults by build profile)
    #[arg(long, env = "MAILRU_LOG_FORMAT")]
    log_format: Option<LogFormat>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut observability_config = ObservabilityConfig::new(cli.service.clone());
    if cli.verbose {
        observability_config = observability_config.with_verbose();
    }
    if let Some(format) = cli.log_format {
        observability_config = observability_config.with_format(format);
    }
    observability::init_with(&observability_config)?;

    let config = match &cli.config {
        Some(path) => MailruConfig::load_from(path)?,
        None => MailruConfig::load_for_service(&cli.service)?,
    };
    tracing::debug!(?config, "Configuration loaded");

    let sessions = SessionLayer::with_config(MemorySessionStore::new(), config.session.clone());
    let app = app::build(MailruAuth::new(config), sessions)?;

    let listener = tokio::net::TcpListener::bind(cli.bind).await?;
    tracing::info!(address = %cli.bind, "Listening");
    axum::serve(listener, app).await?;

    Ok(())
}
