use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use token_keeper::config::loader::load_config;
use token_keeper::keeper::TokenKeeper;
use token_keeper::observability::metrics::get_metrics;
use token_keeper::observability::routes::MetricsState;
use token_keeper::provider::http::HttpProvider;
use token_keeper::utils::constants::{CHECK_INTERVAL_SECONDS, REFRESH_BUFFER_SECONDS};
use token_keeper::utils::logging;
use token_keeper::utils::logging::LogLevel;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "token-keeper.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config, init logging
    // -------------------------------

    let args = Args::parse();
    let service_config = load_config(&args.config)?;
    let logging_config = logging::resolve(service_config.settings.logging.as_ref(), args.log_level);
    logging::init_logging(&logging_config);

    // -------------------------------
    // 2. Build identity provider and keeper
    // -------------------------------

    let provider = Arc::new(HttpProvider::new(service_config.provider.clone())?);
    provider.mark_ready();

    let buffer_seconds = service_config
        .settings
        .refresh_buffer_seconds
        .unwrap_or(REFRESH_BUFFER_SECONDS);
    let check_interval_seconds = service_config
        .settings
        .check_interval_seconds
        .unwrap_or(CHECK_INTERVAL_SECONDS);

    let keeper = TokenKeeper::new(provider, buffer_seconds, check_interval_seconds);
    keeper.start().await;

    // -------------------------------
    // 3. Serve /metrics
    // -------------------------------

    let metrics = get_metrics().await;
    let metrics_state = MetricsState::new(metrics.registry.clone());
    let router = metrics_state.router(&service_config.settings.metrics);

    let addr = format!(
        "{}:{}",
        service_config.settings.server.host, service_config.settings.server.port
    );
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let server = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!("metrics server failed: {}", e);
        }
    });
    info!("Service starting on {} ...", addr);

    // -------------------------------
    // 4. Run until ctrl-c, then tear down
    // -------------------------------

    tokio::signal::ctrl_c().await?;
    keeper.shutdown().await;
    server.abort();

    Ok(())
}
