use std::net::SocketAddr;

use {anyhow::Context, clap::Parser, tracing::info};

use meridian_gateway::{config::Config, routes, state::AppState, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    telemetry::init(&config.log_level, config.json_logs);

    let state = AppState::from_config(&config)?;
    let router = routes::router(state);

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    info!(addr = %config.listen_addr, env = %config.environment, "gateway listening");

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("serving")
}
