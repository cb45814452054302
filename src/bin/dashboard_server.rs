use std::{net::SocketAddr, sync::Arc};

use dynasty::{
    api_config_from_env, dashboard_router, init_logging, log_app_bind, log_app_start,
    log_source_selected, logging_config_from_env, timezone_from_env, ApiClient, DashboardSession,
    SessionClock,
};
use tracing::warn;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logging_cfg = logging_config_from_env();
    init_logging(&logging_cfg)?;
    let timezone = timezone_from_env();
    log_app_start(&logging_cfg, timezone);

    let addr: SocketAddr = std::env::var("DYNASTY_DASHBOARD_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
        .parse()?;

    let api_cfg = api_config_from_env();
    let source = if api_cfg.is_configured() {
        "live_api"
    } else {
        "static_index"
    };
    log_source_selected(source, &api_cfg);

    let client = Arc::new(ApiClient::from_config(api_cfg)?);
    let session = Arc::new(DashboardSession::new(
        Arc::clone(&client),
        SessionClock::System(timezone),
    ));

    // Warm the player directory so the first search is served locally.
    tokio::spawn(async move {
        if let Err(err) = client.get_player_index().await {
            warn!(
                component = "dashboard_server",
                event = "player_index.warmup_failed",
                error = %err
            );
        }
    });

    let app = dashboard_router(session);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    log_app_bind(bound_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
