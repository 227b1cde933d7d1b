use std::{net::SocketAddr, sync::Arc, time::Duration};

use agrimarket::{
    config,
    routes,
    services::{alert_monitor, storage::FileStore},
    AppState,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = config::load();

    let store = Arc::new(FileStore::open(&settings.data_dir)?);
    tracing::info!("data directory: {}", settings.data_dir);

    let (state, triggers) = AppState::build(settings.clone(), store)?;

    state.dispatcher.spawn_listener();
    alert_monitor::spawn_price_alert_monitor(
        state.monitor.clone(),
        triggers,
        Duration::from_secs(settings.poll_interval_secs),
    );

    let app = routes::app(state);

    let addr = SocketAddr::from((settings.host.parse::<std::net::IpAddr>()?, settings.port));
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
