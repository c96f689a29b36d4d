use anyhow::{Context, Result};
use axum::http::Method;
use clap::Parser;
use hydrant_map::config::HydrantMapConfig;
use hydrant_map::controller::HydrantMapController;
use hydrant_map::services::hydrants::OverpassLoader;
use hydrant_map::services::settings::SettingsStore;
use hydrant_map::{cli, routes, state, static_assets};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::GovernorLayer;

const LIMITER_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

async fn bind_listener(addr: &str) -> Result<TcpListener> {
    match TcpListener::bind(addr).await {
        Ok(listener) => Ok(listener),
        Err(err) if err.kind() == std::io::ErrorKind::AddrInUse => anyhow::bail!(
            "hydrant-map cannot listen on {addr}: port already in use; pass --port to pick another one"
        ),
        Err(err) => Err(err).with_context(|| format!("hydrant-map cannot listen on {addr}")),
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {err:#}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = HydrantMapConfig::from_env(args.static_root)
        .context("failed to load hydrant-map configuration")?;

    let http = reqwest::Client::builder()
        .timeout(config.request_timeout())
        .build()
        .context("failed to build Overpass HTTP client")?;
    let loader = Arc::new(OverpassLoader::new(http, config.overpass_url.clone()));
    let settings = Arc::new(SettingsStore::file(config.settings_path.clone()));
    let controller = Arc::new(HydrantMapController::new(settings, config.commit_delay()));

    if args.skip_initial_load {
        tracing::info!("initial hydrant load skipped");
    } else {
        let controller = controller.clone();
        let loader = loader.clone();
        tokio::spawn(async move {
            controller.reload(&loader).await;
        });
    }

    // filter edits, commits and reloads are limited per peer IP; reads are not
    let rate_limit = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(20)
            .burst_size(60)
            .methods(vec![Method::POST, Method::PUT])
            .use_headers()
            .finish()
            .context("invalid rate limiter settings")?,
    );
    let limiter = rate_limit.limiter().clone();
    std::thread::spawn(move || loop {
        std::thread::sleep(LIMITER_CLEANUP_INTERVAL);
        limiter.retain_recent();
    });

    let app = routes::router(state::AppState { controller, loader })
        .layer(GovernorLayer::new(rate_limit))
        .fallback_service(static_assets::service(config.static_root.clone())?);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = bind_listener(&addr).await?;
    tracing::info!(
        %addr,
        overpass = %config.overpass_url,
        settings = %config.settings_path.display(),
        "hydrant-map listening"
    );
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("hydrant-map server failed")
}
