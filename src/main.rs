use anti_bruteforce::config::{Args, Config};
use anti_bruteforce::engine::AdmissionEngine;
use anti_bruteforce::routes;
use anti_bruteforce::state::AppState;
use anti_bruteforce::store::{self, MemoryStore};
use anti_bruteforce::telemetry;
use clap::Parser; // for cli
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // parse cli arguments, then the config file they point at
    let args = Args::parse();
    let mut cfg = Config::load(&args.config)?;
    cfg.apply_args(&args);

    telemetry::init(&cfg.logger)?;

    let store = Arc::new(MemoryStore::new());

    // spawn the background sweeper
    tokio::spawn(store::sweeper(Arc::clone(&store), cfg.store.sweep_interval()));

    let engine = AdmissionEngine::new(store, cfg.limiter).with_store_timeout(cfg.store.timeout());
    let state = Arc::new(AppState { engine });

    let app = routes::app(state);

    let addr = cfg.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        %addr,
        login_limit = cfg.limiter.n,
        password_limit = cfg.limiter.m,
        ip_limit = cfg.limiter.k,
        store_timeout = ?cfg.store.timeout(),
        "service started"
    );

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server is shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
