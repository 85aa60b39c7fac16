//! tubeaudio-server – entry point.
//!
//! Startup order:
//! 1. Parse configuration from environment variables.
//! 2. Initialise tracing (stdout + append-only log file).
//! 3. Build shared state around the `yt-dlp` fetcher.
//! 4. Build the Axum router and start the HTTP server with graceful shutdown.

mod config;
mod error;
mod logging;
mod middleware;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Configuration ───────────────────────────────────────────────────────
    let cfg = Config::from_env();

    // ── 2. Tracing ─────────────────────────────────────────────────────────────
    // Held for the whole process so the file writer flushes on exit.
    let _log_guard = logging::init(&cfg)?;

    info!(version = env!("CARGO_PKG_VERSION"), "tubeaudio-server starting");
    info!(
        temp_root = %cfg.temp_root.display(),
        ytdlp = %cfg.ytdlp_program.display(),
        cookies = %cfg.cookies_path.display(),
        timeout_secs = ?cfg.download_timeout.map(|d| d.as_secs()),
        trust_proxy = cfg.trust_proxy,
        "configuration loaded"
    );
    if !cfg.cookies_path.is_file() {
        warn!(path = %cfg.cookies_path.display(), "cookie file not found; downloads may fail");
    }

    // ── 3. Shared application state ────────────────────────────────────────────
    let addr: SocketAddr = cfg.bind_address.parse()?;
    let state = Arc::new(AppState::new(cfg));

    // ── 4. HTTP server with graceful shutdown ──────────────────────────────────
    let app = routes::build(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("tubeaudio-server stopped");
    Ok(())
}

/// Returns a future that resolves when SIGINT (Ctrl-C) or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install CTRL+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c   => {}
        _ = terminate => {}
    }

    info!("shutdown signal received; starting graceful shutdown");
}
