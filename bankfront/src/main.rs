//! # bankfront
//!
//! Server-side web frontend for the accounts service.
//!
//! Proxies the login and signup forms and the account page loads to the backend
//! over HTTP, and keeps the visitor's identity in a single `user-id` cookie.
//!
//! ## Architecture
//!
//! - **Backend**: reqwest client for the accounts service, base URL injected by config
//! - **Session**: the `user-id` cookie is the session; no server-side state
//! - **HTTP**: Axum router with the route gate, page loaders, form actions and request IDs

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used)]

mod backend;
mod config;
mod http;
mod session;

use anyhow::Context;
use axum::serve;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::backend::BackendClient;
use crate::config::{AppConfig, Cli};
use crate::http::{router, AppState};
use crate::session::SessionCookie;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging().context("failed to initialize logging")?;

    let cli = Cli::parse();
    let config = AppConfig::from_cli(cli).context("failed to load configuration")?;
    info!(
        bind = %config.bind,
        backend_url = %config.backend_url,
        backend_timeout = ?config.backend_timeout,
        protect_accounts = config.protect_accounts,
        cookie_secure = config.cookie_secure,
        cookie_http_only = config.cookie_http_only,
        "configuration loaded"
    );
    if config.backend_timeout.is_none() {
        warn!("no backend timeout configured; a hung accounts service hangs its requests");
    }

    let backend = BackendClient::new(config.backend_url.clone(), config.backend_timeout)
        .context("failed to build accounts service client")?;
    info!(backend_url = %backend.base_url(), "accounts service client ready");

    let state = AppState {
        backend,
        session: SessionCookie::new(config.cookie_secure, config.cookie_http_only),
        protect_accounts: config.protect_accounts,
    };

    let app = router(state);
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;

    if config.bind.ip().is_loopback() {
        warn!(
            bind = %config.bind,
            "binding to loopback; use --bind 0.0.0.0:5173 for LAN access"
        );
    }

    let shutdown = tokio::signal::ctrl_c();
    info!(bind = %config.bind, "bankfront listening");

    serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = shutdown.await;
            info!("shutting down gracefully");
        })
        .await
        .context("server exited with error")
}

/// Initialize tracing subscriber with `RUST_LOG` env filter (default: `info`).
fn init_logging() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    Ok(())
}
