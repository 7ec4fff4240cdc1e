//! Router assembly and server lifecycle

use crate::config::Settings;
use crate::middleware::require_auth;
use crate::routes;
use crate::session::session_layer;
use crate::state::AppState;
use anyhow::Result;
use axum::{Router, middleware};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};
use usina_core::SessionStore;

/// Build the complete application router
///
/// Layers run outside-in: tracing, session resolution, then the access gate.
pub fn build_router(state: AppState) -> Router {
    let mut router = routes::router();

    if let Some(static_dir) = &state.settings.server.static_dir {
        debug!(path = %static_dir.display(), "serving static files under /public");
        router = router.nest_service("/public", ServeDir::new(static_dir));
    }

    router
        .layer(middleware::from_fn(require_auth))
        .layer(middleware::from_fn_with_state(state.clone(), session_layer))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Periodically drop idle sessions from the store
pub fn spawn_session_purge(sessions: Arc<dyn SessionStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match sessions.purge_expired().await {
                Ok(0) => {}
                Ok(purged) => debug!(purged, "idle sessions purged"),
                Err(e) => warn!(error = %e, "session purge failed"),
            }
        }
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}

/// Bind the configured address and serve until Ctrl+C
pub async fn serve(settings: Settings) -> Result<()> {
    let addr = settings.server.bind_addr()?;
    let purge_every = settings.session.purge_interval();

    let state = AppState::from_settings(settings)?;
    let purge = spawn_session_purge(state.sessions.clone(), purge_every);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, upstream = state.api.base_url(), "UsinaSoft listening");
    println!("Server running at: http://{addr}/");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    purge.abort();
    Ok(())
}
