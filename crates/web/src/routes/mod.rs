//! HTTP routes of the front-end

pub mod auth;
pub mod health;
pub mod pages;

use crate::state::AppState;
use axum::{Router, routing::get};

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(pages::router())
        .route("/health", get(health::health_check))
}
