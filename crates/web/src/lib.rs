//! UsinaSoft web front-end
//!
//! Renders the production-control pages and proxies their data to the
//! upstream REST API on behalf of a cookie-identified browser session.

pub mod config;
pub mod enrich;
pub mod error;
pub mod forms;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod session;
pub mod state;
pub mod views;

pub use config::Settings;
pub use error::{WebError, WebResult};
pub use server::{build_router, serve};
pub use state::AppState;
