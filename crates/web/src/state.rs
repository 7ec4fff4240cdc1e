//! Shared application state

use crate::config::Settings;
use std::sync::Arc;
use usina_core::{InMemorySessionStore, SessionStore};
use usina_http::ApiClient;

/// State handed to every handler and middleware
#[derive(Clone)]
pub struct AppState {
    pub api: ApiClient,
    pub sessions: Arc<dyn SessionStore>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(api: ApiClient, sessions: Arc<dyn SessionStore>, settings: Settings) -> Self {
        Self {
            api,
            sessions,
            settings: Arc::new(settings),
        }
    }

    /// Build the state described by `settings`, with an in-memory session store
    pub fn from_settings(settings: Settings) -> anyhow::Result<Self> {
        let api = ApiClient::builder()
            .base_url(settings.upstream.base_url.clone())
            .timeout(settings.upstream.timeout())
            .build()?;
        let sessions = Arc::new(InMemorySessionStore::new(settings.session.idle_timeout()));
        Ok(Self::new(api, sessions, settings))
    }
}
