//! Session-bound client with one-shot token refresh
//!
//! Every call reads the access token from the session at send time. When the
//! upstream answers 401 the client refreshes the access token once and
//! resubmits the call once:
//!
//! ```text
//! send ──ok──────────────────────────────────────────▶ result
//!   │
//!   └─401, not yet retried
//!        ├─ no refresh token ─────────────────────────▶ original 401
//!        └─ POST auth/token/refresh/
//!             ├─ ok:  store token, resend once ────────▶ retry result (even a 401)
//!             └─ err: clear session ──────────────────▶ refresh error
//! ```
//!
//! Concurrent calls on the same session refresh independently; the session
//! lock makes each token write atomic, and the last write wins.

use super::{ApiClient, ApiRequest, ClientError};
use crate::claims;
use serde_json::Value;
use tracing::{debug, error, info};
use usina_core::SessionHandle;

/// [`ApiClient`] bound to one browser session
#[derive(Clone, Copy)]
pub struct SessionClient<'a> {
    api: &'a ApiClient,
    session: &'a SessionHandle,
}

impl<'a> SessionClient<'a> {
    pub fn new(api: &'a ApiClient, session: &'a SessionHandle) -> Self {
        Self { api, session }
    }

    pub fn session(&self) -> &SessionHandle {
        self.session
    }

    pub async fn get(&self, path: &str) -> Result<Value, ClientError> {
        self.dispatch(ApiRequest::get(path)).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<Value, ClientError> {
        self.dispatch(ApiRequest::post(path, body)).await
    }

    pub async fn put(&self, path: &str, body: Value) -> Result<Value, ClientError> {
        self.dispatch(ApiRequest::put(path, body)).await
    }

    pub async fn patch(&self, path: &str, body: Value) -> Result<Value, ClientError> {
        self.dispatch(ApiRequest::patch(path, body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, ClientError> {
        self.dispatch(ApiRequest::delete(path)).await
    }

    /// Send a request, recovering once from an expired access token
    pub async fn dispatch(&self, mut request: ApiRequest) -> Result<Value, ClientError> {
        // A pinned bearer (set by a refresh) is sent as is.
        if request.bearer().is_none()
            && let Some(token) = self.session.access_token().await
        {
            request.set_bearer(token);
        }

        match self.api.send(&request).await {
            Err(err) if err.is_unauthorized() && !request.is_retry() => {
                request.mark_retried();
                self.refresh_and_retry(request, err).await
            }
            result => result,
        }
    }

    async fn refresh_and_retry(
        &self,
        mut request: ApiRequest,
        unauthorized: ClientError,
    ) -> Result<Value, ClientError> {
        let Some(refresh_token) = self.session.refresh_token().await else {
            debug!(path = request.path(), "401 without refresh token, giving up");
            return Err(unauthorized);
        };

        debug!(path = request.path(), "access token rejected, refreshing");
        let refreshed = match self.api.refresh_access(&refresh_token).await {
            Ok(refreshed) => refreshed,
            Err(refresh_error) => {
                error!(error = %refresh_error, "token refresh failed, session expired");
                self.session.clear().await;
                return Err(refresh_error);
            }
        };

        info!(
            expires_at = ?claims::expires_at(&refreshed.access),
            rotated = refreshed.refresh.is_some(),
            "access token refreshed"
        );
        self.session
            .install_access_token(refreshed.access.clone(), refreshed.refresh)
            .await;

        request.set_bearer(refreshed.access);
        self.api.send(&request).await
    }
}
