//! Authentication API client methods

use super::{ApiClient, ClientError};
use crate::claims;
use crate::types::{Credentials, Login, NewUser, RefreshRequest, RefreshResponse, TokenResponse};
use reqwest::Method;
use tracing::{debug, warn};
use usina_core::UserProfile;

pub const TOKEN_PATH: &str = "auth/token/";
pub const REFRESH_PATH: &str = "auth/token/refresh/";
pub const USERS_PATH: &str = "usuarios/";

impl ApiClient {
    /// Exchange credentials for a token pair
    pub async fn obtain_tokens(&self, credentials: &Credentials) -> Result<TokenResponse, ClientError> {
        let request = self
            .request(Method::POST, TOKEN_PATH, None)
            .json(credentials);
        self.execute(request).await
    }

    /// Mint a new access token from a refresh token
    pub async fn refresh_access(&self, refresh: &str) -> Result<RefreshResponse, ClientError> {
        let request = self
            .request(Method::POST, REFRESH_PATH, None)
            .json(&RefreshRequest {
                refresh: refresh.to_string(),
            });
        self.execute(request).await
    }

    /// Fetch a user's profile with an explicit access token
    pub async fn fetch_user(&self, id: i64, access: &str) -> Result<UserProfile, ClientError> {
        let request = self.request(Method::GET, &format!("{USERS_PATH}{id}/"), Some(access));
        self.execute(request).await
    }

    /// Create an account; this endpoint is open to anonymous callers
    pub async fn register_user(&self, user: &NewUser) -> Result<serde_json::Value, ClientError> {
        let request = self.request(Method::POST, USERS_PATH, None).json(user);
        self.execute(request).await
    }

    /// Log in and resolve the profile of the authenticated user
    ///
    /// When the token response does not embed the profile, the `user_id`
    /// claim of the access token is used to fetch it. If there is no claim, or
    /// the fetch fails, the login still succeeds with a minimal profile built
    /// from what is known and the submitted email.
    pub async fn login(&self, credentials: &Credentials) -> Result<Login, ClientError> {
        let tokens = self.obtain_tokens(credentials).await?;

        let user = match (tokens.user, claims::user_id(&tokens.access)) {
            (Some(user), _) => user,
            (None, Some(id)) => {
                debug!(user_id = id, "profile not embedded in token response, fetching");
                match self.fetch_user(id, &tokens.access).await {
                    Ok(user) => user,
                    Err(e) => {
                        warn!(user_id = id, error = %e, "profile fetch failed, using minimal profile");
                        UserProfile::minimal(Some(id), credentials.email.clone())
                    }
                }
            }
            (None, None) => {
                debug!("token response identifies no user, using minimal profile");
                UserProfile::minimal(None, credentials.email.clone())
            }
        };

        Ok(Login {
            access: tokens.access,
            refresh: tokens.refresh,
            user,
        })
    }
}
