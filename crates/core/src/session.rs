//! Per-browser session state
//!
//! A [`Session`] holds the upstream access/refresh token pair and the profile
//! of the signed-in user. The two tokens are always present together or absent
//! together; the only ways to change them are [`Session::establish`],
//! [`Session::install_access_token`] and [`Session::clear`].
//!
//! Request handlers never own a session. They receive a [`SessionHandle`],
//! a cheaply cloneable reference to the record held by the session store, and
//! pass it explicitly to every upstream call that may need to refresh tokens.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Profile snapshot of the signed-in user, taken at login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Unknown when the upstream neither returned a profile nor put a user
    /// id in the access token
    #[serde(default)]
    pub id: Option<i64>,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl UserProfile {
    /// Profile used when the upstream only told us who the user is
    pub fn minimal(id: Option<i64>, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            first_name: String::new(),
            last_name: String::new(),
        }
    }

    /// "First Last", or the email when the upstream has no name on file
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.email.clone()
        } else {
            name.to_string()
        }
    }
}

/// Token and profile record for one browser session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    access_token: Option<String>,
    refresh_token: Option<String>,
    user: Option<UserProfile>,
}

impl Session {
    /// Anonymous session
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Session for a user that just completed login
    pub fn authenticated(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        user: UserProfile,
    ) -> Self {
        let mut session = Self::default();
        session.establish(access_token, refresh_token, user);
        session
    }

    /// Replace tokens and profile in one step
    pub fn establish(
        &mut self,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        user: UserProfile,
    ) {
        self.access_token = Some(access_token.into());
        self.refresh_token = Some(refresh_token.into());
        self.user = Some(user);
    }

    /// Store a freshly minted access token, and the rotated refresh token if
    /// the upstream issued one.
    ///
    /// Has no effect on a session without a refresh token: a refresh can only
    /// have been started from a session that had one, and if the session was
    /// cleared in the meantime it must stay cleared.
    pub fn install_access_token(
        &mut self,
        access_token: impl Into<String>,
        rotated_refresh: Option<String>,
    ) -> bool {
        if self.refresh_token.is_none() {
            return false;
        }
        self.access_token = Some(access_token.into());
        if let Some(refresh) = rotated_refresh {
            self.refresh_token = Some(refresh);
        }
        true
    }

    /// Drop tokens and profile together
    pub fn clear(&mut self) {
        self.access_token = None;
        self.refresh_token = None;
        self.user = None;
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    /// Whether a user is signed in
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Shared reference to a [`Session`] owned by the session store
///
/// All mutations take the write lock once, so concurrent readers observe
/// either the state before or after a change, never a partial one.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    inner: Arc<RwLock<Session>>,
}

impl SessionHandle {
    pub fn new(session: Session) -> Self {
        Self {
            inner: Arc::new(RwLock::new(session)),
        }
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> Session {
        self.inner.read().await.clone()
    }

    pub async fn access_token(&self) -> Option<String> {
        self.inner.read().await.access_token.clone()
    }

    pub async fn refresh_token(&self) -> Option<String> {
        self.inner.read().await.refresh_token.clone()
    }

    pub async fn user(&self) -> Option<UserProfile> {
        self.inner.read().await.user.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.read().await.is_authenticated()
    }

    /// See [`Session::install_access_token`]
    pub async fn install_access_token(
        &self,
        access_token: impl Into<String>,
        rotated_refresh: Option<String>,
    ) -> bool {
        self.inner
            .write()
            .await
            .install_access_token(access_token, rotated_refresh)
    }

    /// See [`Session::clear`]
    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }

    /// Whether two handles point at the same session record
    pub fn same_session(&self, other: &SessionHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Opaque session identifier carried in the browser cookie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a cookie value
    pub fn parse(value: &str) -> CoreResult<Self> {
        Uuid::parse_str(value)
            .map(Self)
            .map_err(|_| CoreError::invalid_session_id(value))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}
