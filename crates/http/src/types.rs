//! Wire types of the upstream authentication endpoints

use serde::{Deserialize, Serialize};
use usina_core::UserProfile;

/// Login form submitted to `auth/token/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Token pair issued at login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access: String,
    pub refresh: String,
    /// Some upstream versions embed the profile, others do not
    #[serde(default)]
    pub user: Option<UserProfile>,
}

/// Body of `auth/token/refresh/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// New access token, plus a rotated refresh token when rotation is enabled
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Outcome of a successful login: tokens and who they belong to
#[derive(Debug, Clone)]
pub struct Login {
    pub access: String,
    pub refresh: String,
    pub user: UserProfile,
}

/// New account submitted to `usuarios/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefone: Option<String>,
    pub cargo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empresa: Option<String>,
}
