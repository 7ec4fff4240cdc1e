//! Route-layer errors and how they reach the browser

use crate::views;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;
use usina_core::CoreError;
use usina_http::ClientError;

/// Message shown on the login page after the session is dropped
pub const SESSION_EXPIRED_MESSAGE: &str = "Sua sessão expirou. Faça login novamente.";

#[derive(Debug, Error)]
pub enum WebError {
    /// The upstream rejected the submitted credentials
    #[error("Invalid credentials")]
    CredentialsInvalid,

    /// Connection refused or timed out
    #[error("Upstream unreachable: {0}")]
    UpstreamUnreachable(String),

    /// 4xx other than 401, with the upstream's field messages joined
    #[error("Upstream rejected the request: {0}")]
    UpstreamValidation(String),

    /// 401 that survived the refresh-and-retry cycle
    #[error("Session expired")]
    SessionExpired,

    /// 5xx or an unreadable upstream answer
    #[error("Upstream server error: {0}")]
    UpstreamServerError(String),

    #[error("Session store error: {0}")]
    Session(#[from] CoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type WebResult<T> = std::result::Result<T, WebError>;

impl From<ClientError> for WebError {
    fn from(err: ClientError) -> Self {
        match &err {
            _ if err.is_unauthorized() => Self::SessionExpired,
            _ if err.is_unreachable() => Self::UpstreamUnreachable(err.to_string()),
            ClientError::Upstream(upstream) if upstream.status.is_client_error() => {
                Self::UpstreamValidation(upstream.summary())
            }
            _ => Self::UpstreamServerError(err.to_string()),
        }
    }
}

impl WebError {
    /// Text suitable for a banner on the page the user came from
    pub fn user_message(&self) -> String {
        match self {
            Self::CredentialsInvalid => "Email ou senha inválidos".to_string(),
            Self::UpstreamUnreachable(_) => {
                "Não foi possível conectar ao servidor. Tente novamente mais tarde.".to_string()
            }
            Self::UpstreamValidation(messages) => messages.clone(),
            Self::SessionExpired => SESSION_EXPIRED_MESSAGE.to_string(),
            Self::UpstreamServerError(_) | Self::Session(_) | Self::Serialization(_) => {
                "Erro interno do servidor. Tente novamente mais tarde.".to_string()
            }
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::CredentialsInvalid | Self::SessionExpired => StatusCode::UNAUTHORIZED,
            Self::UpstreamUnreachable(_) => StatusCode::BAD_GATEWAY,
            Self::UpstreamValidation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::UpstreamServerError(_) => StatusCode::BAD_GATEWAY,
            Self::Session(_) | Self::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Marks a response after which the request's session must be discarded
///
/// The session layer sees it, clears the record, forgets it in the store and
/// expires the cookie.
#[derive(Debug, Clone, Copy)]
pub struct EndSession;

/// Redirect to the login page carrying an error message
pub fn login_redirect(message: &str) -> Redirect {
    Redirect::to(&format!("/login?error={}", urlencoding::encode(message)))
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            Self::SessionExpired => {
                let mut response = login_redirect(SESSION_EXPIRED_MESSAGE).into_response();
                response.extensions_mut().insert(EndSession);
                response
            }
            other => {
                tracing::error!(error = %other, "request failed");
                let status = other.status_code();
                (status, views::error_page(status, &other.user_message())).into_response()
            }
        }
    }
}
