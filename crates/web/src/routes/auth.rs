//! Login, logout and account registration

use crate::error::{EndSession, WebError, WebResult};
use crate::forms::{LoginForm, RegistrationForm};
use crate::session::{self, SessionContext, append_cookie};
use crate::state::AppState;
use crate::views;
use axum::{
    Extension, Form, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;
use tracing::{info, instrument, warn};
use usina_core::Session;
use usina_http::ClientError;

/// Shown on the login page after a successful registration
pub const REGISTERED_MESSAGE: &str =
    "Conta criada com sucesso! Faça login para acessar o sistema.";

#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_form).post(login))
        .route("/logout", get(logout).post(logout))
        .route("/cadastro-usuario", get(registration_form).post(register))
}

pub async fn login_form(Query(query): Query<MessageQuery>) -> Html<String> {
    views::login_page(query.error.as_deref(), query.success.as_deref())
}

#[instrument(name = "login", skip_all)]
pub async fn login(
    State(state): State<AppState>,
    Extension(context): Extension<SessionContext>,
    Form(form): Form<LoginForm>,
) -> WebResult<Response> {
    let credentials = match form.validate() {
        Ok(credentials) => credentials,
        Err(e) => {
            return Ok((
                StatusCode::BAD_REQUEST,
                views::login_page(Some(&e.to_string()), None),
            )
                .into_response());
        }
    };

    let login = match state.api.login(&credentials).await {
        Ok(login) => login,
        Err(e) => {
            let error = if e.is_unauthorized() {
                WebError::CredentialsInvalid
            } else {
                WebError::from(e)
            };
            warn!(error = %error, "login failed");
            return Ok((
                error.status_code(),
                views::login_page(Some(&error.user_message()), None),
            )
                .into_response());
        }
    };

    info!(user_id = ?login.user.id, "login succeeded");
    let cookie = session::begin(
        &state,
        &context,
        Session::authenticated(login.access, login.refresh, login.user),
    )
    .await?;

    let mut response = Redirect::to("/menu").into_response();
    append_cookie(&mut response, &cookie);
    Ok(response)
}

pub async fn logout(Extension(context): Extension<SessionContext>) -> Response {
    if let Some(user) = context.handle().user().await {
        info!(user_id = ?user.id, "logout");
    }
    let mut response = Redirect::to("/login").into_response();
    response.extensions_mut().insert(EndSession);
    response
}

pub async fn registration_form(Query(query): Query<MessageQuery>) -> Html<String> {
    views::registration_page(query.error.as_deref())
}

/// Failures while creating an account never touch the session; a 401 here
/// means the upstream refused anonymous registration.
fn registration_error(err: ClientError) -> WebError {
    match err.upstream() {
        Some(upstream) if upstream.status.is_client_error() => {
            WebError::UpstreamValidation(upstream.summary())
        }
        _ => WebError::from(err),
    }
}

#[instrument(name = "register", skip_all)]
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegistrationForm>,
) -> Response {
    let new_user = match form.validate() {
        Ok(new_user) => new_user,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                views::registration_page(Some(&e.to_string())),
            )
                .into_response();
        }
    };

    match state.api.register_user(&new_user).await {
        Ok(_) => {
            info!(cargo = %new_user.cargo, "account created");
            Redirect::to(&format!(
                "/login?success={}",
                urlencoding::encode(REGISTERED_MESSAGE)
            ))
            .into_response()
        }
        Err(e) => {
            let error = registration_error(e);
            warn!(error = %error, "registration failed");
            (
                error.status_code(),
                views::registration_page(Some(&error.user_message())),
            )
                .into_response()
        }
    }
}
