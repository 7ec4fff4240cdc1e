//! Browser session cookie and the layer that resolves it per request

use crate::config::SessionConfig;
use crate::error::{EndSession, WebResult};
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::Response,
};
use cookie::{Cookie, SameSite};
use tracing::{debug, warn};
use usina_core::{Session, SessionHandle, SessionId};

/// Session of the current request, inserted into request extensions
///
/// A request without a live stored session gets a detached anonymous handle;
/// nothing is stored until login.
#[derive(Clone, Default)]
pub struct SessionContext {
    id: Option<SessionId>,
    handle: SessionHandle,
}

impl SessionContext {
    pub fn id(&self) -> Option<SessionId> {
        self.id
    }

    pub fn handle(&self) -> &SessionHandle {
        &self.handle
    }
}

/// Cookie carrying a freshly created session id
pub fn session_cookie(config: &SessionConfig, id: SessionId) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), id.to_string()))
        .path("/")
        .http_only(true)
        .secure(config.secure_cookie)
        .same_site(SameSite::Lax)
        .max_age(cookie::time::Duration::hours(config.idle_hours()))
        .build()
}

/// Cookie that makes the browser drop the session cookie
pub fn expired_cookie(config: &SessionConfig) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), ""))
        .path("/")
        .http_only(true)
        .secure(config.secure_cookie)
        .same_site(SameSite::Lax)
        .max_age(cookie::time::Duration::ZERO)
        .expires(cookie::time::OffsetDateTime::UNIX_EPOCH)
        .build()
}

/// Session id presented by the browser, if any and well formed
pub fn session_id_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<SessionId> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| Cookie::split_parse(value))
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == cookie_name)
        .and_then(|cookie| SessionId::parse(cookie.value()).ok())
}

pub fn append_cookie(response: &mut Response, cookie: &Cookie<'_>) {
    match HeaderValue::from_str(&cookie.to_string()) {
        Ok(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        Err(e) => warn!(error = %e, "could not encode session cookie"),
    }
}

/// Store an authenticated session and return the cookie that points at it
///
/// The previous session of the request, if any, is forgotten so that a login
/// always starts under a new id.
pub async fn begin(
    state: &AppState,
    previous: &SessionContext,
    session: Session,
) -> WebResult<Cookie<'static>> {
    if let Some(old) = previous.id() {
        previous.handle().clear().await;
        state.sessions.destroy(&old).await?;
    }

    let (id, _) = state.sessions.create(session).await?;
    debug!("session started");
    Ok(session_cookie(&state.settings.session, id))
}

/// Resolve the session cookie, and end the session when a handler asks to
pub async fn session_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let config = &state.settings.session;
    let presented = session_id_from_headers(req.headers(), &config.cookie_name);

    let mut context = SessionContext::default();
    if let Some(id) = presented {
        match state.sessions.load(&id).await {
            Ok(Some(handle)) => {
                context = SessionContext {
                    id: Some(id),
                    handle,
                }
            }
            Ok(None) => debug!("unknown or expired session cookie"),
            Err(e) => warn!(error = %e, "session lookup failed"),
        }
    }
    req.extensions_mut().insert(context.clone());

    let mut response = next.run(req).await;

    if response.extensions().get::<EndSession>().is_some() {
        context.handle.clear().await;
        if let Some(id) = context.id
            && let Err(e) = state.sessions.destroy(&id).await
        {
            warn!(error = %e, "could not destroy session");
        }
        append_cookie(&mut response, &expired_cookie(config));
    } else if presented.is_some()
        && context.id.is_none()
        && !response.headers().contains_key(header::SET_COOKIE)
    {
        // Stale cookie
        append_cookie(&mut response, &expired_cookie(config));
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let config = SessionConfig::default();
        let id = SessionId::generate();
        let cookie = session_cookie(&config, id);

        assert_eq!(cookie.name(), "usina.sid");
        assert_eq!(cookie.value(), id.to_string());
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(cookie::time::Duration::hours(24)));
    }

    #[test]
    fn test_expired_cookie_clears_value() {
        let cookie = expired_cookie(&SessionConfig::default());
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(cookie::time::Duration::ZERO));
    }

    #[test]
    fn test_session_id_from_headers() {
        let id = SessionId::generate();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; usina.sid={id}")).unwrap(),
        );

        assert_eq!(session_id_from_headers(&headers, "usina.sid"), Some(id));
        assert_eq!(session_id_from_headers(&headers, "other"), None);
    }

    #[test]
    fn test_malformed_session_id_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("usina.sid=not-a-uuid"));
        assert_eq!(session_id_from_headers(&headers, "usina.sid"), None);
    }
}
