//! Access gate for the protected pages

use crate::session::SessionContext;
use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

/// Paths reachable without a logged-in user
pub fn should_skip_auth(path: &str) -> bool {
    matches!(
        path,
        "/" | "/login" | "/logout" | "/cadastro-usuario" | "/health" | "/favicon.ico"
    ) || path.starts_with("/public/")
}

/// Redirect anonymous sessions to the login page
///
/// Must run inside [`crate::session::session_layer`], which provides the
/// [`SessionContext`].
pub async fn require_auth(req: Request, next: Next) -> Response {
    if should_skip_auth(req.uri().path()) {
        return next.run(req).await;
    }

    let authenticated = match req.extensions().get::<SessionContext>() {
        Some(context) => context.handle().is_authenticated().await,
        None => false,
    };

    if authenticated {
        next.run(req).await
    } else {
        debug!(path = req.uri().path(), "anonymous request to protected page");
        Redirect::to("/login").into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_paths() {
        assert!(should_skip_auth("/"));
        assert!(should_skip_auth("/login"));
        assert!(should_skip_auth("/cadastro-usuario"));
        assert!(should_skip_auth("/health"));
        assert!(should_skip_auth("/public/css/style.css"));
    }

    #[test]
    fn test_protected_paths() {
        assert!(!should_skip_auth("/menu"));
        assert!(!should_skip_auth("/cadastro"));
        assert!(!should_skip_auth("/producao"));
        assert!(!should_skip_auth("/login/../menu"));
    }
}
