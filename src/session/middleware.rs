//! Session middleware that rejects requests without a valid session cookie.

use axum::{
    extract::{FromRef, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{SignedCookieJar, cookie::Key};

use crate::{AppState, Error, session::get_session_id};

/// The state needed for the session middleware.
#[derive(Clone)]
pub struct SessionState {
    /// The key used to verify signed cookies.
    pub cookie_key: Key,
}

impl FromRef<AppState> for SessionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
        }
    }
}

impl FromRef<SessionState> for Key {
    fn from_ref(state: &SessionState) -> Self {
        state.cookie_key.clone()
    }
}

/// Middleware function that checks for a valid session cookie.
///
/// The session ID is placed into the request and the request executed normally
/// if the cookie is valid, otherwise [Error::SessionMissing] is returned.
///
/// **Note**: Route handlers can use the function argument `Extension(session_id): Extension<SessionId>` to receive the session ID.
pub async fn session_guard(
    State(state): State<SessionState>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();
    let jar = SignedCookieJar::from_headers(&parts.headers, state.cookie_key);

    let Some(session_id) = get_session_id(&jar) else {
        tracing::debug!("Rejected request to {} without a session.", parts.uri);
        return Error::SessionMissing.into_response();
    };

    parts.extensions.insert(session_id);
    next.run(Request::from_parts(parts, body)).await
}
