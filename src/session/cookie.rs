//! Reads and writes the session cookie.

use axum_extra::extract::{
    SignedCookieJar,
    cookie::{Cookie, SameSite},
};
use time::Duration;
use uuid::Uuid;

use super::SessionId;

pub(crate) const COOKIE_SESSION_ID: &str = "sessionId";
/// The default duration for which session cookies are valid.
pub const DEFAULT_SESSION_DURATION: Duration = Duration::days(7);

/// Add a session cookie holding `session_id` to the cookie jar.
///
/// The cookie expires `duration` after it is set and is sent for every path.
pub fn set_session_cookie(
    jar: SignedCookieJar,
    session_id: SessionId,
    duration: Duration,
) -> SignedCookieJar {
    jar.add(
        Cookie::build((COOKIE_SESSION_ID, session_id.to_string()))
            .path("/")
            .max_age(duration)
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}

/// Get the session ID from the session cookie in `jar`.
///
/// Returns `None` if the cookie is missing, its signature does not match, or
/// its value is not a session ID.
pub fn get_session_id(jar: &SignedCookieJar) -> Option<SessionId> {
    let cookie = jar.get(COOKIE_SESSION_ID)?;

    match extract_session_id(&cookie) {
        Ok(session_id) => Some(session_id),
        Err(error) => {
            tracing::warn!("session cookie holds an invalid session ID: {error}");
            None
        }
    }
}

fn extract_session_id(cookie: &Cookie) -> Result<SessionId, uuid::Error> {
    Uuid::parse_str(cookie.value_trimmed()).map(SessionId::new)
}
