//! Anonymous sessions carried in a signed cookie.
//!
//! A session only scopes which transactions a client can see. It carries no
//! identity and grants no other permissions.

mod cookie;
mod middleware;

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use cookie::{DEFAULT_SESSION_DURATION, get_session_id, set_session_cookie};
pub use middleware::session_guard;

#[cfg(test)]
pub(crate) use cookie::COOKIE_SESSION_ID;

/// An opaque identifier for an anonymous session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new, random session ID.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// The session ID as a UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
