use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque session identifier carried in the session cookie.
///
/// The cookie is only a capability reference; everything the server trusts lives in the
/// [`SessionStore`](crate::ports::SessionStore) under this key.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionToken(String);

impl SessionToken {
    /// Generate a fresh random token.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Wrap a token received from a client. Returns `None` for values that could not
    /// have been issued by [`SessionToken::generate`].
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.len() == 32 && raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            Some(Self(raw.to_ascii_lowercase()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short prefix that is safe to put in logs.
    pub fn redacted(&self) -> &str {
        &self.0[..8]
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken({}…)", self.redacted())
    }
}

/// Server-side session record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: SessionToken,
    pub is_admin: bool,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Create an admin session valid for `ttl`.
    pub fn admin(ttl: chrono::TimeDelta) -> Self {
        Self {
            token: SessionToken::generate(),
            is_admin: true,
            expires_at: Utc::now() + ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Result of a successful login: the token to hand back in the cookie.
#[derive(Debug, Clone)]
pub struct SessionGrant {
    pub token: SessionToken,
    pub expires_at: DateTime<Utc>,
}
