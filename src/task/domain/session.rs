//! Credentials passed through to the transport.

use std::fmt;

/// Credentials of an authenticated platform user.
///
/// Mutating operations and user vote lookups run under a user session.
#[derive(Clone, PartialEq, Eq)]
pub struct UserSession {
    auth_id: String,
    password: String,
}

impl UserSession {
    /// Creates a user session.
    #[must_use]
    pub fn new(auth_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            auth_id: auth_id.into(),
            password: password.into(),
        }
    }

    /// Returns the authentication identifier, also used in vote paths.
    #[must_use]
    pub fn auth_id(&self) -> &str {
        &self.auth_id
    }

    /// Returns the password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for UserSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserSession")
            .field("auth_id", &self.auth_id)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Credentials the client itself uses for read traffic.
#[derive(Clone, PartialEq, Eq)]
pub struct SystemSession {
    auth_id: String,
    password: String,
}

impl SystemSession {
    /// Creates a system session.
    #[must_use]
    pub fn new(auth_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            auth_id: auth_id.into(),
            password: password.into(),
        }
    }

    /// Returns the authentication identifier.
    #[must_use]
    pub fn auth_id(&self) -> &str {
        &self.auth_id
    }

    /// Returns the password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for SystemSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemSession")
            .field("auth_id", &self.auth_id)
            .field("password", &"<redacted>")
            .finish()
    }
}
