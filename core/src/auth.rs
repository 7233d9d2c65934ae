//! API key credentials and the Basic authorization header.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// An API key pair. Owned by the client and never exposed after construction.
#[derive(Clone)]
pub(crate) struct Credentials {
    key_id: String,
    key_secret: String,
}

impl Credentials {
    pub(crate) fn new(key_id: impl Into<String>, key_secret: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            key_secret: key_secret.into(),
        }
    }

    /// `Basic <base64(key_id:key_secret)>`, derived fresh on every call.
    pub(crate) fn basic_auth_header(&self) -> String {
        basic_auth(&self.key_id, &self.key_secret)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key_id", &self.key_id)
            .field("key_secret", &"<redacted>")
            .finish()
    }
}

/// Encode a username/password pair as an HTTP Basic authorization value.
pub fn basic_auth(username: &str, password: &str) -> String {
    let token = STANDARD.encode(format!("{username}:{password}"));
    format!("Basic {token}")
}
