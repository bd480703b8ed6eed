//! Client runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into the
//! backend adapter's constructor. The bearer token is part of this explicit
//! request context rather than ambient global state, so every outgoing call
//! reads the same credentials for the lifetime of the session.

use crate::error::{EngineError, EngineResult};

/// A bearer token obtained at login.
///
/// Set at session start, cleared at logout, read-only in between. The
/// `Debug` form is redacted so tokens never land in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> EngineResult<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(EngineError::InvalidInput("token cannot be empty".into()));
        }
        Ok(Self(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// Connection settings for the record backend.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    base_url: String,
    token: Option<SessionToken>,
}

impl ClientConfig {
    /// Creates a config for the given base URL, without credentials.
    ///
    /// Trailing slashes are stripped so endpoint paths can be joined
    /// verbatim.
    pub fn new(base_url: impl Into<String>) -> EngineResult<Self> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            return Err(EngineError::InvalidInput("base URL cannot be empty".into()));
        }
        Ok(Self {
            base_url,
            token: None,
        })
    }

    /// Attaches the session token obtained at login.
    pub fn with_token(mut self, token: SessionToken) -> Self {
        self.token = Some(token);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&SessionToken> {
        self.token.as_ref()
    }
}
