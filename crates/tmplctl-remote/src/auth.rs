use std::fmt;

use async_trait::async_trait;

use crate::error::RemoteError;
use crate::traits::Authenticator;

/// An opaque bearer credential. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

/// Hands out one fixed token. Used by embedding hosts that manage credentials
/// themselves, and in tests.
#[derive(Debug, Clone)]
pub struct StaticAuthenticator {
    token: AccessToken,
}

impl StaticAuthenticator {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: AccessToken::new(token),
        }
    }
}

#[async_trait]
impl Authenticator for StaticAuthenticator {
    async fn access_token(&self) -> Result<AccessToken, RemoteError> {
        Ok(self.token.clone())
    }
}
