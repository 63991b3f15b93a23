//! Service-account authenticator with an in-memory token cache.

use std::fmt;

use async_trait::async_trait;
use reqwest::Method;
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};
use tmplctl_api::{AccessTokenResponse, ServiceLoginRequest};
use tmplctl_remote::{AccessToken, Authenticator, RemoteError};
use tokio::sync::Mutex;

use crate::client::ensure_success;

const LOGIN_PATH: &str = "ums/v2/services/accessToken";

/// Tokens are refreshed this long before the server-reported expiry.
const REFRESH_BUFFER: Duration = Duration::minutes(5);

struct CachedToken {
    token: AccessToken,
    refresh_at: OffsetDateTime,
}

/// Logs in with a service ID and secret key and reuses the token until
/// shortly before it expires.
///
/// The cache lock is held across a login, so concurrent callers share a single
/// refresh.
pub struct ServiceAuthenticator {
    http: reqwest::Client,
    base_url: String,
    service_id: String,
    service_secret_key: String,
    cache: Mutex<Option<CachedToken>>,
}

impl ServiceAuthenticator {
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        service_id: impl Into<String>,
        service_secret_key: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_id: service_id.into(),
            service_secret_key: service_secret_key.into(),
            cache: Mutex::new(None),
        }
    }

    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    /// Drops the cached token so the next call logs in again.
    pub async fn invalidate(&self) {
        self.cache.lock().await.take();
    }

    async fn login(&self) -> Result<AccessTokenResponse, RemoteError> {
        let url = format!("{}/{LOGIN_PATH}", self.base_url);
        let body = ServiceLoginRequest {
            id: self.service_id.clone(),
            secret_key: self.service_secret_key.clone(),
        };

        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(url, error = %e, "Failed to call login API");
                RemoteError::transport(e.to_string())
            })?;
        let resp = ensure_success(resp, &Method::POST, &url, None).await?;
        resp.json::<AccessTokenResponse>()
            .await
            .map_err(|e| RemoteError::decode(format!("failed to decode access token response: {e}")))
    }
}

/// When to refresh a token the server says expires at `expiration`.
/// An unparsable expiry counts as five minutes from `now`.
fn refresh_at(expiration: &str, now: OffsetDateTime) -> OffsetDateTime {
    let expires = OffsetDateTime::parse(expiration, &Rfc3339).unwrap_or_else(|_| {
        tracing::debug!(expiration, "Unparsable token expiry, assuming five minutes");
        now + Duration::minutes(5)
    });
    expires - REFRESH_BUFFER
}

#[async_trait]
impl Authenticator for ServiceAuthenticator {
    async fn access_token(&self) -> Result<AccessToken, RemoteError> {
        let mut cache = self.cache.lock().await;
        let now = OffsetDateTime::now_utc();

        if let Some(cached) = cache.as_ref()
            && now < cached.refresh_at
        {
            return Ok(cached.token.clone());
        }

        let response = self.login().await.map_err(|e| {
            RemoteError::authentication(format!(
                "failed to login as service using service ID [{}]: {e}",
                self.service_id
            ))
        })?;

        let token = AccessToken::new(response.access_token);
        let refresh_at = refresh_at(&response.access_token_expiration, now);
        tracing::debug!(service_id = %self.service_id, %refresh_at, "Obtained service access token");
        *cache = Some(CachedToken {
            token: token.clone(),
            refresh_at,
        });
        Ok(token)
    }
}

impl fmt::Debug for ServiceAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAuthenticator")
            .field("base_url", &self.base_url)
            .field("service_id", &self.service_id)
            .field("service_secret_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}
