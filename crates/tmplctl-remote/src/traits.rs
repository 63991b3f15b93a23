//! Collaborator traits the controller is written against.

use async_trait::async_trait;
use tmplctl_api::{
    CreateTemplateRequest, SearchRequest, SearchTemplatesResponse, TemplateResponse,
    UpdateTemplateRequest,
};

use crate::auth::AccessToken;
use crate::error::RemoteError;

/// Per-call options for [`TemplateApi::update`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Apply even when the change drops observation data.
    pub force: bool,
}

impl UpdateOptions {
    pub fn forced(force: bool) -> Self {
        Self { force }
    }
}

/// The remote template API.
///
/// Implementations must be thread-safe (`Send + Sync`). The token is treated
/// as opaque and already valid for the duration of one call.
#[async_trait]
pub trait TemplateApi: Send + Sync {
    /// Creates a template and returns it with server-assigned identifiers.
    async fn create(
        &self,
        token: &AccessToken,
        request: &CreateTemplateRequest,
    ) -> Result<TemplateResponse, RemoteError>;

    /// Replaces a template.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::NotFound` for an unknown ID and
    /// `RemoteError::AttributeInUse` when a non-forced change would drop
    /// observation data.
    async fn update(
        &self,
        token: &AccessToken,
        id: &str,
        request: &UpdateTemplateRequest,
        options: UpdateOptions,
    ) -> Result<TemplateResponse, RemoteError>;

    /// Fetches a template. Returns `RemoteError::NotFound` for an unknown ID.
    async fn get(&self, token: &AccessToken, id: &str) -> Result<TemplateResponse, RemoteError>;

    /// Deletes a template. Returns `RemoteError::NotFound` for an unknown ID.
    async fn delete(&self, token: &AccessToken, id: &str) -> Result<(), RemoteError>;

    async fn search(
        &self,
        token: &AccessToken,
        request: &SearchRequest,
    ) -> Result<SearchTemplatesResponse, RemoteError>;
}

/// Supplies access tokens. Caching and refresh are the implementation's concern.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn access_token(&self) -> Result<AccessToken, RemoteError>;
}
