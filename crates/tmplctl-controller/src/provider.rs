//! Provider bootstrap: wires the HTTP transport and authenticator from
//! configuration and checks that client and server versions are compatible.

use std::sync::Arc;

use tmplctl_api::VersionStatus;
use tmplctl_core::CoreError;
use tmplctl_http::{HttpTemplateApi, ServiceAuthenticator, build_http_client};
use tmplctl_remote::Authenticator;

use crate::config::ProviderConfig;
use crate::controller::TemplateController;
use crate::error::{ControllerError, Operation, Result};
use crate::observability::init_tracing_with_level;

/// Oldest platform release this provider talks to.
pub const MINIMUM_PLATFORM_VERSION: &str = "5.3.0";

#[derive(Debug, Clone)]
pub struct Provider {
    version: String,
}

impl Provider {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Validates the configuration, logs in and asks the server whether this
    /// provider version is supported.
    pub async fn configure(&self, config: ProviderConfig) -> Result<TemplateController> {
        config.validate().map_err(CoreError::configuration)?;
        init_tracing_with_level(&config.logging.level);

        let base_url = config.base_url.trim();
        let http = build_http_client(config.http.timeout())
            .map_err(|e| ControllerError::remote(Operation::ValidateVersions, None, e))?;
        let api = HttpTemplateApi::new(http.clone(), base_url);
        let auth = ServiceAuthenticator::new(
            http,
            base_url,
            config.service_id.clone(),
            config.service_secret_key.clone(),
        );

        let token = auth
            .access_token()
            .await
            .map_err(|e| ControllerError::remote(Operation::ValidateVersions, None, e))?;
        let response = api
            .validate_versions(&token, &self.version, MINIMUM_PLATFORM_VERSION)
            .await
            .map_err(|e| ControllerError::remote(Operation::ValidateVersions, None, e))?;

        if response.status != VersionStatus::Supported {
            let details = serde_json::to_string_pretty(&response).map_err(CoreError::from)?;
            tracing::error!(status = %response.status, "Provider and platform versions are not compatible");
            return Err(ControllerError::UnsupportedVersion { details });
        }

        tracing::info!(
            provider_version = %self.version,
            platform_version = %response.platform_version.version,
            service_id = %auth.service_id(),
            "Provider configured"
        );
        Ok(TemplateController::new(Arc::new(api), Arc::new(auth)))
    }
}
