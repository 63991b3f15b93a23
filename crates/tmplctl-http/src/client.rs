use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use tmplctl_api::{
    ApiErrorBody, CreateTemplateRequest, SearchRequest, SearchTemplatesResponse, TemplateResponse,
    UpdateTemplateRequest, VersionValidationResponse,
};
use tmplctl_remote::{AccessToken, RemoteError, TemplateApi, UpdateOptions};

const TEMPLATES_PATH: &str = "settings/v1/templates";
const VERSION_VALIDATION_PATH: &str = "settings/v1/terraform/versions/validate";

/// Builds the shared `reqwest` client with a per-request timeout.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, RemoteError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| RemoteError::transport(format!("failed to build HTTP client: {e}")))
}

#[derive(Debug, Clone)]
pub struct HttpTemplateApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTemplateApi {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn templates_url(&self) -> String {
        format!("{}/{TEMPLATES_PATH}", self.base_url)
    }

    fn template_url(&self, id: &str) -> String {
        format!("{}/{TEMPLATES_PATH}/{id}", self.base_url)
    }

    fn request(&self, method: Method, url: &str, token: &AccessToken) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(token.as_str())
            .header("Accept", "application/json")
    }

    /// Asks the server whether this client version and the server version are
    /// compatible.
    pub async fn validate_versions(
        &self,
        token: &AccessToken,
        provider_version: &str,
        minimum_platform_version: &str,
    ) -> Result<VersionValidationResponse, RemoteError> {
        let url = format!("{}/{VERSION_VALIDATION_PATH}", self.base_url);
        let resp = self
            .request(Method::GET, &url, token)
            .query(&[
                ("terraform-provider", provider_version),
                ("minimum-biot", minimum_platform_version),
            ])
            .send()
            .await
            .map_err(|e| send_error(&Method::GET, &url, e))?;
        handle_response(resp, &Method::GET, &url, None).await
    }
}

#[async_trait]
impl TemplateApi for HttpTemplateApi {
    async fn create(
        &self,
        token: &AccessToken,
        request: &CreateTemplateRequest,
    ) -> Result<TemplateResponse, RemoteError> {
        let url = self.templates_url();
        let resp = self
            .request(Method::POST, &url, token)
            .json(request)
            .send()
            .await
            .map_err(|e| send_error(&Method::POST, &url, e))?;
        handle_response(resp, &Method::POST, &url, None).await
    }

    async fn update(
        &self,
        token: &AccessToken,
        id: &str,
        request: &UpdateTemplateRequest,
        options: UpdateOptions,
    ) -> Result<TemplateResponse, RemoteError> {
        let url = self.template_url(id);
        let mut builder = self.request(Method::PUT, &url, token).json(request);
        if options.force {
            builder = builder.query(&[("force", "true")]);
        }
        let resp = builder
            .send()
            .await
            .map_err(|e| send_error(&Method::PUT, &url, e))?;
        handle_response(resp, &Method::PUT, &url, Some(id)).await
    }

    async fn get(&self, token: &AccessToken, id: &str) -> Result<TemplateResponse, RemoteError> {
        let url = self.template_url(id);
        let resp = self
            .request(Method::GET, &url, token)
            .send()
            .await
            .map_err(|e| send_error(&Method::GET, &url, e))?;
        handle_response(resp, &Method::GET, &url, Some(id)).await
    }

    async fn delete(&self, token: &AccessToken, id: &str) -> Result<(), RemoteError> {
        let url = self.template_url(id);
        let resp = self
            .request(Method::DELETE, &url, token)
            .send()
            .await
            .map_err(|e| send_error(&Method::DELETE, &url, e))?;
        ensure_success(resp, &Method::DELETE, &url, Some(id)).await?;
        Ok(())
    }

    async fn search(
        &self,
        token: &AccessToken,
        request: &SearchRequest,
    ) -> Result<SearchTemplatesResponse, RemoteError> {
        let url = self.templates_url();
        let search_request = serde_json::to_string(request)?;
        let resp = self
            .request(Method::GET, &url, token)
            .query(&[("searchRequest", search_request.as_str())])
            .send()
            .await
            .map_err(|e| send_error(&Method::GET, &url, e))?;
        handle_response(resp, &Method::GET, &url, None).await
    }
}

fn send_error(method: &Method, url: &str, err: reqwest::Error) -> RemoteError {
    tracing::error!(%method, url, error = %err, "Failed to call template API");
    RemoteError::transport(err.to_string())
}

/// Maps a non-2xx response to a `RemoteError`. A 404 becomes `NotFound` only
/// when `not_found_id` names the template the call was about.
pub(crate) async fn ensure_success(
    resp: Response,
    method: &Method,
    url: &str,
    not_found_id: Option<&str>,
) -> Result<Response, RemoteError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    if status == StatusCode::NOT_FOUND
        && let Some(id) = not_found_id
    {
        tracing::warn!(%method, url, status = status.as_u16(), "Template not found");
        return Err(RemoteError::not_found(id));
    }

    tracing::error!(%method, url, status = status.as_u16(), "Template API returned error status");
    let body = match resp.text().await {
        Ok(body) => body,
        Err(err) => {
            tracing::warn!(%method, url, error = %err, "Failed to read error response body");
            String::new()
        }
    };
    Err(error_from_body(status, &body))
}

/// Builds an error from a non-success body. Missing members get placeholders.
pub(crate) fn error_from_body(status: StatusCode, body: &str) -> RemoteError {
    let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();

    if parsed.is_attribute_in_use() {
        return RemoteError::attribute_in_use(parsed.attribute_names());
    }

    let non_empty = |value: Option<String>, placeholder: &str| {
        value
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| placeholder.to_string())
    };
    RemoteError::api(
        status.as_u16(),
        non_empty(parsed.code, "unknown error code"),
        non_empty(parsed.trace_id, "unknown trace id"),
        non_empty(parsed.message, "unknown error message"),
    )
}

async fn handle_response<T: DeserializeOwned>(
    resp: Response,
    method: &Method,
    url: &str,
    not_found_id: Option<&str>,
) -> Result<T, RemoteError> {
    let resp = ensure_success(resp, method, url, not_found_id).await?;
    let body = resp
        .text()
        .await
        .map_err(|e| RemoteError::transport(format!("failed to read response body: {e}")))?;
    serde_json::from_str(&body).map_err(|e| {
        tracing::error!(%method, url, error = %e, "Failed to parse response JSON");
        RemoteError::decode(e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreadable_error_body_gets_placeholders() {
        let err = error_from_body(StatusCode::BAD_GATEWAY, "");
        assert_eq!(
            err,
            RemoteError::api(
                502,
                "unknown error code",
                "unknown trace id",
                "unknown error message"
            )
        );
    }

    #[test]
    fn error_body_placeholders() {
        let err = error_from_body(StatusCode::BAD_REQUEST, "not json");
        assert_eq!(
            err,
            RemoteError::api(
                400,
                "unknown error code",
                "unknown trace id",
                "unknown error message"
            )
        );
    }

    #[test]
    fn error_body_attribute_in_use() {
        let body = r#"{"code":"CUSTOM_ATTRIBUTE_IN_USE","message":"in use","details":{"attributes":[{"name":"age"}]}}"#;
        let err = error_from_body(StatusCode::BAD_REQUEST, body);
        assert_eq!(err, RemoteError::attribute_in_use(vec!["age".into()]));
    }

    #[test]
    fn error_body_members_are_kept() {
        let body = r#"{"code":"INVALID_INPUT","message":"bad name","traceId":"t-9"}"#;
        let err = error_from_body(StatusCode::UNPROCESSABLE_ENTITY, body);
        assert_eq!(
            err.to_string(),
            "server error (status: [422], code: [INVALID_INPUT], traceId: [t-9]): [bad name]"
        );
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let api = HttpTemplateApi::new(reqwest::Client::new(), "https://example.test/");
        assert_eq!(api.base_url(), "https://example.test");
        assert_eq!(
            api.template_url("T1"),
            "https://example.test/settings/v1/templates/T1"
        );
    }
}
