//! Search, login, error and version-validation payloads.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::null_as_empty;
use crate::template::TemplateResponse;

/// Error code the server returns when an update would drop observation data.
pub const ATTRIBUTE_IN_USE_CODE: &str = "CUSTOM_ATTRIBUTE_IN_USE";

/// `searchRequest` query payload: `{"filter": {"<field>": {"in": [..]}}}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchRequest {
    pub filter: BTreeMap<String, FilterEntry>,
}

impl SearchRequest {
    /// Adds an `in` filter on one field.
    pub fn with_in(mut self, field: impl Into<String>, values: Vec<String>) -> Self {
        self.filter.insert(
            field.into(),
            FilterEntry {
                values,
                ..FilterEntry::default()
            },
        );
        self
    }

    /// Templates of one entity type with one name.
    pub fn by_entity_type_and_name(entity_type: &str, name: &str) -> Self {
        Self::default()
            .with_in("entityTypeName", vec![entity_type.to_string()])
            .with_in("name", vec![name.to_string()])
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterEntry {
    #[serde(rename = "in", skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_empty")]
    pub values: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_empty")]
    pub not_in: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchTemplatesResponse {
    #[serde(deserialize_with = "null_as_empty")]
    pub data: Vec<TemplateResponse>,
    pub metadata: SearchMetadata,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchMetadata {
    #[serde(deserialize_with = "null_as_empty")]
    pub sort: Vec<String>,
    pub filter: Option<BTreeMap<String, FilterEntry>>,
    pub page: PageMetadata,
    pub free_text_search: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageMetadata {
    pub total_results: u64,
    pub page: u64,
    pub limit: u64,
}

/// Service-account login body.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceLoginRequest {
    pub id: String,
    pub secret_key: String,
}

impl fmt::Debug for ServiceLoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceLoginRequest")
            .field("id", &self.id)
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccessTokenResponse {
    pub access_token: String,
    /// RFC 3339 timestamp.
    pub access_token_expiration: String,
}

impl fmt::Debug for AccessTokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessTokenResponse")
            .field("access_token", &"[REDACTED]")
            .field("access_token_expiration", &self.access_token_expiration)
            .finish()
    }
}

/// Error body of a non-2xx response. Every member may be missing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiErrorBody {
    pub code: Option<String>,
    pub message: Option<String>,
    pub trace_id: Option<String>,
    pub details: Option<ErrorDetails>,
}

impl ApiErrorBody {
    pub fn is_attribute_in_use(&self) -> bool {
        self.code.as_deref() == Some(ATTRIBUTE_IN_USE_CODE)
    }

    /// Names listed under `details.attributes`, in server order.
    pub fn attribute_names(&self) -> Vec<String> {
        self.details
            .as_ref()
            .map(|details| {
                details
                    .attributes
                    .iter()
                    .map(|attribute| attribute.name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ErrorDetails {
    #[serde(deserialize_with = "null_as_empty")]
    pub attributes: Vec<NamedRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NamedRef {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VersionStatus {
    Supported,
    Unsupported,
    #[serde(other)]
    Unrecognized,
}

impl fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Supported => write!(f, "SUPPORTED"),
            Self::Unsupported => write!(f, "UNSUPPORTED"),
            Self::Unrecognized => write!(f, "UNRECOGNIZED"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionValidationResponse {
    pub status: VersionStatus,
    #[serde(default)]
    pub provider_version: VersionInfo,
    #[serde(default, rename = "biotVersion")]
    pub platform_version: VersionInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VersionInfo {
    pub version: String,
    pub min_required: String,
}
