//! Wire types for the template settings API.
//!
//! These mirror the server's JSON contract one to one. Conversion to and from
//! the host attribute tree lives in `tmplctl-controller`.

pub mod attribute;
pub mod envelope;
pub mod template;

pub use attribute::{
    AnalyticsDbConfiguration, AttributeResponse, BaseAttribute, Category, CustomAttributeRequest,
    IdWrapper, LinkConfiguration, NumericMetaData, OrganizationSelection,
    OrganizationSelectionConfiguration, ReferenceConfiguration, SelectableValue,
    TemplateAttributeRequest, TemplateAttributeResponse, Validation, ValidationMetadata,
};
pub use envelope::{
    ATTRIBUTE_IN_USE_CODE, AccessTokenResponse, ApiErrorBody, ErrorDetails, FilterEntry,
    NamedRef, PageMetadata, SearchMetadata, SearchRequest, SearchTemplatesResponse,
    ServiceLoginRequest, VersionInfo, VersionStatus, VersionValidationResponse,
};
pub use template::{
    BaseTemplate, CreateTemplateRequest, ParentTemplate, TemplateResponse, UpdateTemplateRequest,
};

use serde::{Deserialize, Deserializer};

/// Deserializes a JSON `null` list as an empty `Vec`.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}
