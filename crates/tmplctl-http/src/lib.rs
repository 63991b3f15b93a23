//! HTTP transport for the template settings API.
//!
//! [`HttpTemplateApi`] implements `tmplctl_remote::TemplateApi` over `reqwest`;
//! [`ServiceAuthenticator`] logs in as a service account and caches the token
//! in memory.

pub mod auth;
pub mod client;

pub use auth::ServiceAuthenticator;
pub use client::{HttpTemplateApi, build_http_client};
