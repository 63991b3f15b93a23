//! Contracts for the remote template API and the authenticator, plus an
//! in-memory `TemplateApi` with server semantics.
//!
//! The controller only ever talks to these traits. `tmplctl-http` provides the
//! network implementation.

pub mod auth;
pub mod error;
pub mod memory;
pub mod traits;

pub use auth::{AccessToken, StaticAuthenticator};
pub use error::{ErrorCategory, RemoteError};
pub use memory::InMemoryTemplateApi;
pub use traits::{Authenticator, TemplateApi, UpdateOptions};

/// Type alias for a shareable template API.
pub type DynTemplateApi = std::sync::Arc<dyn TemplateApi>;

/// Type alias for a shareable authenticator.
pub type DynAuthenticator = std::sync::Arc<dyn Authenticator>;
