//! Errors returned by remote collaborators.

use std::fmt;

/// Errors that can occur when talking to the template API or the authenticator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RemoteError {
    /// The referenced template does not exist remotely.
    #[error("resource not found: template {id}")]
    NotFound {
        /// The ID that was looked up.
        id: String,
    },

    /// An update would change attributes that already hold observation data.
    #[error("attributes in use: {}", attributes.join(", "))]
    AttributeInUse {
        /// Offending attribute names, in server order.
        attributes: Vec<String>,
    },

    /// Any other non-success response.
    #[error("server error (status: [{status}], code: [{code}], traceId: [{trace_id}]): [{message}]")]
    Api {
        status: u16,
        code: String,
        trace_id: String,
        message: String,
    },

    /// Logging in or obtaining a token failed.
    #[error("authentication failed: {message}")]
    Authentication { message: String },

    /// The request never produced a response.
    #[error("transport error: {message}")]
    Transport { message: String },

    /// A response body could not be decoded.
    #[error("invalid response body: {message}")]
    Decode { message: String },
}

impl RemoteError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Creates a new `AttributeInUse` error.
    #[must_use]
    pub fn attribute_in_use(attributes: Vec<String>) -> Self {
        Self::AttributeInUse { attributes }
    }

    /// Creates a new `Api` error.
    #[must_use]
    pub fn api(
        status: u16,
        code: impl Into<String>,
        trace_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Api {
            status,
            code: code.into(),
            trace_id: trace_id.into(),
            message: message.into(),
        }
    }

    /// Creates a new `Authentication` error.
    #[must_use]
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Creates a new `Transport` error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates a new `Decode` error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::AttributeInUse { .. } => ErrorCategory::Conflict,
            Self::Api { .. } => ErrorCategory::Api,
            Self::Authentication { .. } => ErrorCategory::Authentication,
            Self::Transport { .. } => ErrorCategory::Transport,
            Self::Decode { .. } => ErrorCategory::Serialization,
        }
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(err: serde_json::Error) -> Self {
        Self::decode(err.to_string())
    }
}

/// Categories of remote errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    NotFound,
    Conflict,
    Api,
    Authentication,
    Transport,
    Serialization,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::Api => write!(f, "api"),
            Self::Authentication => write!(f, "authentication"),
            Self::Transport => write!(f, "transport"),
            Self::Serialization => write!(f, "serialization"),
        }
    }
}
