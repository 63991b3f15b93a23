//! Errors the controller reports to the orchestration host.

use std::fmt;

use thiserror::Error;
use tmplctl_core::CoreError;
use tmplctl_remote::RemoteError;

use crate::conflict::destructive_change_warning;
use crate::config::FORCE_UPDATE_ENV;

/// The remote call a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    Import,
    ValidateVersions,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create template"),
            Self::Read => write!(f, "read template"),
            Self::Update => write!(f, "update template"),
            Self::Delete => write!(f, "delete template"),
            Self::Import => write!(f, "import template"),
            Self::ValidateVersions => write!(f, "validate versions"),
        }
    }
}

fn bracketed(target: &Option<String>) -> String {
    target
        .as_deref()
        .map(|target| format!(" [{target}]"))
        .unwrap_or_default()
}

#[derive(Debug, Error)]
pub enum ControllerError {
    /// Plan or input shape errors.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A remote call failed. The remote error is kept verbatim.
    #[error("Failed to {operation}{}: {source}", bracketed(.target))]
    Remote {
        operation: Operation,
        target: Option<String>,
        #[source]
        source: RemoteError,
    },

    /// The update would drop observation data and no override was given.
    #[error("{}", destructive_change_warning(.attributes))]
    DestructiveChange { attributes: Vec<String> },

    #[error("Value [{value:?}] is not a valid boolean (expected: true / false)")]
    InvalidForceUpdate { value: String },

    #[error("versions are not compatible. {details}")]
    UnsupportedVersion { details: String },

    #[error("Failed to {operation}: the template has no ID in state")]
    MissingId { operation: Operation },
}

impl ControllerError {
    pub fn remote(operation: Operation, target: Option<&str>, source: RemoteError) -> Self {
        Self::Remote {
            operation,
            target: target.map(str::to_string),
            source,
        }
    }

    pub fn invalid_force_update(value: impl Into<String>) -> Self {
        Self::InvalidForceUpdate {
            value: value.into(),
        }
    }

    /// The host-facing rendering of this error.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let summary = match self {
            Self::Core(CoreError::InvalidImportKey(_)) => "Invalid import ID format".to_string(),
            Self::Core(
                CoreError::MissingName { .. }
                | CoreError::DuplicateName { .. }
                | CoreError::ImmutableField { .. },
            ) => "Invalid plan".to_string(),
            Self::Core(CoreError::UnexpectedMatchCount {
                entity_type, name, ..
            }) => format!("Failed to import template [entityType: {entity_type:?} and name: {name:?}]"),
            Self::Core(CoreError::JsonError(_)) => "Serialization Error".to_string(),
            Self::Core(CoreError::Configuration(_)) => "Invalid provider configuration".to_string(),
            Self::Remote { .. } => "API Error".to_string(),
            Self::DestructiveChange { .. } => "DESTRUCTIVE CHANGE WARNING".to_string(),
            Self::InvalidForceUpdate { .. } => format!("Invalid {FORCE_UPDATE_ENV} value"),
            Self::UnsupportedVersion { .. } => "Unsupported version".to_string(),
            Self::MissingId { .. } => "Invalid state".to_string(),
        };
        Diagnostic {
            summary,
            detail: self.to_string(),
        }
    }
}

impl From<ControllerError> for Diagnostic {
    fn from(err: ControllerError) -> Self {
        err.to_diagnostic()
    }
}

/// A blocking error as shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub summary: String,
    pub detail: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.summary, self.detail)
    }
}

pub type Result<T> = std::result::Result<T, ControllerError>;
