use thiserror::Error;

/// Core error types for template validation and shape checks
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Every element of {collection} must have a non-empty name")]
    MissingName { collection: String },

    #[error("Duplicate name \"{name}\" in {collection}")]
    DuplicateName { collection: String, name: String },

    #[error("Field {field} cannot be changed after creation (from \"{from}\" to \"{to}\")")]
    ImmutableField {
        field: String,
        from: String,
        to: String,
    },

    #[error(
        "Invalid import ID \"{0}\". Expected format: \"entity-type:template-name\" (e.g., \"caregiver:doctor\")"
    )]
    InvalidImportKey(String),

    #[error(
        "unexpected number of results for template with name=\"{name}\" and type=\"{entity_type}\": expected 1, got {count}"
    )]
    UnexpectedMatchCount {
        entity_type: String,
        name: String,
        count: usize,
    },

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CoreError {
    /// Create a new MissingName error
    pub fn missing_name(collection: impl Into<String>) -> Self {
        Self::MissingName {
            collection: collection.into(),
        }
    }

    /// Create a new DuplicateName error
    pub fn duplicate_name(collection: impl Into<String>, name: impl Into<String>) -> Self {
        Self::DuplicateName {
            collection: collection.into(),
            name: name.into(),
        }
    }

    /// Create a new ImmutableField error
    pub fn immutable_field(
        field: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self::ImmutableField {
            field: field.into(),
            from: from.into(),
            to: to.into(),
        }
    }

    /// Create a new InvalidImportKey error
    pub fn invalid_import_key(key: impl Into<String>) -> Self {
        Self::InvalidImportKey(key.into())
    }

    /// Create a new UnexpectedMatchCount error
    pub fn unexpected_match_count(
        entity_type: impl Into<String>,
        name: impl Into<String>,
        count: usize,
    ) -> Self {
        Self::UnexpectedMatchCount {
            entity_type: entity_type.into(),
            name: name.into(),
            count,
        }
    }

    /// Create a new Configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Get error category for logging/monitoring
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingName { .. }
            | Self::DuplicateName { .. }
            | Self::ImmutableField { .. }
            | Self::InvalidImportKey(_)
            | Self::UnexpectedMatchCount { .. } => ErrorCategory::Validation,
            Self::JsonError(_) => ErrorCategory::Serialization,
            Self::Configuration(_) => ErrorCategory::Configuration,
        }
    }
}

/// Error categories for monitoring and classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Serialization,
    Configuration,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Serialization => write!(f, "serialization"),
            Self::Configuration => write!(f, "configuration"),
        }
    }
}

/// Convenience result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
