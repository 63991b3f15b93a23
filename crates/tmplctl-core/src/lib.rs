pub mod error;
pub mod model;
pub mod reconcile;
pub mod validate;
pub mod value;

pub use error::{CoreError, ErrorCategory, Result};
pub use model::{
    AnalyticsDbConfiguration, Attribute, Field, IdWrapper, LinkConfiguration, NumericMetaData,
    OrganizationSelection, OrganizationSelectionConfiguration, ReferenceConfiguration,
    SelectableValue, Template, TemplateAttribute, Validation, attribute_type,
};
pub use reconcile::{Identified, Reconcilable, reconcile, reconcile_template};
pub use validate::{ensure_unchanged, validate_collection, validate_template};
pub use value::{DynamicValue, KeyedCodec, decode, encode, normalize_json};
