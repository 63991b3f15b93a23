//! Conversion between the host attribute tree and the template API wire types.
//!
//! Both directions are pure and total. Optional scalars travel as `Option` on
//! the wire: null and unknown tree values become `None`, an empty string stays
//! an empty string. Selectable-value lists are never null, and attributes whose
//! type carries an implicit enumeration (TIMEZONE, LOCALE) always map to an
//! empty list in both directions.

mod request;
mod response;

pub use request::{to_create_request, to_update_request};
pub use response::from_response;

use tmplctl_core::Field;

/// Required wire strings: an unset field is sent as `""`.
fn string_or_empty(field: &Field<String>) -> String {
    field.as_str().unwrap_or_default().to_string()
}

fn optional<T: Clone>(field: &Field<T>) -> Option<T> {
    field.as_known().cloned()
}

fn bool_or_false(field: &Field<bool>) -> bool {
    field.as_known().copied().unwrap_or_default()
}

/// Server-assigned IDs. An empty ID is the same as no ID.
fn request_id(field: &Field<String>) -> Option<String> {
    field.as_str().filter(|id| !id.is_empty()).map(str::to_string)
}

fn response_id(id: Option<String>) -> Field<String> {
    Field::from(id.filter(|id| !id.is_empty()))
}
