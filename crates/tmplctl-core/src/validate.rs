//! Shape checks on a planned template.
//!
//! Collections are keyed by name, so every element needs one and names must be
//! unique within a collection (and within each attribute's selectable values).

use std::collections::HashSet;

use crate::error::{CoreError, Result};
use crate::model::{Field, Template};
use crate::reconcile::{Identified, Reconcilable};

fn check_names<'a, E: Identified + 'a>(
    collection: &str,
    elements: impl IntoIterator<Item = &'a E>,
) -> Result<()> {
    let mut seen = HashSet::new();
    for element in elements {
        match element.name() {
            // Unknown names are resolved later by the host and can't be checked yet.
            None if element.name_field().is_unknown() => continue,
            None | Some("") => return Err(CoreError::missing_name(collection)),
            Some(name) => {
                if !seen.insert(name) {
                    return Err(CoreError::duplicate_name(collection, name));
                }
            }
        }
    }
    Ok(())
}

/// Checks one attribute collection, including the selectable values of each
/// attribute.
pub fn validate_collection<E: Reconcilable>(collection: &str, elements: &[E]) -> Result<()> {
    check_names(collection, elements)?;
    for element in elements {
        let label = match element.name() {
            Some(name) => format!("{collection}.{name}.selectable_values"),
            None => format!("{collection}.selectable_values"),
        };
        check_names(&label, element.selectable_values())?;
    }
    Ok(())
}

/// Checks every collection of a planned template.
pub fn validate_template(template: &Template) -> Result<()> {
    validate_collection("builtin_attributes", &template.builtin_attributes)?;
    validate_collection("custom_attributes", &template.custom_attributes)?;
    validate_collection("template_attributes", &template.template_attributes)?;
    Ok(())
}

/// Rejects a change of a field the server fixes at creation time.
pub fn ensure_unchanged(field: &str, prior: &Field<String>, planned: &Field<String>) -> Result<()> {
    match (prior.as_str(), planned.as_str()) {
        (Some(from), Some(to)) if from != to => Err(CoreError::immutable_field(field, from, to)),
        _ => Ok(()),
    }
}
