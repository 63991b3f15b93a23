//! Identity reconciliation between a planned tree and the prior state.
//!
//! Attributes live in unordered, name-keyed collections and only receive their
//! opaque identifier from the server. When an operator edits an attribute the
//! plan carries no identifier for it, so without help the host would see a new
//! element (and the server would create a new attribute instead of updating
//! the existing one).
//!
//! [`reconcile`] matches planned elements to prior-state elements by `name`,
//! copies the prior identifier onto planned elements that lack one, and does
//! the same one level down for selectable values within the same-named
//! attribute. Nothing but identifiers is ever copied from prior state.

use std::collections::HashMap;

use crate::model::{Attribute, Field, SelectableValue, Template, TemplateAttribute};

/// An element joined across snapshots by its name.
pub trait Identified {
    fn name_field(&self) -> &Field<String>;
    fn id(&self) -> &Field<String>;
    fn set_id(&mut self, id: String);

    fn name(&self) -> Option<&str> {
        self.name_field().as_str()
    }

    /// The server-assigned identifier, when one is resolved.
    fn resolved_id(&self) -> Option<&str> {
        self.id().as_str().filter(|id| !id.is_empty())
    }
}

/// An attribute-like element that owns a name-keyed selectable value list.
pub trait Reconcilable: Identified {
    fn selectable_values(&self) -> &[SelectableValue];
    fn selectable_values_mut(&mut self) -> &mut [SelectableValue];
}

impl Identified for SelectableValue {
    fn name_field(&self) -> &Field<String> {
        &self.name
    }

    fn id(&self) -> &Field<String> {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = Field::Known(id);
    }
}

impl Identified for Attribute {
    fn name_field(&self) -> &Field<String> {
        &self.name
    }

    fn id(&self) -> &Field<String> {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = Field::Known(id);
    }
}

impl Reconcilable for Attribute {
    fn selectable_values(&self) -> &[SelectableValue] {
        &self.selectable_values
    }

    fn selectable_values_mut(&mut self) -> &mut [SelectableValue] {
        &mut self.selectable_values
    }
}

impl Identified for TemplateAttribute {
    fn name_field(&self) -> &Field<String> {
        self.base.name_field()
    }

    fn id(&self) -> &Field<String> {
        self.base.id()
    }

    fn set_id(&mut self, id: String) {
        self.base.set_id(id);
    }
}

impl Reconcilable for TemplateAttribute {
    fn selectable_values(&self) -> &[SelectableValue] {
        self.base.selectable_values()
    }

    fn selectable_values_mut(&mut self) -> &mut [SelectableValue] {
        self.base.selectable_values_mut()
    }
}

/// Name -> element lookup. Later entries replace earlier ones ("last write wins"
/// in the order prior state is enumerated).
fn index_by_name<E: Identified>(elements: &[E]) -> HashMap<&str, &E> {
    let mut index = HashMap::with_capacity(elements.len());
    for element in elements {
        if let Some(name) = element.name() {
            index.insert(name, element);
        }
    }
    index
}

/// Copies the prior identifier onto `planned` when it has none. Returns whether
/// an identifier was carried forward.
fn carry_id<E: Identified>(planned: &mut E, prior: &E) -> bool {
    if planned.resolved_id().is_some() {
        return false;
    }
    match prior.resolved_id() {
        Some(id) => {
            planned.set_id(id.to_string());
            true
        }
        None => false,
    }
}

/// Reconciles a planned collection against the prior-state collection.
///
/// Unmatched planned elements keep their (absent) identifier; elements that
/// only exist in prior state contribute nothing.
pub fn reconcile<E: Reconcilable>(mut planned: Vec<E>, prior: &[E]) -> Vec<E> {
    let prior_by_name = index_by_name(prior);
    let mut attribute_ids = 0usize;
    let mut value_ids = 0usize;

    for element in &mut planned {
        let Some(prior_element) = element.name().and_then(|name| prior_by_name.get(name)) else {
            continue;
        };

        if carry_id(element, *prior_element) {
            attribute_ids += 1;
        }

        let prior_values = index_by_name(prior_element.selectable_values());
        for value in element.selectable_values_mut() {
            if let Some(prior_value) = value.name().and_then(|name| prior_values.get(name))
                && carry_id(value, *prior_value)
            {
                value_ids += 1;
            }
        }
    }

    tracing::debug!(
        planned = planned.len(),
        prior = prior.len(),
        attribute_ids,
        value_ids,
        "Carried identifiers forward from prior state"
    );

    planned
}

/// Reconciles a whole template: its own identifier plus all three attribute
/// collections.
pub fn reconcile_template(mut plan: Template, prior: &Template) -> Template {
    if plan.id.as_str().is_none_or(str::is_empty)
        && let Some(id) = prior.id.as_str().filter(|id| !id.is_empty())
    {
        plan.id = Field::Known(id.to_string());
    }

    plan.builtin_attributes = reconcile(plan.builtin_attributes, &prior.builtin_attributes);
    plan.custom_attributes = reconcile(plan.custom_attributes, &prior.custom_attributes);
    plan.template_attributes = reconcile(plan.template_attributes, &prior.template_attributes);
    plan
}
