//! In-memory `TemplateApi` that behaves like the settings server.
//!
//! Identifiers are assigned the way the server assigns them: every template,
//! attribute and selectable value sent without an ID gets a fresh UUID. An
//! attribute sent without its ID is therefore a *new* attribute, which is what
//! makes identity reconciliation observable in tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use tmplctl_api::{
    AttributeResponse, BaseAttribute, Category, CreateTemplateRequest, CustomAttributeRequest,
    PageMetadata, ParentTemplate, SearchMetadata, SearchRequest, SearchTemplatesResponse,
    SelectableValue, TemplateAttributeRequest, TemplateAttributeResponse, TemplateResponse,
    UpdateTemplateRequest,
};
use uuid::Uuid;

use crate::auth::AccessToken;
use crate::error::RemoteError;
use crate::traits::{TemplateApi, UpdateOptions};

const IMPLICIT_TIMEZONES: &[&str] = &["UTC", "Europe/London", "America/New_York", "Asia/Jerusalem"];
const IMPLICIT_LOCALES: &[&str] = &["en_US", "en_GB", "fr_FR", "he_IL"];

#[derive(Debug, Default)]
pub struct InMemoryTemplateApi {
    templates: DashMap<String, TemplateResponse>,
    /// Template ID -> names of custom attributes holding observation data.
    in_use: DashMap<String, HashSet<String>>,
    calls: AtomicUsize,
}

impl InMemoryTemplateApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a template as-is, replacing any template with the same ID.
    pub fn insert(&self, template: TemplateResponse) {
        self.templates.insert(template.id.clone(), template);
    }

    /// Returns the stored template without counting a call.
    pub fn stored(&self, id: &str) -> Option<TemplateResponse> {
        self.templates.get(id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Marks custom attributes of a template as holding observation data.
    pub fn mark_in_use<I, S>(&self, template_id: &str, attributes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.in_use
            .entry(template_id.to_string())
            .or_default()
            .extend(attributes.into_iter().map(Into::into));
    }

    /// Number of API calls served so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    /// In-use attributes that the request would change or remove, in stored
    /// order.
    fn conflicting_attributes(
        &self,
        stored: &TemplateResponse,
        request: &UpdateTemplateRequest,
    ) -> Vec<String> {
        let Some(in_use) = self.in_use.get(&stored.id) else {
            return Vec::new();
        };
        let planned: HashMap<&str, &BaseAttribute> = request
            .custom_attributes
            .iter()
            .map(|attribute| (attribute.base.name.as_str(), &attribute.base))
            .collect();

        stored
            .custom_attributes
            .iter()
            .filter(|attribute| in_use.contains(&attribute.base.name))
            .filter(|attribute| match planned.get(attribute.base.name.as_str()) {
                Some(next) => observation_shape_changed(&attribute.base, next),
                None => true,
            })
            .map(|attribute| attribute.base.name.clone())
            .collect()
    }
}

/// A change the server refuses to apply to an attribute with observation data.
fn observation_shape_changed(stored: &BaseAttribute, planned: &BaseAttribute) -> bool {
    if stored.attribute_type != planned.attribute_type {
        return true;
    }
    if stored.id.is_some() && planned.id.is_some() && stored.id != planned.id {
        return true;
    }
    let names = |values: &[SelectableValue]| -> HashSet<String> {
        values.iter().map(|value| value.name.clone()).collect()
    };
    names(&stored.selectable_values) != names(&planned.selectable_values)
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn resolve_id(id: &Option<String>) -> String {
    match id {
        Some(id) if !id.is_empty() => id.clone(),
        _ => new_id(),
    }
}

fn implicit_values(attribute_type: &str) -> Option<&'static [&'static str]> {
    match attribute_type {
        "TIMEZONE" => Some(IMPLICIT_TIMEZONES),
        "LOCALE" => Some(IMPLICIT_LOCALES),
        _ => None,
    }
}

/// Assigns missing IDs and fills in implicit enumerations.
fn stored_attribute(attribute: &BaseAttribute) -> BaseAttribute {
    let mut stored = attribute.clone();
    stored.id = Some(resolve_id(&attribute.id));
    stored.selectable_values = match implicit_values(&attribute.attribute_type) {
        Some(values) => values
            .iter()
            .map(|value| SelectableValue {
                name: (*value).to_string(),
                display_name: (*value).to_string(),
                id: Some(new_id()),
            })
            .collect(),
        None => attribute
            .selectable_values
            .iter()
            .map(|value| SelectableValue {
                id: Some(resolve_id(&value.id)),
                ..value.clone()
            })
            .collect(),
    };
    stored
}

fn builtin_response(attribute: &BaseAttribute) -> AttributeResponse {
    AttributeResponse {
        base: stored_attribute(attribute),
        category: None,
    }
}

fn custom_response(attribute: &CustomAttributeRequest) -> AttributeResponse {
    AttributeResponse {
        base: stored_attribute(&attribute.base),
        category: Some(Category {
            name: attribute.category.clone(),
            display_name: attribute.category.clone(),
        }),
    }
}

fn template_attribute_response(attribute: &TemplateAttributeRequest) -> TemplateAttributeResponse {
    TemplateAttributeResponse {
        base: stored_attribute(&attribute.base),
        category: None,
        value: attribute.value.clone(),
        organization_selection: attribute.organization_selection.clone(),
    }
}

impl InMemoryTemplateApi {
    fn parent(&self, parent_id: Option<&String>) -> Option<ParentTemplate> {
        let id = parent_id?;
        let (name, display_name) = self
            .templates
            .get(id)
            .map(|parent| (parent.base.name.clone(), parent.base.display_name.clone()))
            .unwrap_or_default();
        Some(ParentTemplate {
            id: id.clone(),
            name,
            display_name,
        })
    }

    fn build(
        &self,
        id: String,
        entity_type: String,
        request: &UpdateTemplateRequest,
    ) -> TemplateResponse {
        TemplateResponse {
            base: request.base.clone(),
            id,
            entity_type_name: entity_type,
            parent_template: self.parent(request.parent_template_id.as_ref()),
            built_in_attributes: request
                .built_in_attributes
                .iter()
                .map(builtin_response)
                .collect(),
            custom_attributes: request.custom_attributes.iter().map(custom_response).collect(),
            template_attributes: request
                .template_attributes
                .iter()
                .map(template_attribute_response)
                .collect(),
        }
    }
}

#[async_trait]
impl TemplateApi for InMemoryTemplateApi {
    async fn create(
        &self,
        _token: &AccessToken,
        request: &CreateTemplateRequest,
    ) -> Result<TemplateResponse, RemoteError> {
        self.record_call();
        let entity_type = request.entity_type.clone();
        let template = self.build(new_id(), entity_type, &request.clone().into());
        tracing::debug!(template_id = %template.id, name = %template.base.name, "Stored new template");
        self.insert(template.clone());
        Ok(template)
    }

    async fn update(
        &self,
        _token: &AccessToken,
        id: &str,
        request: &UpdateTemplateRequest,
        options: UpdateOptions,
    ) -> Result<TemplateResponse, RemoteError> {
        self.record_call();
        let stored = self.stored(id).ok_or_else(|| RemoteError::not_found(id))?;

        if !options.force {
            let conflicts = self.conflicting_attributes(&stored, request);
            if !conflicts.is_empty() {
                return Err(RemoteError::attribute_in_use(conflicts));
            }
        }

        let template = self.build(stored.id.clone(), stored.entity_type_name.clone(), request);
        tracing::debug!(template_id = %id, force = options.force, "Replaced template");
        self.insert(template.clone());
        Ok(template)
    }

    async fn get(&self, _token: &AccessToken, id: &str) -> Result<TemplateResponse, RemoteError> {
        self.record_call();
        self.stored(id).ok_or_else(|| RemoteError::not_found(id))
    }

    async fn delete(&self, _token: &AccessToken, id: &str) -> Result<(), RemoteError> {
        self.record_call();
        self.in_use.remove(id);
        self.templates
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| RemoteError::not_found(id))
    }

    async fn search(
        &self,
        _token: &AccessToken,
        request: &SearchRequest,
    ) -> Result<SearchTemplatesResponse, RemoteError> {
        self.record_call();
        let matches = |field: &str, value: &str| {
            request
                .filter
                .get(field)
                .is_none_or(|entry| entry.values.iter().any(|candidate| candidate == value))
        };

        let mut data: Vec<TemplateResponse> = self
            .templates
            .iter()
            .map(|entry| entry.value().clone())
            .filter(|template| {
                matches("entityTypeName", &template.entity_type_name)
                    && matches("name", &template.base.name)
            })
            .collect();
        data.sort_by(|a, b| a.id.cmp(&b.id));

        let total_results = data.len() as u64;
        Ok(SearchTemplatesResponse {
            data,
            metadata: SearchMetadata {
                filter: Some(request.filter.clone()),
                page: PageMetadata {
                    total_results,
                    page: 0,
                    limit: total_results,
                },
                ..SearchMetadata::default()
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tmplctl_api::BaseTemplate;

    fn token() -> AccessToken {
        AccessToken::new("test")
    }

    fn attribute(name: &str, attribute_type: &str, values: &[&str]) -> BaseAttribute {
        BaseAttribute {
            name: name.into(),
            display_name: name.into(),
            attribute_type: attribute_type.into(),
            selectable_values: values
                .iter()
                .map(|value| SelectableValue {
                    name: (*value).into(),
                    display_name: (*value).into(),
                    id: None,
                })
                .collect(),
            ..BaseAttribute::default()
        }
    }

    fn request(name: &str, custom: Vec<BaseAttribute>) -> CreateTemplateRequest {
        CreateTemplateRequest {
            base: BaseTemplate {
                name: name.into(),
                display_name: name.into(),
                ..BaseTemplate::default()
            },
            entity_type: "caregiver".into(),
            custom_attributes: custom
                .into_iter()
                .map(|base| CustomAttributeRequest {
                    base,
                    category: "REGULAR".into(),
                })
                .collect(),
            ..CreateTemplateRequest::default()
        }
    }

    #[tokio::test]
    async fn create_assigns_ids_everywhere() {
        let api = InMemoryTemplateApi::new();
        let created = api
            .create(&token(), &request("doctor", vec![attribute("unit", "SINGLE_SELECT", &["kg"])]))
            .await
            .unwrap();

        assert!(!created.id.is_empty());
        assert_eq!(created.entity_type_name, "caregiver");
        let unit = &created.custom_attributes[0];
        assert!(unit.base.id.is_some());
        assert!(unit.base.selectable_values[0].id.is_some());
        assert_eq!(unit.category.as_ref().unwrap().name, "REGULAR");
        assert_eq!(api.len(), 1);
    }

    #[tokio::test]
    async fn implicit_enumerations_are_filled_in() {
        let api = InMemoryTemplateApi::new();
        let created = api
            .create(&token(), &request("doctor", vec![attribute("tz", "TIMEZONE", &[])]))
            .await
            .unwrap();
        assert_eq!(
            created.custom_attributes[0].base.selectable_values.len(),
            IMPLICIT_TIMEZONES.len()
        );
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let api = InMemoryTemplateApi::new();
        let err = api.get(&token(), "missing").await.unwrap_err();
        assert!(err.is_not_found());
        let err = api.delete(&token(), "missing").await.unwrap_err();
        assert!(err.is_not_found());
        let err = api
            .update(&token(), "missing", &UpdateTemplateRequest::default(), UpdateOptions::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(api.call_count(), 3);
    }

    #[tokio::test]
    async fn update_without_ids_creates_new_attributes() {
        let api = InMemoryTemplateApi::new();
        let created = api
            .create(&token(), &request("doctor", vec![attribute("weight", "DECIMAL", &[])]))
            .await
            .unwrap();

        let update: UpdateTemplateRequest =
            request("doctor", vec![attribute("weight", "DECIMAL", &[])]).into();
        let updated = api
            .update(&token(), &created.id, &update, UpdateOptions::default())
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_ne!(
            updated.custom_attributes[0].base.id,
            created.custom_attributes[0].base.id
        );
    }

    #[tokio::test]
    async fn in_use_attributes_block_unforced_updates() {
        let api = InMemoryTemplateApi::new();
        let created = api
            .create(
                &token(),
                &request(
                    "doctor",
                    vec![
                        attribute("age", "INTEGER", &[]),
                        attribute("height", "DECIMAL", &[]),
                        attribute("notes", "PARAGRAPH", &[]),
                    ],
                ),
            )
            .await
            .unwrap();
        api.mark_in_use(&created.id, ["age", "height", "notes"]);

        let mut update: UpdateTemplateRequest = request(
            "doctor",
            vec![
                attribute("age", "DECIMAL", &[]),
                attribute("notes", "PARAGRAPH", &[]),
            ],
        )
        .into();
        for (attribute, stored) in update
            .custom_attributes
            .iter_mut()
            .zip([&created.custom_attributes[0], &created.custom_attributes[2]])
        {
            attribute.base.id = stored.base.id.clone();
        }

        let err = api
            .update(&token(), &created.id, &update, UpdateOptions::default())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            RemoteError::attribute_in_use(vec!["age".into(), "height".into()])
        );

        let forced = api
            .update(&token(), &created.id, &update, UpdateOptions::forced(true))
            .await
            .unwrap();
        assert_eq!(forced.custom_attributes.len(), 2);
    }

    #[tokio::test]
    async fn search_filters_by_entity_type_and_name() {
        let api = InMemoryTemplateApi::new();
        api.create(&token(), &request("doctor", vec![])).await.unwrap();
        api.create(&token(), &request("nurse", vec![])).await.unwrap();

        let found = api
            .search(&token(), &SearchRequest::by_entity_type_and_name("caregiver", "doctor"))
            .await
            .unwrap();
        assert_eq!(found.metadata.page.total_results, 1);
        assert_eq!(found.data[0].base.name, "doctor");

        let none = api
            .search(&token(), &SearchRequest::by_entity_type_and_name("patient", "doctor"))
            .await
            .unwrap();
        assert_eq!(none.metadata.page.total_results, 0);
    }
}
