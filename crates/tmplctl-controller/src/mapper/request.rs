use serde_json::Value;
use tmplctl_api as api;
use tmplctl_core::{
    AnalyticsDbConfiguration, Attribute, KeyedCodec, LinkConfiguration, NumericMetaData,
    OrganizationSelection, ReferenceConfiguration, SelectableValue, Template, TemplateAttribute,
    Validation, attribute_type, decode,
};

use super::{bool_or_false, optional, request_id, string_or_empty};

pub fn to_create_request(template: &Template) -> api::CreateTemplateRequest {
    api::CreateTemplateRequest {
        base: base_template(template),
        entity_type: string_or_empty(&template.entity_type),
        parent_template_id: optional(&template.parent_template_id),
        built_in_attributes: template.builtin_attributes.iter().map(base_attribute).collect(),
        custom_attributes: template.custom_attributes.iter().map(custom_attribute).collect(),
        template_attributes: template
            .template_attributes
            .iter()
            .map(template_attribute)
            .collect(),
    }
}

/// Same payload as create, minus the entity type which cannot change.
pub fn to_update_request(template: &Template) -> api::UpdateTemplateRequest {
    to_create_request(template).into()
}

fn base_template(template: &Template) -> api::BaseTemplate {
    api::BaseTemplate {
        display_name: string_or_empty(&template.display_name),
        name: string_or_empty(&template.name),
        description: optional(&template.description),
        owner_organization_id: optional(&template.owner_organization_id),
        analytics_db_configuration: analytics(template.analytics_db_configuration.as_ref()),
    }
}

fn base_attribute(attribute: &Attribute) -> api::BaseAttribute {
    let declared_type = string_or_empty(&attribute.attribute_type);
    let selectable_values = if attribute.has_implicit_values() {
        Vec::new()
    } else {
        attribute.selectable_values.iter().map(selectable_value).collect()
    };

    api::BaseAttribute {
        name: string_or_empty(&attribute.name),
        id: request_id(&attribute.id),
        display_name: string_or_empty(&attribute.display_name),
        phi: bool_or_false(&attribute.phi),
        reference_configuration: attribute.reference_configuration.as_ref().map(reference),
        link_configuration: attribute.link_configuration.as_ref().map(link),
        validation: attribute
            .validation
            .as_ref()
            .map(|v| validation(v, &declared_type)),
        numeric_meta_data: attribute.numeric_meta_data.as_ref().map(numeric_meta_data),
        attribute_type: declared_type,
        selectable_values,
        analytics_db_configuration: analytics(attribute.analytics_db_configuration.as_ref()),
        validation_metadata: None,
        read_only: false,
    }
}

fn custom_attribute(attribute: &Attribute) -> api::CustomAttributeRequest {
    api::CustomAttributeRequest {
        base: base_attribute(attribute),
        category: string_or_empty(&attribute.category),
    }
}

fn template_attribute(attribute: &TemplateAttribute) -> api::TemplateAttributeRequest {
    let value = attribute
        .value_json
        .as_str()
        .and_then(|text| KeyedCodec::VALUE.unwrap(text).to_json());

    api::TemplateAttributeRequest {
        base: base_attribute(&attribute.base),
        value,
        organization_selection: attribute
            .organization_selection
            .as_ref()
            .map(organization_selection),
    }
}

fn selectable_value(value: &SelectableValue) -> api::SelectableValue {
    api::SelectableValue {
        name: string_or_empty(&value.name),
        display_name: string_or_empty(&value.display_name),
        id: request_id(&value.id),
    }
}

/// An analytics block without a known name is not sent at all.
fn analytics(config: Option<&AnalyticsDbConfiguration>) -> Option<api::AnalyticsDbConfiguration> {
    let name = config?.name.as_str()?;
    Some(api::AnalyticsDbConfiguration {
        name: name.to_string(),
    })
}

fn reference(config: &ReferenceConfiguration) -> api::ReferenceConfiguration {
    api::ReferenceConfiguration {
        uniquely: bool_or_false(&config.uniquely),
        referenced_side_attribute_name: string_or_empty(&config.referenced_side_attribute_name),
        referenced_side_attribute_display_name: string_or_empty(
            &config.referenced_side_attribute_display_name,
        ),
        valid_templates_to_reference: config.valid_templates_to_reference.clone(),
        entity_type: string_or_empty(&config.entity_type),
    }
}

fn link(config: &LinkConfiguration) -> api::LinkConfiguration {
    api::LinkConfiguration {
        entity_type_name: string_or_empty(&config.entity_type_name),
        template_id: string_or_empty(&config.template_id),
        attribute_id: string_or_empty(&config.attribute_id),
    }
}

fn validation(rules: &Validation, declared_type: &str) -> api::Validation {
    api::Validation {
        mandatory: optional(&rules.mandatory),
        default_value: rules
            .default_value
            .as_str()
            .and_then(|text| default_value(text, declared_type)),
        min: optional(&rules.min),
        max: optional(&rules.max),
        regex: optional(&rules.regex),
    }
}

/// Textual types send the default verbatim as a string, so `007` stays `"007"`.
/// Other types decode the text, and an empty default is omitted.
fn default_value(text: &str, declared_type: &str) -> Option<Value> {
    if attribute_type::is_textual(declared_type) {
        return Some(Value::String(text.to_string()));
    }
    if text.is_empty() {
        return None;
    }
    decode(text).to_json()
}

fn numeric_meta_data(meta: &NumericMetaData) -> api::NumericMetaData {
    api::NumericMetaData {
        units: string_or_empty(&meta.units),
        upper_range: optional(&meta.upper_range),
        lower_range: optional(&meta.lower_range),
        sub_type: string_or_empty(&meta.sub_type),
    }
}

fn organization_selection(selection: &OrganizationSelection) -> api::OrganizationSelection {
    api::OrganizationSelection {
        allowed: bool_or_false(&selection.allowed),
        configuration: selection.configuration.as_ref().map(|config| {
            api::OrganizationSelectionConfiguration {
                selected: config
                    .selected
                    .iter()
                    .map(|wrapper| api::IdWrapper {
                        id: string_or_empty(&wrapper.id),
                    })
                    .collect(),
                all: bool_or_false(&config.all),
            }
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_json_diff::assert_json_eq;
    use serde_json::json;
    use tmplctl_core::{Field, IdWrapper, OrganizationSelectionConfiguration};

    fn weight() -> Attribute {
        Attribute {
            id: Field::known("A1"),
            display_name: Field::known("Weight"),
            category: Field::known("REGULAR"),
            validation: Some(Validation {
                mandatory: Field::known(true),
                default_value: Field::known("72.5"),
                min: Field::known(0),
                ..Validation::default()
            }),
            numeric_meta_data: Some(NumericMetaData {
                units: Field::known("kg"),
                upper_range: Field::known(500),
                lower_range: Field::Unknown,
                sub_type: Field::known("DOUBLE"),
            }),
            selectable_values: vec![SelectableValue::named("kg")],
            ..Attribute::named("weight", "DECIMAL")
        }
    }

    fn template() -> Template {
        Template {
            name: Field::known("doctor"),
            display_name: Field::known("Doctor"),
            description: Field::known(""),
            owner_organization_id: Field::Unknown,
            entity_type: Field::known("caregiver"),
            custom_attributes: vec![weight()],
            ..Template::default()
        }
    }

    #[test]
    fn create_request_wire_shape() {
        let request = to_create_request(&template());
        assert_json_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "displayName": "Doctor",
                "name": "doctor",
                "description": "",
                "ownerOrganizationId": null,
                "analyticsDbConfiguration": null,
                "entityType": "caregiver",
                "parentTemplateId": null,
                "builtInAttributes": [],
                "customAttributes": [{
                    "name": "weight",
                    "id": "A1",
                    "displayName": "Weight",
                    "phi": false,
                    "referenceConfiguration": null,
                    "linkConfiguration": null,
                    "validation": {"mandatory": true, "defaultValue": 72.5, "min": 0},
                    "numericMetaData": {
                        "units": "kg",
                        "upperRange": 500,
                        "lowerRange": null,
                        "subType": "DOUBLE"
                    },
                    "type": "DECIMAL",
                    "selectableValues": [{"name": "kg", "displayName": ""}],
                    "analyticsDbConfiguration": null,
                    "category": "REGULAR"
                }],
                "templateAttributes": []
            })
        );
    }

    #[test]
    fn update_request_drops_entity_type() {
        let value = serde_json::to_value(to_update_request(&template())).unwrap();
        assert!(value.get("entityType").is_none());
        assert_eq!(value["customAttributes"][0]["id"], "A1");
    }

    #[test]
    fn implicit_enumerations_are_never_sent() {
        let mut tz = Attribute::named("tz", "TIMEZONE");
        tz.selectable_values = vec![SelectableValue::named("UTC")];
        let mut template = template();
        template.builtin_attributes = vec![tz];

        let request = to_create_request(&template);
        assert!(request.built_in_attributes[0].selectable_values.is_empty());
    }

    #[test]
    fn default_values_follow_declared_type() {
        assert_eq!(default_value("007", "LABEL"), Some(json!("007")));
        assert_eq!(default_value("", "LABEL"), Some(json!("")));
        assert_eq!(default_value("007", "INTEGER"), Some(json!(7)));
        assert_eq!(default_value("7", "INTEGER"), Some(json!(7)));
        assert_eq!(default_value("\"007\"", "INTEGER"), Some(json!("007")));
        assert_eq!(default_value("{\"a\":1}", "OBJECT"), Some(json!({"a": 1})));
        assert_eq!(default_value("", "INTEGER"), None);
    }

    #[test]
    fn template_value_is_unwrapped() {
        let attribute = TemplateAttribute {
            base: Attribute::named("color", "LABEL"),
            value_json: Field::known(r#"{"value": "red"}"#),
            organization_selection: Some(OrganizationSelection {
                allowed: Field::known(true),
                configuration: Some(OrganizationSelectionConfiguration {
                    selected: vec![IdWrapper {
                        id: Field::known("org-1"),
                    }],
                    all: Field::Null,
                }),
            }),
        };
        let request = template_attribute(&attribute);
        assert_eq!(request.value, Some(json!("red")));
        let selection = request.organization_selection.unwrap();
        assert!(selection.allowed);
        let config = selection.configuration.unwrap();
        assert_eq!(config.selected[0].id, "org-1");
        assert!(!config.all);
    }

    #[test]
    fn absent_template_value_is_none() {
        let mut attribute = TemplateAttribute {
            base: Attribute::named("color", "LABEL"),
            ..TemplateAttribute::default()
        };
        assert_eq!(template_attribute(&attribute).value, None);

        attribute.value_json = Field::known(r#"{"other": 1}"#);
        assert_eq!(template_attribute(&attribute).value, None);

        attribute.value_json = Field::known("not json");
        assert_eq!(template_attribute(&attribute).value, None);
    }

    #[test]
    fn analytics_without_name_is_omitted() {
        assert_eq!(analytics(None), None);
        assert_eq!(
            analytics(Some(&AnalyticsDbConfiguration {
                name: Field::Unknown
            })),
            None
        );
        assert_eq!(
            analytics(Some(&AnalyticsDbConfiguration {
                name: Field::known("sink")
            })),
            Some(api::AnalyticsDbConfiguration {
                name: "sink".into()
            })
        );
    }

    #[test]
    fn empty_and_unknown_ids_are_not_sent() {
        let mut value = SelectableValue::named("kg");
        value.id = Field::known("");
        assert_eq!(selectable_value(&value).id, None);
        value.id = Field::Unknown;
        assert_eq!(selectable_value(&value).id, None);
    }
}
