use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

use crate::null_as_empty;

/// The attribute shape shared by requests and responses.
///
/// `validation_metadata` and `read_only` only ever come back from the server.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BaseAttribute {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub display_name: String,
    pub phi: bool,
    pub reference_configuration: Option<ReferenceConfiguration>,
    pub link_configuration: Option<LinkConfiguration>,
    pub validation: Option<Validation>,
    pub numeric_meta_data: Option<NumericMetaData>,
    #[serde(rename = "type")]
    pub attribute_type: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub selectable_values: Vec<SelectableValue>,
    pub analytics_db_configuration: Option<AnalyticsDbConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_metadata: Option<ValidationMetadata>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub read_only: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomAttributeRequest {
    #[serde(flatten)]
    pub base: BaseAttribute,
    pub category: String,
}

/// A built-in or custom attribute as returned by the server.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttributeResponse {
    #[serde(flatten)]
    pub base: BaseAttribute,
    pub category: Option<Category>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TemplateAttributeRequest {
    #[serde(flatten)]
    pub base: BaseAttribute,
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_selection: Option<OrganizationSelection>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TemplateAttributeResponse {
    #[serde(flatten)]
    pub base: BaseAttribute,
    pub category: Option<Category>,
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_selection: Option<OrganizationSelection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsDbConfiguration {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReferenceConfiguration {
    pub uniquely: bool,
    pub referenced_side_attribute_name: String,
    pub referenced_side_attribute_display_name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub valid_templates_to_reference: Vec<String>,
    pub entity_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinkConfiguration {
    pub entity_type_name: String,
    pub template_id: String,
    pub attribute_id: String,
}

/// Validation rules. Every member is omitted from requests when unset, and
/// `default_value` is an arbitrary JSON value on the wire.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Validation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mandatory: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_i64"
    )]
    pub min: Option<i64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_i64"
    )]
    pub max: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
}

/// Bounds are integral, but the server may render them as `5.0`.
fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let Some(number) = Option::<Number>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Some(n) = number.as_i64() {
        return Ok(Some(n));
    }
    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            Ok(Some(f as i64))
        }
        _ => Err(serde::de::Error::custom(format!(
            "expected an integral bound, got {number}"
        ))),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidationMetadata {
    pub mandatory_read_only: bool,
    pub system_mandatory: bool,
    pub phi_read_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NumericMetaData {
    pub units: String,
    pub upper_range: Option<i64>,
    pub lower_range: Option<i64>,
    pub sub_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Category {
    pub name: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectableValue {
    pub name: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrganizationSelection {
    pub allowed: bool,
    pub configuration: Option<OrganizationSelectionConfiguration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrganizationSelectionConfiguration {
    #[serde(deserialize_with = "null_as_empty")]
    pub selected: Vec<IdWrapper>,
    pub all: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IdWrapper {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_json_diff::assert_json_eq;
    use serde_json::json;

    #[test]
    fn validation_bounds_accept_integral_floats_only() {
        let validation: Validation = serde_json::from_value(json!({"min": 5.0, "max": 10})).unwrap();
        assert_eq!(validation.min, Some(5));
        assert_eq!(validation.max, Some(10));

        let validation: Validation = serde_json::from_value(json!({"min": null})).unwrap();
        assert_eq!(validation.min, None);

        assert!(serde_json::from_value::<Validation>(json!({"min": 1.5})).is_err());
    }

    #[test]
    fn request_omits_unset_ids_and_response_only_fields() {
        let attribute = CustomAttributeRequest {
            base: BaseAttribute {
                name: "weight".into(),
                display_name: "Weight".into(),
                attribute_type: "DECIMAL".into(),
                selectable_values: vec![SelectableValue {
                    name: "kg".into(),
                    display_name: "Kilogram".into(),
                    id: None,
                }],
                validation: Some(Validation {
                    min: Some(0),
                    ..Validation::default()
                }),
                ..BaseAttribute::default()
            },
            category: "REGULAR".into(),
        };

        assert_json_eq!(
            serde_json::to_value(&attribute).unwrap(),
            json!({
                "name": "weight",
                "displayName": "Weight",
                "phi": false,
                "referenceConfiguration": null,
                "linkConfiguration": null,
                "validation": {"min": 0},
                "numericMetaData": null,
                "type": "DECIMAL",
                "selectableValues": [{"name": "kg", "displayName": "Kilogram"}],
                "analyticsDbConfiguration": null,
                "category": "REGULAR"
            })
        );
    }

    #[test]
    fn template_attribute_value_is_sent_as_null_when_unset() {
        let attribute = TemplateAttributeRequest {
            base: BaseAttribute {
                name: "color".into(),
                id: Some("V1".into()),
                ..BaseAttribute::default()
            },
            value: None,
            organization_selection: None,
        };
        let value = serde_json::to_value(&attribute).unwrap();
        assert_eq!(value["value"], Value::Null);
        assert_eq!(value["id"], "V1");
        assert!(value.get("organizationSelection").is_none());
    }

    #[test]
    fn response_decodes_server_only_members() {
        let attribute: TemplateAttributeResponse = serde_json::from_value(json!({
            "name": "color",
            "id": "V1",
            "displayName": "Color",
            "type": "LABEL",
            "phi": false,
            "selectableValues": null,
            "category": {"name": "REGULAR", "displayName": "Regular"},
            "validation": {"mandatory": true, "defaultValue": 7, "min": 1.0, "max": null},
            "validationMetadata": {"mandatoryReadOnly": true, "systemMandatory": false, "phiReadOnly": true},
            "readOnly": true,
            "value": {"nested": [1, 2]},
            "organizationSelection": {"allowed": true, "configuration": {"all": false, "selected": [{"id": "O1"}]}}
        }))
        .unwrap();

        assert_eq!(attribute.base.id.as_deref(), Some("V1"));
        assert!(attribute.base.selectable_values.is_empty());
        assert!(attribute.base.read_only);
        assert_eq!(attribute.category.unwrap().name, "REGULAR");
        let validation = attribute.base.validation.unwrap();
        assert_eq!(validation.default_value, Some(json!(7)));
        assert_eq!(validation.min, Some(1));
        assert_eq!(validation.max, None);
        assert_eq!(attribute.value, Some(json!({"nested": [1, 2]})));
        let selection = attribute.organization_selection.unwrap();
        assert_eq!(selection.configuration.unwrap().selected[0].id, "O1");
    }
}
