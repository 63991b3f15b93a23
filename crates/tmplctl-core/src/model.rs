//! Host-side attribute tree for the template resource.
//!
//! Every scalar the host can leave unset is a [`Field`], which keeps the three
//! states the host distinguishes apart: null (not configured), unknown (to be
//! computed during apply) and known. Nested optional blocks are `Option`s and
//! selectable-value collections are plain `Vec`s that are never null.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A host-tracked scalar: null, unknown (computed later) or a known value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Field<T> {
    #[default]
    Null,
    Unknown,
    Known(T),
}

impl<T> Field<T> {
    pub fn known(value: impl Into<T>) -> Self {
        Self::Known(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    pub fn as_known(&self) -> Option<&T> {
        match self {
            Self::Known(value) => Some(value),
            Self::Null | Self::Unknown => None,
        }
    }

    /// Null and unknown both collapse to `None`.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Known(value) => Some(value),
            Self::Null | Self::Unknown => None,
        }
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Known(value),
            None => Self::Null,
        }
    }
}

impl Field<String> {
    pub fn as_str(&self) -> Option<&str> {
        self.as_known().map(String::as_str)
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_known().serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Field::from)
    }
}

/// Declared attribute types with special handling.
pub mod attribute_type {
    pub const TIMEZONE: &str = "TIMEZONE";
    pub const LOCALE: &str = "LOCALE";

    /// Types whose selectable values are an implicit server-side enumeration.
    /// Their explicit selectable-value set is always treated as empty.
    pub fn has_implicit_values(attribute_type: &str) -> bool {
        attribute_type == TIMEZONE || attribute_type == LOCALE
    }

    const TEXTUAL: &[&str] = &[
        "LABEL",
        "PARAGRAPH",
        "EMAIL",
        "PHONE",
        "SINGLE_SELECT",
        "UUID",
        "DATE",
        "DATE_TIME",
        "TIME",
        TIMEZONE,
        LOCALE,
        "REFERENCE",
        "LINK",
        "FILE",
    ];

    /// Types whose default value is always a JSON string on the wire.
    pub fn is_textual(attribute_type: &str) -> bool {
        TEXTUAL.contains(&attribute_type)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Template {
    pub id: Field<String>,
    pub name: Field<String>,
    pub display_name: Field<String>,
    pub description: Field<String>,
    pub owner_organization_id: Field<String>,
    pub entity_type: Field<String>,
    pub analytics_db_configuration: Option<AnalyticsDbConfiguration>,
    pub parent_template_id: Field<String>,
    pub builtin_attributes: Vec<Attribute>,
    pub custom_attributes: Vec<Attribute>,
    pub template_attributes: Vec<TemplateAttribute>,
}

/// Shape shared by built-in, custom and template-value attributes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Attribute {
    pub name: Field<String>,
    pub id: Field<String>,
    pub display_name: Field<String>,
    pub phi: Field<bool>,
    #[serde(rename = "type")]
    pub attribute_type: Field<String>,
    pub category: Field<String>,
    pub reference_configuration: Option<ReferenceConfiguration>,
    pub link_configuration: Option<LinkConfiguration>,
    pub validation: Option<Validation>,
    pub numeric_meta_data: Option<NumericMetaData>,
    pub selectable_values: Vec<SelectableValue>,
    pub analytics_db_configuration: Option<AnalyticsDbConfiguration>,
}

impl Attribute {
    pub fn named(name: impl Into<String>, attribute_type: impl Into<String>) -> Self {
        Self {
            name: Field::Known(name.into()),
            attribute_type: Field::Known(attribute_type.into()),
            ..Self::default()
        }
    }

    pub fn has_implicit_values(&self) -> bool {
        self.attribute_type
            .as_str()
            .is_some_and(attribute_type::has_implicit_values)
    }
}

/// A template-value attribute: the shared shape plus a dynamic value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateAttribute {
    #[serde(flatten)]
    pub base: Attribute,
    /// `{"value": <v>}` JSON text; null when the template carries no value.
    pub value_json: Field<String>,
    pub organization_selection: Option<OrganizationSelection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectableValue {
    pub name: Field<String>,
    pub display_name: Field<String>,
    pub id: Field<String>,
}

impl SelectableValue {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Field::Known(name.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsDbConfiguration {
    pub name: Field<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceConfiguration {
    pub uniquely: Field<bool>,
    pub referenced_side_attribute_name: Field<String>,
    pub referenced_side_attribute_display_name: Field<String>,
    pub valid_templates_to_reference: Vec<String>,
    pub entity_type: Field<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfiguration {
    pub entity_type_name: Field<String>,
    pub template_id: Field<String>,
    pub attribute_id: Field<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Validation {
    pub mandatory: Field<bool>,
    /// Text form of the default value, see [`crate::value::encode`].
    pub default_value: Field<String>,
    pub min: Field<i64>,
    pub max: Field<i64>,
    pub regex: Field<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NumericMetaData {
    pub units: Field<String>,
    pub upper_range: Field<i64>,
    pub lower_range: Field<i64>,
    pub sub_type: Field<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizationSelection {
    pub allowed: Field<bool>,
    pub configuration: Option<OrganizationSelectionConfiguration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizationSelectionConfiguration {
    pub selected: Vec<IdWrapper>,
    pub all: Field<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdWrapper {
    pub id: Field<String>,
}
