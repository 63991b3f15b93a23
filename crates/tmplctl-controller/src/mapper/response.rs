use tmplctl_api as api;
use tmplctl_core::{
    AnalyticsDbConfiguration, Attribute, DynamicValue, Field, IdWrapper, KeyedCodec,
    LinkConfiguration, NumericMetaData, OrganizationSelection, OrganizationSelectionConfiguration,
    ReferenceConfiguration, SelectableValue, Template, TemplateAttribute, Validation, encode,
};

use super::response_id;

/// Builds the state tree from a server response.
pub fn from_response(response: api::TemplateResponse) -> Template {
    let api::TemplateResponse {
        base,
        id,
        entity_type_name,
        parent_template,
        built_in_attributes,
        custom_attributes,
        template_attributes,
    } = response;

    Template {
        id: response_id(Some(id)),
        name: Field::Known(base.name),
        display_name: Field::Known(base.display_name),
        description: Field::from(base.description),
        owner_organization_id: Field::from(base.owner_organization_id),
        entity_type: Field::Known(entity_type_name),
        analytics_db_configuration: base.analytics_db_configuration.map(analytics),
        parent_template_id: response_id(parent_template.map(|parent| parent.id)),
        builtin_attributes: built_in_attributes.into_iter().map(attribute).collect(),
        custom_attributes: custom_attributes.into_iter().map(attribute).collect(),
        template_attributes: template_attributes
            .into_iter()
            .map(template_attribute)
            .collect(),
    }
}

fn attribute(response: api::AttributeResponse) -> Attribute {
    base_attribute(response.base, response.category)
}

fn template_attribute(response: api::TemplateAttributeResponse) -> TemplateAttribute {
    TemplateAttribute {
        base: base_attribute(response.base, response.category),
        value_json: Field::from(KeyedCodec::VALUE.wrap(&DynamicValue::from_json(response.value))),
        organization_selection: response.organization_selection.map(organization_selection),
    }
}

/// `validation_metadata`, `read_only` and the category display name have no
/// place in the tree and are dropped here.
fn base_attribute(base: api::BaseAttribute, category: Option<api::Category>) -> Attribute {
    let selectable_values = if tmplctl_core::attribute_type::has_implicit_values(&base.attribute_type)
    {
        Vec::new()
    } else {
        base.selectable_values
            .into_iter()
            .map(selectable_value)
            .collect()
    };

    Attribute {
        name: Field::Known(base.name),
        id: response_id(base.id),
        display_name: Field::Known(base.display_name),
        phi: Field::Known(base.phi),
        attribute_type: Field::Known(base.attribute_type),
        category: Field::from(category.map(|c| c.name)),
        reference_configuration: base.reference_configuration.map(reference),
        link_configuration: base.link_configuration.map(link),
        validation: base.validation.map(validation),
        numeric_meta_data: base.numeric_meta_data.map(numeric_meta_data),
        selectable_values,
        analytics_db_configuration: base.analytics_db_configuration.map(analytics),
    }
}

fn selectable_value(value: api::SelectableValue) -> SelectableValue {
    SelectableValue {
        name: Field::Known(value.name),
        display_name: Field::Known(value.display_name),
        id: response_id(value.id),
    }
}

fn analytics(config: api::AnalyticsDbConfiguration) -> AnalyticsDbConfiguration {
    AnalyticsDbConfiguration {
        name: Field::Known(config.name),
    }
}

fn reference(config: api::ReferenceConfiguration) -> ReferenceConfiguration {
    ReferenceConfiguration {
        uniquely: Field::Known(config.uniquely),
        referenced_side_attribute_name: Field::Known(config.referenced_side_attribute_name),
        referenced_side_attribute_display_name: Field::Known(
            config.referenced_side_attribute_display_name,
        ),
        valid_templates_to_reference: config.valid_templates_to_reference,
        entity_type: Field::Known(config.entity_type),
    }
}

fn link(config: api::LinkConfiguration) -> LinkConfiguration {
    LinkConfiguration {
        entity_type_name: Field::Known(config.entity_type_name),
        template_id: Field::Known(config.template_id),
        attribute_id: Field::Known(config.attribute_id),
    }
}

fn validation(rules: api::Validation) -> Validation {
    Validation {
        mandatory: Field::from(rules.mandatory),
        default_value: Field::from(encode(&DynamicValue::from_json(rules.default_value))),
        min: Field::from(rules.min),
        max: Field::from(rules.max),
        regex: Field::from(rules.regex),
    }
}

fn numeric_meta_data(meta: api::NumericMetaData) -> NumericMetaData {
    NumericMetaData {
        units: Field::Known(meta.units),
        upper_range: Field::from(meta.upper_range),
        lower_range: Field::from(meta.lower_range),
        sub_type: Field::Known(meta.sub_type),
    }
}

fn organization_selection(selection: api::OrganizationSelection) -> OrganizationSelection {
    OrganizationSelection {
        allowed: Field::Known(selection.allowed),
        configuration: selection
            .configuration
            .map(|config| OrganizationSelectionConfiguration {
                selected: config
                    .selected
                    .into_iter()
                    .map(|wrapper| IdWrapper {
                        id: Field::Known(wrapper.id),
                    })
                    .collect(),
                all: Field::Known(config.all),
            }),
    }
}
