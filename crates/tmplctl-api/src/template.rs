use serde::{Deserialize, Serialize};

use crate::attribute::{
    AnalyticsDbConfiguration, AttributeResponse, BaseAttribute, CustomAttributeRequest,
    TemplateAttributeRequest, TemplateAttributeResponse,
};
use crate::null_as_empty;

/// Fields shared by every template payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BaseTemplate {
    pub display_name: String,
    pub name: String,
    pub description: Option<String>,
    pub owner_organization_id: Option<String>,
    pub analytics_db_configuration: Option<AnalyticsDbConfiguration>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateTemplateRequest {
    #[serde(flatten)]
    pub base: BaseTemplate,
    pub entity_type: String,
    pub parent_template_id: Option<String>,
    pub built_in_attributes: Vec<BaseAttribute>,
    pub custom_attributes: Vec<CustomAttributeRequest>,
    pub template_attributes: Vec<TemplateAttributeRequest>,
}

/// Update payload. The entity type is fixed at creation and is not sent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateTemplateRequest {
    #[serde(flatten)]
    pub base: BaseTemplate,
    pub parent_template_id: Option<String>,
    pub built_in_attributes: Vec<BaseAttribute>,
    pub custom_attributes: Vec<CustomAttributeRequest>,
    pub template_attributes: Vec<TemplateAttributeRequest>,
}

impl From<CreateTemplateRequest> for UpdateTemplateRequest {
    fn from(request: CreateTemplateRequest) -> Self {
        Self {
            base: request.base,
            parent_template_id: request.parent_template_id,
            built_in_attributes: request.built_in_attributes,
            custom_attributes: request.custom_attributes,
            template_attributes: request.template_attributes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParentTemplate {
    pub id: String,
    pub display_name: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TemplateResponse {
    #[serde(flatten)]
    pub base: BaseTemplate,
    pub id: String,
    pub entity_type_name: String,
    pub parent_template: Option<ParentTemplate>,
    #[serde(deserialize_with = "null_as_empty")]
    pub built_in_attributes: Vec<AttributeResponse>,
    #[serde(deserialize_with = "null_as_empty")]
    pub custom_attributes: Vec<AttributeResponse>,
    #[serde(deserialize_with = "null_as_empty")]
    pub template_attributes: Vec<TemplateAttributeResponse>,
}
