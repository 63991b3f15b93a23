//! The template resource controller.
//!
//! Drives create, read, update, delete and import for one template against a
//! [`TemplateApi`](tmplctl_remote::TemplateApi), using the mapper for wire
//! conversion and the reconciler to keep server-assigned identifiers stable
//! across plans.

use tmplctl_api::SearchRequest;
use tmplctl_core::{
    CoreError, Field, Template, ensure_unchanged, normalize_json, reconcile_template,
    validate_template,
};
use tmplctl_remote::{AccessToken, DynAuthenticator, DynTemplateApi, RemoteError, UpdateOptions};

use crate::config::ForceUpdate;
use crate::error::{ControllerError, Operation, Result};
use crate::import::ImportKey;
use crate::mapper::{from_response, to_create_request, to_update_request};

/// What a read found upstream.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome {
    Found(Template),
    /// The template is gone and the host should forget it.
    Removed,
}

#[derive(Clone)]
pub struct TemplateController {
    api: DynTemplateApi,
    auth: DynAuthenticator,
    force_update: ForceUpdate,
}

impl TemplateController {
    pub fn new(api: DynTemplateApi, auth: DynAuthenticator) -> Self {
        Self {
            api,
            auth,
            force_update: ForceUpdate::default(),
        }
    }

    pub fn with_force_update(mut self, force_update: ForceUpdate) -> Self {
        self.force_update = force_update;
        self
    }

    /// Corrects a plan before the host diffs it: validates names, normalizes
    /// template values, drops values of implicitly enumerated attributes and,
    /// when there is prior state, carries identifiers forward.
    pub fn modify_plan(&self, mut plan: Template, prior: Option<&Template>) -> Result<Template> {
        validate_template(&plan)?;

        let attributes = plan
            .builtin_attributes
            .iter_mut()
            .chain(plan.custom_attributes.iter_mut())
            .chain(plan.template_attributes.iter_mut().map(|t| &mut t.base));
        for attribute in attributes {
            if attribute.has_implicit_values() {
                attribute.selectable_values.clear();
            }
        }

        for attribute in &mut plan.template_attributes {
            if let Field::Known(text) = &attribute.value_json {
                attribute.value_json = Field::Known(normalize_json(text));
            }
        }

        Ok(match prior {
            Some(prior) => reconcile_template(plan, prior),
            None => plan,
        })
    }

    pub async fn create(&self, plan: Template) -> Result<Template> {
        let plan = self.modify_plan(plan, None)?;
        let request = to_create_request(&plan);
        let token = self.token(Operation::Create, None).await?;

        tracing::debug!(
            name = %request.base.name,
            entity_type = %request.entity_type,
            "Creating template"
        );
        let response = self
            .api
            .create(&token, &request)
            .await
            .map_err(|e| ControllerError::remote(Operation::Create, None, e))?;

        tracing::info!(template_id = %response.id, "Created template");
        Ok(from_response(response))
    }

    pub async fn read(&self, state: &Template) -> Result<ReadOutcome> {
        let Some(id) = template_id(state) else {
            tracing::warn!("Template in state has no ID, removing it");
            return Ok(ReadOutcome::Removed);
        };
        let token = self.token(Operation::Read, Some(id)).await?;

        match self.api.get(&token, id).await {
            Ok(response) => Ok(ReadOutcome::Found(from_response(response))),
            Err(RemoteError::NotFound { .. }) => {
                tracing::warn!(template_id = %id, "Template not found upstream, removing it from state");
                Ok(ReadOutcome::Removed)
            }
            Err(e) => Err(ControllerError::remote(Operation::Read, Some(id), e)),
        }
    }

    /// Replaces the remote template with the plan.
    ///
    /// The destructive-update override is resolved before anything else, so an
    /// unparsable override never reaches the server.
    pub async fn update(&self, plan: Template, prior: &Template) -> Result<Template> {
        let force = self.force_update.resolve()?;
        ensure_unchanged("entity_type", &prior.entity_type, &plan.entity_type)?;

        let plan = self.modify_plan(plan, Some(prior))?;
        let id = template_id(prior)
            .or_else(|| template_id(&plan))
            .ok_or(ControllerError::MissingId {
                operation: Operation::Update,
            })?;
        let request = to_update_request(&plan);
        let token = self.token(Operation::Update, Some(id)).await?;

        tracing::debug!(template_id = %id, force, "Updating template");
        let response = self
            .api
            .update(&token, id, &request, UpdateOptions::forced(force))
            .await
            .map_err(|e| match e {
                RemoteError::AttributeInUse { attributes } => {
                    tracing::warn!(template_id = %id, attributes = attributes.len(), "Update blocked, attributes hold observation data");
                    ControllerError::DestructiveChange { attributes }
                }
                other => ControllerError::remote(Operation::Update, Some(id), other),
            })?;

        tracing::info!(template_id = %id, "Updated template");
        Ok(from_response(response))
    }

    pub async fn delete(&self, state: &Template) -> Result<()> {
        let Some(id) = template_id(state) else {
            tracing::debug!("Template in state has no ID, nothing to delete");
            return Ok(());
        };
        let token = self.token(Operation::Delete, Some(id)).await?;

        self.api
            .delete(&token, id)
            .await
            .map_err(|e| ControllerError::remote(Operation::Delete, Some(id), e))?;

        tracing::info!(template_id = %id, "Deleted template");
        Ok(())
    }

    /// Resolves `<entity-type>:<template-name>` to exactly one template.
    pub async fn import(&self, raw_key: &str) -> Result<Template> {
        let key = ImportKey::parse(raw_key)?;
        let target = key.to_string();
        let token = self.token(Operation::Import, Some(&target)).await?;

        let request = SearchRequest::by_entity_type_and_name(&key.entity_type, &key.template_name);
        let response = self
            .api
            .search(&token, &request)
            .await
            .map_err(|e| ControllerError::remote(Operation::Import, Some(&target), e))?;

        let total = response.metadata.page.total_results;
        let mut data = response.data;
        if total != 1 || data.len() != 1 {
            // A page that disagrees with its own total reports what it carried.
            let count = if total == 1 {
                data.len()
            } else {
                usize::try_from(total).unwrap_or(usize::MAX)
            };
            return Err(
                CoreError::unexpected_match_count(key.entity_type, key.template_name, count).into(),
            );
        }
        let found = data.remove(0);

        tracing::info!(template_id = %found.id, key = %target, "Imported template");
        Ok(from_response(found))
    }

    async fn token(&self, operation: Operation, target: Option<&str>) -> Result<AccessToken> {
        self.auth
            .access_token()
            .await
            .map_err(|e| ControllerError::remote(operation, target, e))
    }
}

fn template_id(template: &Template) -> Option<&str> {
    template.id.as_str().filter(|id| !id.is_empty())
}

impl std::fmt::Debug for TemplateController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateController")
            .field("force_update", &self.force_update)
            .finish_non_exhaustive()
    }
}
