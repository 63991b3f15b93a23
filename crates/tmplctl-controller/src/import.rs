use std::fmt;
use std::str::FromStr;

use tmplctl_core::CoreError;

/// `<entity-type>:<template-name>`, the key an existing template is imported by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportKey {
    pub entity_type: String,
    pub template_name: String,
}

impl ImportKey {
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let parts: Vec<&str> = raw.split(':').collect();
        match parts.as_slice() {
            [entity_type, template_name] if !entity_type.is_empty() && !template_name.is_empty() => {
                Ok(Self {
                    entity_type: entity_type.to_string(),
                    template_name: template_name.to_string(),
                })
            }
            _ => Err(CoreError::invalid_import_key(raw)),
        }
    }
}

impl FromStr for ImportKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ImportKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.entity_type, self.template_name)
    }
}
