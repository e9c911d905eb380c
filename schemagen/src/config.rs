//! Generator configuration
//!
//! Configuration can be built in code or parsed from a plugin-style
//! parameter string such as
//! `generate_all=true,prefix=Api,namespace=app.graphql,context=AppContext`.

use crate::error::GenerationError;
use std::collections::BTreeMap;

/// Default namespace under which all artifacts are placed
pub const DEFAULT_NAMESPACE: &str = "generated";

/// Options recognized by the generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Generate every type and field unless a representation override is present
    pub generate_all: bool,

    /// Prefix applied to generated identifiers
    pub name_prefix: Option<String>,

    /// Root namespace for every generated artifact (dot separated)
    pub base_namespace: String,

    /// Type of the request context carried by the environment wrapper
    pub global_context_type: Option<String>,

    /// Additional or overriding scalar mappings: schema scalar -> target type
    pub scalars: BTreeMap<String, String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            generate_all: false,
            name_prefix: None,
            base_namespace: DEFAULT_NAMESPACE.to_string(),
            global_context_type: None,
            scalars: BTreeMap::new(),
        }
    }
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generate_all(mut self, enabled: bool) -> Self {
        self.generate_all = enabled;
        self
    }

    pub fn name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = Some(prefix.into());
        self
    }

    pub fn base_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.base_namespace = namespace.into();
        self
    }

    pub fn global_context_type(mut self, ty: impl Into<String>) -> Self {
        self.global_context_type = Some(ty.into());
        self
    }

    pub fn scalar(mut self, schema_name: impl Into<String>, target: impl Into<String>) -> Self {
        self.scalars.insert(schema_name.into(), target.into());
        self
    }

    /// Parse a comma separated `key=value` parameter string.
    ///
    /// Recognized keys: `generate_all`, `prefix`, `namespace`, `context` and
    /// `scalar` (as `SchemaName:target::Type`, repeatable). Unknown keys are
    /// ignored.
    pub fn from_parameter(param: &str) -> Result<Self, GenerationError> {
        let mut config = Self::default();

        for part in param.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = part.split_once('=').ok_or_else(|| GenerationError::InvalidParameter {
                key: part.to_string(),
                reason: "expected key=value".to_string(),
            })?;
            let value = value.trim();

            match key.trim() {
                "generate_all" => {
                    config.generate_all = match value {
                        "true" | "1" => true,
                        "false" | "0" => false,
                        other => {
                            return Err(GenerationError::InvalidParameter {
                                key: key.to_string(),
                                reason: format!("expected a boolean, got `{other}`"),
                            });
                        }
                    };
                }
                "prefix" => config.name_prefix = non_empty(value),
                "namespace" => {
                    if value.is_empty() {
                        return Err(GenerationError::InvalidParameter {
                            key: key.to_string(),
                            reason: "namespace must not be empty".to_string(),
                        });
                    }
                    config.base_namespace = value.to_string();
                }
                "context" => config.global_context_type = non_empty(value),
                "scalar" => {
                    let (name, target) = value
                        .split_once(':')
                        .filter(|(n, t)| !n.is_empty() && !t.is_empty())
                        .ok_or_else(|| GenerationError::InvalidParameter {
                            key: key.to_string(),
                            reason: format!("expected `Name:target::Type`, got `{value}`"),
                        })?;
                    config.scalars.insert(name.to_string(), target.to_string());
                }
                other => tracing::debug!(key = other, "ignoring unknown generator parameter"),
            }
        }

        Ok(config)
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
