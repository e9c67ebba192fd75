//! Pluggable submit endpoints.
//!
//! The registry maps a route suffix under `/api/submit` to an adapter:
//! `""` is always the generic JSON endpoint; every other entry comes from
//! the JSON configuration document. Adding an integration means adding an
//! adapter type and one arm in [`EndpointRegistry::from_config_value`].

pub mod generic;
pub mod gitea;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::HeaderMap;
use serde::Deserialize;

use aura_db::models::entity::Entity;
use aura_db::models::project::Project;
use aura_db::DbPool;

use crate::error::AppResult;
use crate::submit::Submission;

/// One submit endpoint: adapts inbound requests and, optionally, pushes
/// entity status back to its source.
#[async_trait]
pub trait SubmitEndpoint: Send + Sync {
    /// Adapt an inbound request into a [`Submission`], enforcing this
    /// endpoint's authentication.
    async fn parse_request(
        &self,
        pool: &DbPool,
        headers: &HeaderMap,
        body: &[u8],
    ) -> AppResult<Submission>;

    /// Push the entity's rolled-up status to the external source, when the
    /// integration supports it. Must log-and-swallow its own failures.
    async fn push_entity_status(&self, pool: &DbPool, project: &Project, entity: &Entity);
}

/// Reserved top-level configuration values.
#[derive(Debug, Default, Deserialize)]
struct GeneralConfig {
    /// The controller's own public base URL, used in status-back links.
    #[serde(default, rename = "baseUrl")]
    base_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read endpoint configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse endpoint configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown integration '{0}'")]
    UnknownIntegration(String),
}

/// Submit endpoints keyed by route suffix.
pub struct EndpointRegistry {
    endpoints: HashMap<String, Arc<dyn SubmitEndpoint>>,
}

impl std::fmt::Debug for EndpointRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointRegistry")
            .field("endpoints", &self.endpoints.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl EndpointRegistry {
    /// A registry with only the generic endpoint. This is the configuration
    /// of a controller without a config document.
    pub fn generic_only() -> Self {
        let mut endpoints: HashMap<String, Arc<dyn SubmitEndpoint>> = HashMap::new();
        endpoints.insert(String::new(), Arc::new(generic::GenericEndpoint));
        Self { endpoints }
    }

    /// Build the registry from the configuration document at `path`.
    /// A missing file yields the generic-only registry.
    pub fn from_config_file(path: &Path) -> Result<Self, ConfigError> {
        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::generic_only());
            }
            Err(e) => return Err(e.into()),
        };
        let value: serde_json::Value = serde_json::from_slice(&data)?;
        Self::from_config_value(value)
    }

    /// Build the registry from a parsed configuration document.
    ///
    /// Top-level keys: `baseUrl` is a reserved global; every other key must
    /// name a known integration. An unknown key is a fatal configuration
    /// error.
    pub fn from_config_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        let general: GeneralConfig = serde_json::from_value(value.clone())?;
        let base_url = general.base_url.trim_end_matches('/').to_string();

        // Rejects non-object documents with a proper parse error.
        let entries: serde_json::Map<String, serde_json::Value> = serde_json::from_value(value)?;

        let mut registry = Self::generic_only();
        tracing::info!("Initialized generic submit endpoint at /api/submit");

        let mut pairs: Vec<(&String, &serde_json::Value)> = entries.iter().collect();
        pairs.sort_by(|a, b| a.0.cmp(b.0));
        for (name, raw) in pairs {
            match name.as_str() {
                "baseUrl" => continue,
                "gitea" => {
                    let endpoint = gitea::GiteaEndpoint::new(base_url.clone(), raw.clone())?;
                    registry.endpoints.insert(name.clone(), Arc::new(endpoint));
                    tracing::info!("Initialized submit endpoint for Gitea at /api/submit/gitea");
                }
                other => return Err(ConfigError::UnknownIntegration(other.to_string())),
            }
        }
        Ok(registry)
    }

    /// Look up the endpoint for a route suffix ("" = generic).
    pub fn get(&self, suffix: &str) -> Option<&Arc<dyn SubmitEndpoint>> {
        self.endpoints.get(suffix)
    }

    /// All registered endpoints, for status fan-out.
    pub fn endpoints(&self) -> impl Iterator<Item = &Arc<dyn SubmitEndpoint>> {
        self.endpoints.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_config_registers_the_generic_endpoint() {
        let registry = EndpointRegistry::from_config_value(json!({})).unwrap();
        assert!(registry.get("").is_some());
        assert!(registry.get("gitea").is_none());
    }

    #[test]
    fn base_url_is_reserved_not_an_integration() {
        let registry =
            EndpointRegistry::from_config_value(json!({"baseUrl": "https://aura.example"}))
                .unwrap();
        assert!(registry.get("").is_some());
        assert!(registry.get("baseUrl").is_none());
    }

    #[test]
    fn gitea_integration_is_registered() {
        let registry = EndpointRegistry::from_config_value(json!({
            "baseUrl": "https://aura.example/",
            "gitea": {"repos": {}},
        }))
        .unwrap();
        assert!(registry.get("gitea").is_some());
    }

    #[test]
    fn unknown_integration_is_fatal() {
        let err = EndpointRegistry::from_config_value(json!({"jenkins": {}})).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownIntegration(name) if name == "jenkins"));
    }

    #[test]
    fn non_object_config_is_rejected() {
        assert!(EndpointRegistry::from_config_value(json!([1, 2])).is_err());
    }
}
