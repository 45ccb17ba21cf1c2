use super::providers::{AnswerHubProvider, GitHubProvider, SlackProvider};
use super::{Provider, ProviderInfo};
use crate::config::Settings;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Registry errors
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("provider {0} is already registered")]
    DuplicateName(String),

    #[error("invalid provider {name}. Possible providers are [{}]", available.join(", "))]
    NotFound {
        name: String,
        available: Vec<String>,
    },
}

/// Provider registry - maps provider names to search adapters
///
/// Populated once at startup, read-only afterwards.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: BTreeMap<String, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in AnswerHub, GitHub and Slack adapters
    pub fn with_defaults(settings: &Settings) -> Result<Self, RegistryError> {
        let mut registry = Self::new();

        let answerhub = AnswerHubProvider::from_settings(settings);
        registry.register(answerhub.info().name, Arc::new(answerhub))?;

        let github = GitHubProvider::from_settings(settings);
        registry.register(github.info().name, Arc::new(github))?;

        let slack = SlackProvider::from_settings(settings);
        registry.register(slack.info().name, Arc::new(slack))?;

        tracing::debug!(providers = ?registry.list_names(), "provider registry initialized");
        Ok(registry)
    }

    /// Register a provider under `name`; the first registration wins
    pub fn register(
        &mut self,
        name: impl Into<String>,
        provider: Arc<dyn Provider>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if self.providers.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }
        self.providers.insert(name, provider);
        Ok(())
    }

    /// Get a provider by name
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn Provider>, RegistryError> {
        self.providers
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound {
                name: name.to_string(),
                available: self.list_names(),
            })
    }

    /// Get all provider names, sorted ascending
    pub fn list_names(&self) -> Vec<String> {
        self.providers.keys().cloned().collect()
    }

    /// Provider descriptors ordered by priority, then name
    pub fn descriptors(&self) -> Vec<ProviderInfo> {
        let mut infos: Vec<ProviderInfo> =
            self.providers.values().map(|p| p.info().clone()).collect();
        infos.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.name.cmp(b.name)));
        infos
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
