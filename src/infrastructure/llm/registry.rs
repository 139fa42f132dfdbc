use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::http_client::HttpClient;
use super::openai_compatible::{GROQ_BASE_URL, OpenAiCompatibleProvider};
use crate::domain::{AiProvider, ConnectionContext, DomainError, ProviderName};

/// Builds a provider from its connection settings
pub type ProviderConstructor =
    Arc<dyn Fn(&ConnectionContext) -> Result<Arc<dyn AiProvider>, DomainError> + Send + Sync>;

/// Maps provider names to constructors
///
/// Passed explicitly to whatever composes providers; there is no global
/// instance.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    constructors: HashMap<ProviderName, ProviderConstructor>,
}

impl ProviderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in backend
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register(ProviderName::Groq, |connection| {
            Ok(Arc::new(OpenAiCompatibleProvider::new(
                HttpClient::new(),
                connection.clone(),
                Some(GROQ_BASE_URL),
            )))
        });

        registry.register(ProviderName::OpenAiCompatible, |connection| {
            if connection.host.trim().is_empty() {
                return Err(DomainError::configuration(
                    "open_ai_compatible provider requires a host",
                ));
            }
            Ok(Arc::new(OpenAiCompatibleProvider::new(
                HttpClient::new(),
                connection.clone(),
                None,
            )))
        });

        registry
    }

    /// Register a constructor, replacing any previous one for `name`
    pub fn register<F>(&mut self, name: ProviderName, constructor: F)
    where
        F: Fn(&ConnectionContext) -> Result<Arc<dyn AiProvider>, DomainError>
            + Send
            + Sync
            + 'static,
    {
        debug!(provider = %name, "Registering provider constructor");
        self.constructors.insert(name, Arc::new(constructor));
    }

    /// Create the provider named by the connection settings
    pub fn create(
        &self,
        connection: &ConnectionContext,
    ) -> Result<Arc<dyn AiProvider>, DomainError> {
        let constructor = self.constructors.get(&connection.name).ok_or_else(|| {
            DomainError::not_found(format!("Provider '{}' not registered", connection.name))
        })?;

        constructor(connection)
    }

    pub fn contains(&self, name: ProviderName) -> bool {
        self.constructors.contains_key(&name)
    }

    /// Registered provider names, sorted for stable output
    pub fn names(&self) -> Vec<ProviderName> {
        let mut names: Vec<ProviderName> = self.constructors.keys().copied().collect();
        names.sort_by_key(|name| name.as_str());
        names
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.names())
            .finish()
    }
}
