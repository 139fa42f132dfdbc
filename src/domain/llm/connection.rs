use std::fmt;

use serde::Deserialize;

use super::ProviderName;

/// Settings a provider instance is built from
///
/// Owned by exactly one provider and never mutated afterwards; concurrent
/// streams of that provider only read it.
#[derive(Clone, Deserialize)]
pub struct ConnectionContext {
    pub name: ProviderName,
    #[serde(default)]
    pub api_key: String,
    /// Base URL override; empty means the backend default
    #[serde(default)]
    pub host: String,
}

impl ConnectionContext {
    pub fn new(name: ProviderName, api_key: impl Into<String>) -> Self {
        Self {
            name,
            api_key: api_key.into(),
            host: String::new(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }
}

impl fmt::Debug for ConnectionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionContext")
            .field("name", &self.name)
            .field("api_key", &"[REDACTED]")
            .field("host", &self.host)
            .finish()
    }
}
