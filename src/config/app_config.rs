use serde::Deserialize;

use crate::domain::{ConnectionContext, ProviderName};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Connection settings, at most one entry per provider name
    #[serde(default)]
    pub providers: Vec<ConnectionContext>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("AI_BRIDGE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Connection settings for `name`, if configured
    pub fn provider(&self, name: ProviderName) -> Option<&ConnectionContext> {
        self.providers.iter().find(|provider| provider.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.providers.is_empty());
    }

    #[test]
    fn test_deserialize_from_toml_source() {
        let source = r#"
            [logging]
            level = "debug"
            format = "json"

            [[providers]]
            name = "groq"
            api_key = "gsk-test"

            [[providers]]
            name = "open_ai_compatible"
            api_key = "local"
            host = "http://localhost:11434/v1"
        "#;

        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.providers.len(), 2);

        let groq = config.provider(ProviderName::Groq).unwrap();
        assert_eq!(groq.api_key, "gsk-test");
        assert!(groq.host.is_empty());

        let local = config.provider(ProviderName::OpenAiCompatible).unwrap();
        assert_eq!(local.host, "http://localhost:11434/v1");
    }
}
