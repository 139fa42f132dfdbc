use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Url;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};

use super::conversation::{ChatMessage, convert_conversations};
use super::http_client::HttpClientTrait;
use super::sse::SseTextDecoder;
use super::tools::convert_tools;
use crate::domain::llm::{BRIDGE_CAPACITY, BridgeWriter, bridge};
use crate::domain::{
    AiProvider, ChatOptions, ChatStream, ConnectionContext, Conversation, DomainError, Model,
    ProviderName, StreamFormat, ToolDefinition,
};

pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Provider for backends speaking the chat-completions protocol
///
/// Groq and any self-hosted or proxy endpoint share this implementation; they
/// differ only in name and default base URL.
#[derive(Debug)]
pub struct OpenAiCompatibleProvider<C: HttpClientTrait> {
    client: C,
    connection: ConnectionContext,
    default_base_url: Option<&'static str>,
}

impl<C: HttpClientTrait + Clone + 'static> OpenAiCompatibleProvider<C> {
    pub fn new(
        client: C,
        connection: ConnectionContext,
        default_base_url: Option<&'static str>,
    ) -> Self {
        Self {
            client,
            connection,
            default_base_url,
        }
    }

    pub fn groq(client: C, api_key: impl Into<String>) -> Self {
        Self::new(
            client,
            ConnectionContext::new(ProviderName::Groq, api_key),
            Some(GROQ_BASE_URL),
        )
    }

    fn provider_label(&self) -> &'static str {
        self.connection.name.as_str()
    }

    fn base_url(&self) -> Result<Url, DomainError> {
        let raw = match self.connection.host.trim() {
            "" => self.default_base_url.ok_or_else(|| {
                DomainError::configuration(format!(
                    "No base URL configured for provider '{}'",
                    self.connection.name
                ))
            })?,
            host => host,
        };

        let url = Url::parse(raw.trim_end_matches('/')).map_err(|e| {
            DomainError::configuration(format!("Invalid base URL '{}': {}", raw, e))
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(DomainError::configuration(format!(
                "Unsupported URL scheme '{}' in base URL '{}'",
                scheme, raw
            ))),
        }
    }

    fn endpoint(&self, path: &str) -> Result<String, DomainError> {
        let base = self.base_url()?;
        Ok(format!("{}/{}", base.as_str().trim_end_matches('/'), path))
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.connection.api_key)
    }

    /// Build the per-call client; fails without side effects on bad settings.
    fn build_client(&self, model: &Model) -> Result<ChatClient<C>, DomainError> {
        if self.connection.api_key.trim().is_empty() {
            return Err(DomainError::configuration(format!(
                "Missing API key for provider '{}'",
                self.connection.name
            )));
        }

        Ok(ChatClient {
            http: self.client.clone(),
            provider: self.provider_label(),
            completions_url: self.endpoint("chat/completions")?,
            auth_header: self.auth_header(),
            model: model.name.clone(),
        })
    }

    fn parse_models(&self, json: serde_json::Value) -> Result<Vec<Model>, DomainError> {
        let list: ModelList = serde_json::from_value(json).map_err(|e| {
            DomainError::provider(
                self.provider_label(),
                format!("Failed to parse model list: {}", e),
            )
        })?;

        Ok(list
            .data
            .into_iter()
            .filter(|entry| entry.active)
            .map(|entry| Model::new(entry.id, self.connection.name))
            .collect())
    }
}

#[async_trait]
impl<C: HttpClientTrait + Clone + 'static> AiProvider for OpenAiCompatibleProvider<C> {
    fn chat_stream(
        &self,
        cancel: &CancellationToken,
        model: &Model,
        conversations: &[Conversation],
        options: &ChatOptions,
    ) -> Result<ChatStream, DomainError> {
        let client = self.build_client(model)?;
        let body = client.request_body(convert_conversations(conversations), &options.tools);

        let (mut writer, stream) = bridge(BRIDGE_CAPACITY, cancel.child_token());
        let token = stream.cancellation_token().clone();
        let format = options.stream_format;

        let span = info_span!(
            "chat_stream",
            provider = %self.connection.name,
            model = %model.name,
            stream_id = %stream.id()
        );
        info!(
            parent: &span,
            messages = body["messages"].as_array().map_or(0, Vec::len),
            tools = options.tools.len(),
            "Starting chat stream"
        );

        tokio::spawn(
            async move {
                let result = tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(DomainError::cancelled("chat generation cancelled")),
                    result = client.generate(&body, format, &mut writer) => result,
                };

                match result {
                    Ok(()) => {
                        debug!("Chat generation finished");
                        writer.close();
                    }
                    Err(e) if e.is_cancelled() => {
                        debug!("Chat generation cancelled");
                        writer.close_with_error(e);
                    }
                    Err(e) => {
                        warn!(error = %e, "Chat generation failed");
                        writer.close_with_error(e);
                    }
                }
            }
            .instrument(span),
        );

        Ok(stream)
    }

    async fn models(&self, cancel: &CancellationToken) -> Result<Vec<Model>, DomainError> {
        let url = self.endpoint("models")?;
        let auth = self.auth_header();
        let headers = vec![("Authorization", auth.as_str())];

        let json = with_cancel(cancel, self.client.get_json(&url, headers))
            .await
            .map_err(|e| attribute(self.provider_label(), e))?;
        let models = self.parse_models(json)?;

        debug!(
            provider = %self.connection.name,
            count = models.len(),
            "Fetched active models"
        );
        Ok(models)
    }

    async fn ping(&self, cancel: &CancellationToken) -> Result<(), DomainError> {
        let url = self.endpoint("models")?;
        let auth = self.auth_header();
        let headers = vec![("Authorization", auth.as_str())];

        with_cancel(cancel, self.client.get(&url, headers))
            .await
            .map_err(|e| attribute(self.provider_label(), e))
    }

    fn name(&self) -> ProviderName {
        self.connection.name
    }
}

/// Client owned by one generation task
#[derive(Debug)]
struct ChatClient<C> {
    http: C,
    provider: &'static str,
    completions_url: String,
    auth_header: String,
    model: String,
}

impl<C: HttpClientTrait> ChatClient<C> {
    fn request_body(
        &self,
        messages: Vec<ChatMessage>,
        tools: &[ToolDefinition],
    ) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "stream": true,
        });

        if !tools.is_empty() {
            body["tools"] = serde_json::json!(convert_tools(tools));
        }

        body
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
            ("Accept", "text/event-stream"),
        ]
    }

    async fn generate(
        &self,
        body: &serde_json::Value,
        format: StreamFormat,
        writer: &mut BridgeWriter,
    ) -> Result<(), DomainError> {
        let mut response = self
            .http
            .post_json_stream(&self.completions_url, self.headers(), body)
            .await
            .map_err(|e| attribute(self.provider, e))?;

        let mut decoder = SseTextDecoder::new();

        while let Some(chunk) = response.next().await {
            let chunk = chunk.map_err(|e| attribute(self.provider, e))?;

            match format {
                StreamFormat::Raw => writer.write(&chunk).await?,
                StreamFormat::Text => {
                    for delta in decoder.push(&chunk) {
                        writer.write(delta.as_bytes()).await?;
                    }
                }
            }
        }

        if format == StreamFormat::Text {
            if let Some(delta) = decoder.finish() {
                writer.write(delta.as_bytes()).await?;
            }
        }

        Ok(())
    }
}

/// Report transport failures under the backend's name
fn attribute(provider: &str, error: DomainError) -> DomainError {
    match error {
        DomainError::Provider { message, .. } => DomainError::provider(provider, message),
        other => other,
    }
}

async fn with_cancel<T>(
    cancel: &CancellationToken,
    operation: impl Future<Output = Result<T, DomainError>>,
) -> Result<T, DomainError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(DomainError::cancelled("request cancelled by caller")),
        result = operation => result,
    }
}

// Model listing types

#[derive(Debug, Deserialize)]
struct ModelList {
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
    #[serde(default)]
    active: bool,
}
