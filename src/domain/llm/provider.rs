use async_trait::async_trait;
use std::fmt::Debug;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::{ChatOptions, ChatStream, Conversation, Model, ProviderName};
use crate::domain::DomainError;

/// Uniform contract every AI backend implements
#[async_trait]
pub trait AiProvider: Send + Sync + Debug {
    /// Start a streaming generation.
    ///
    /// Returns as soon as the generation task is running; construction
    /// failures come back here and start nothing. Cancelling `cancel` aborts
    /// the generation and terminates the returned stream.
    fn chat_stream(
        &self,
        cancel: &CancellationToken,
        model: &Model,
        conversations: &[Conversation],
        options: &ChatOptions,
    ) -> Result<ChatStream, DomainError>;

    /// List the models the backend currently serves
    async fn models(&self, cancel: &CancellationToken) -> Result<Vec<Model>, DomainError>;

    /// Check the backend is reachable and accepts the credentials
    async fn ping(&self, cancel: &CancellationToken) -> Result<(), DomainError>;

    /// Get the provider name
    fn name(&self) -> ProviderName;
}

/// Child of `parent` that is also cancelled once `timeout` elapses.
///
/// The deadline runs on a spawned timer task that lives until the token is
/// cancelled. Cancel the returned token once the guarded work is finished so
/// the timer exits instead of sleeping out the full `timeout`.
///
/// Must be called from within a tokio runtime.
pub fn cancel_after(parent: &CancellationToken, timeout: Duration) -> CancellationToken {
    let token = parent.child_token();
    let timer = token.clone();

    tokio::spawn(async move {
        tokio::select! {
            _ = timer.cancelled() => {}
            _ = tokio::time::sleep(timeout) => timer.cancel(),
        }
    });

    token
}


#[cfg(test)]
mod tests {
    use super::mock::MockAiProvider;
    use super::*;

    #[tokio::test]
    async fn test_mock_provider_streams_reply() {
        let provider = MockAiProvider::new(ProviderName::Groq).with_reply("Hello, world!");
        let cancel = CancellationToken::new();
        let model = Model::new("llama3-8b-8192", ProviderName::Groq);

        let mut stream = provider
            .chat_stream(&cancel, &model, &[Conversation::user("Hi")], &ChatOptions::new())
            .unwrap();

        assert_eq!(stream.collect_text(&cancel).await.unwrap(), "Hello, world!");
    }

    #[tokio::test]
    async fn test_mock_provider_error_follows_reply() {
        let provider = MockAiProvider::new(ProviderName::Groq)
            .with_reply("partial")
            .with_error("rate limited");
        let cancel = CancellationToken::new();
        let model = Model::new("llama3-8b-8192", ProviderName::Groq);

        let mut stream = provider
            .chat_stream(&cancel, &model, &[], &ChatOptions::new())
            .unwrap();

        let mut text = Vec::new();
        let error = loop {
            match stream.receive(&cancel).await {
                Ok(Some(chunk)) => text.extend_from_slice(&chunk),
                Ok(None) => panic!("expected the provider error"),
                Err(e) => break e,
            }
        };

        assert_eq!(text, b"partial");
        assert!(!error.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancel_after_fires() {
        let parent = CancellationToken::new();
        let token = cancel_after(&parent, Duration::from_millis(10));

        tokio::time::timeout(Duration::from_secs(1), token.cancelled())
            .await
            .expect("token should be cancelled by the timer");
        assert!(!parent.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancel_after_timer_exits_when_token_cancelled() {
        let metrics = tokio::runtime::Handle::current().metrics();
        let before = metrics.num_alive_tasks();

        let token = cancel_after(&CancellationToken::new(), Duration::from_secs(3600));
        assert_eq!(metrics.num_alive_tasks(), before + 1);

        token.cancel();
        tokio::time::timeout(Duration::from_secs(1), async {
            while metrics.num_alive_tasks() > before {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("timer task should exit once the token is cancelled");
    }

    #[tokio::test]
    async fn test_cancel_after_follows_parent() {
        let parent = CancellationToken::new();
        let token = cancel_after(&parent, Duration::from_secs(60));

        parent.cancel();
        assert!(token.is_cancelled());
    }
}
