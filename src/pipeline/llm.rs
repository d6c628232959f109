//! Model client: send a rendered prompt, get raw completion text back.
//!
//! [`ModelClient`] is the seam between the pipeline and the network. The
//! production implementation, [`LlmClient`], is a thin adapter over an
//! `edgequake_llm` provider; tests substitute scripted clients.
//!
//! There is no retry here. A failed call surfaces as
//! [`QuizGenError::ModelCallError`] and the run aborts.

use crate::error::{CallStage, QuizGenError};
use crate::output::CallUsage;
use crate::pricing::estimate_cost;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Per-call generation options.
#[derive(Debug, Clone, PartialEq)]
pub struct CallOptions {
    /// Which pipeline step is calling; used in errors and logs.
    pub stage: CallStage,
    pub temperature: f32,
    pub max_tokens: usize,
}

/// Raw completion text plus the usage of the call that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub usage: CallUsage,
}

/// Anything that can turn a prompt into completion text.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Model identifier, for logs and cost estimation.
    fn model(&self) -> &str;

    /// Send one prompt and wait for the full completion.
    async fn complete(&self, prompt: &str, options: &CallOptions)
        -> Result<Completion, QuizGenError>;
}

/// [`ModelClient`] backed by an `edgequake_llm` provider.
pub struct LlmClient {
    provider: Arc<dyn LLMProvider>,
    model: String,
}

impl LlmClient {
    pub fn new(provider: Arc<dyn LLMProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Build a client for a named provider (`openai`, `anthropic`, `gemini`, …).
    ///
    /// The provider reads its API key from the environment.
    pub fn from_provider_name(provider_name: &str, model: &str) -> Result<Self, QuizGenError> {
        let provider = ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
            QuizGenError::ConfigurationError(format!(
                "LLM provider '{}' is not configured: {}",
                provider_name, e
            ))
        })?;
        Ok(Self::new(provider, model))
    }
}

#[async_trait]
impl ModelClient for LlmClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        prompt: &str,
        options: &CallOptions,
    ) -> Result<Completion, QuizGenError> {
        let start = Instant::now();
        let messages = vec![ChatMessage::user(prompt)];
        let completion_options = build_options(options);

        debug!(
            "{} call: model={}, prompt={} chars",
            options.stage,
            self.model,
            prompt.len()
        );

        let response = self
            .provider
            .chat(&messages, Some(&completion_options))
            .await
            .map_err(|e| QuizGenError::ModelCallError {
                model: self.model.clone(),
                stage: options.stage,
                message: e.to_string(),
            })?;

        if response.content.trim().is_empty() {
            debug!("{} call returned no text", options.stage);
        }

        let prompt_tokens = response.prompt_tokens as u64;
        let completion_tokens = response.completion_tokens as u64;
        let usage = CallUsage {
            prompt_tokens,
            completion_tokens,
            estimated_cost: estimate_cost(&self.model, prompt_tokens, completion_tokens),
        };

        info!(
            "{} call: {} input tokens, {} output tokens, {:?}",
            options.stage,
            prompt_tokens,
            completion_tokens,
            start.elapsed()
        );

        Ok(Completion {
            text: response.content,
            usage,
        })
    }
}

/// Build `CompletionOptions` from the per-call options.
fn build_options(options: &CallOptions) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(options.temperature),
        max_tokens: Some(options.max_tokens),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_options_forwards_values() {
        let opts = build_options(&CallOptions {
            stage: CallStage::Generation,
            temperature: 0.5,
            max_tokens: 2048,
        });
        assert_eq!(opts.temperature, Some(0.5));
        assert_eq!(opts.max_tokens, Some(2048));
    }

    #[tokio::test]
    async fn empty_completion_is_returned_as_text() {
        let mock = edgequake_llm::MockProvider::new();
        mock.add_response("").await;
        let client = LlmClient::new(Arc::new(mock), "gpt-4.1-nano");

        let completion = client
            .complete(
                "Write a quiz.",
                &CallOptions {
                    stage: CallStage::Generation,
                    temperature: 0.5,
                    max_tokens: 256,
                },
            )
            .await
            .expect("an empty reply is not a transport failure");
        assert_eq!(completion.text, "");
    }
}
