//! [`LanguageModel`] over an [`LlmProvider`]

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::llm::{LlmJsonSchema, LlmProvider, LlmRequest, LlmRequestBuilder, LlmResponse};
use crate::domain::research::{ChatPrompt, LanguageModel, ResearchError};
use crate::domain::DomainError;
use crate::infrastructure::observability::{record_llm_request, LlmRequestMetricParams};

/// Chat model backed by a provider, with a per-call timeout
#[derive(Debug, Clone)]
pub struct ProviderLanguageModel {
    provider: Arc<dyn LlmProvider>,
    model: String,
    temperature: f32,
    timeout: Duration,
}

impl ProviderLanguageModel {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.0,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn send(&self, operation: &str, request: LlmRequest) -> Result<String, ResearchError> {
        let started = Instant::now();
        let result = tokio::time::timeout(self.timeout, self.provider.chat(&self.model, request))
            .await
            .map_err(|_| ResearchError::timeout(operation, self.timeout.as_millis() as u64))?;

        self.record(&result, started.elapsed());

        let response = result?;
        debug!(
            operation,
            model = %response.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "LLM call completed"
        );

        if response.is_truncated() {
            return Err(ResearchError::language_model(format!(
                "{} output was truncated ({:?})",
                operation, response.finish_reason
            )));
        }

        let content = response.content().trim();
        if content.is_empty() {
            return Err(ResearchError::language_model(format!(
                "Empty response for {}",
                operation
            )));
        }

        Ok(content.to_string())
    }

    fn record(&self, result: &Result<LlmResponse, DomainError>, duration: Duration) {
        let usage = result.as_ref().ok().and_then(|r| r.usage.as_ref());

        record_llm_request(LlmRequestMetricParams {
            provider: self.provider.provider_name(),
            model: &self.model,
            duration,
            success: result.is_ok(),
            input_tokens: usage.map(|u| u64::from(u.prompt_tokens)),
            output_tokens: usage.map(|u| u64::from(u.completion_tokens)),
        });
    }

    fn request(&self, prompt: &ChatPrompt) -> LlmRequestBuilder {
        LlmRequest::builder()
            .system(&prompt.system)
            .user(&prompt.user)
            .temperature(self.temperature)
    }
}

#[async_trait]
impl LanguageModel for ProviderLanguageModel {
    async fn complete_json(
        &self,
        prompt: &ChatPrompt,
        schema: &LlmJsonSchema,
    ) -> Result<String, ResearchError> {
        let request = self.request(prompt).json_schema(schema.clone()).build();
        self.send(&schema.name, request).await
    }

    async fn complete_text(&self, prompt: &ChatPrompt) -> Result<String, ResearchError> {
        let request = self.request(prompt).build();
        self.send("text", request).await
    }
}
