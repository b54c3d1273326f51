//! Language model capability used by the research agents
//!
//! Two call shapes are exposed: schema-constrained JSON completion and plain
//! text completion. Typed structured completion is layered on top through
//! [`LanguageModelExt`], so implementations only deal with raw strings and
//! the schema descriptor.

use std::fmt::Debug;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::ResearchError;
use crate::domain::llm::LlmJsonSchema;

/// System + user prompt pair sent to the model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatPrompt {
    pub system: String,
    pub user: String,
}

impl ChatPrompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// A value the model is asked to return as schema-conformant JSON
pub trait StructuredOutput: DeserializeOwned + Send + 'static {
    /// Name sent alongside the schema and reported in schema violations
    const SCHEMA_NAME: &'static str;

    /// JSON schema describing the expected object
    fn json_schema() -> serde_json::Value;

    /// Semantic checks serde cannot express (ranges, non-empty lists)
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    fn schema() -> LlmJsonSchema {
        LlmJsonSchema::new(Self::SCHEMA_NAME, Self::json_schema())
    }
}

/// Chat model with structured and free-text completion
#[async_trait]
pub trait LanguageModel: Send + Sync + Debug {
    /// Complete the prompt, constraining output to the given JSON schema
    async fn complete_json(
        &self,
        prompt: &ChatPrompt,
        schema: &LlmJsonSchema,
    ) -> Result<String, ResearchError>;

    /// Complete the prompt as free text
    async fn complete_text(&self, prompt: &ChatPrompt) -> Result<String, ResearchError>;
}

/// Typed structured completion over any [`LanguageModel`]
pub trait LanguageModelExt: LanguageModel {
    fn complete_structured<'a, T>(
        &'a self,
        prompt: &'a ChatPrompt,
    ) -> impl std::future::Future<Output = Result<T, ResearchError>> + Send + 'a
    where
        T: StructuredOutput,
    {
        async move {
            let raw = self.complete_json(prompt, &T::schema()).await?;
            parse_structured::<T>(&raw)
        }
    }
}

impl<L: LanguageModel + ?Sized> LanguageModelExt for L {}

/// Parse and validate a raw model reply against `T`
pub fn parse_structured<T: StructuredOutput>(raw: &str) -> Result<T, ResearchError> {
    let json = extract_json(raw).unwrap_or(raw);

    let value: T = serde_json::from_str(json)
        .map_err(|e| ResearchError::schema_violation(T::SCHEMA_NAME, e.to_string()))?;

    value
        .validate()
        .map_err(|message| ResearchError::schema_violation(T::SCHEMA_NAME, message))?;

    Ok(value)
}

/// Extract the outermost JSON object from a reply (handles code fences)
fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;

    (start < end).then(|| &text[start..=end])
}
