//! Domain layer - Core business logic and entities

pub mod error;
pub mod llm;
pub mod research;

pub use error::DomainError;
pub use llm::{
    FinishReason, LlmProvider, LlmRequest, LlmRequestBuilder, LlmResponse, Message, MessageRole,
    Usage,
};
