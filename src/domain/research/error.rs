//! Research pipeline error types

use thiserror::Error;

use super::domain_tag::LegalDomain;
use crate::domain::DomainError;

/// Errors raised while routing, retrieving, extracting or synthesizing
#[derive(Debug, Error)]
pub enum ResearchError {
    #[error("Retrieval failed for {domain}: {message}")]
    Retrieval { domain: LegalDomain, message: String },

    #[error("Schema violation in '{schema}': {message}")]
    SchemaViolation { schema: String, message: String },

    #[error("Language model error: {message}")]
    LanguageModel { message: String },

    #[error("Timeout in '{operation}' after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("Domain branch '{domain}' failed: {source}")]
    DomainBranchFailure {
        domain: LegalDomain,
        #[source]
        source: Box<ResearchError>,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Session store error: {0}")]
    Session(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResearchError {
    pub fn retrieval(domain: LegalDomain, message: impl Into<String>) -> Self {
        Self::Retrieval {
            domain,
            message: message.into(),
        }
    }

    pub fn schema_violation(schema: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SchemaViolation {
            schema: schema.into(),
            message: message.into(),
        }
    }

    pub fn language_model(message: impl Into<String>) -> Self {
        Self::LanguageModel {
            message: message.into(),
        }
    }

    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }

    pub fn branch_failure(domain: LegalDomain, source: ResearchError) -> Self {
        Self::DomainBranchFailure {
            domain,
            source: Box::new(source),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn session(message: impl Into<String>) -> Self {
        Self::Session(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Innermost cause, looking through branch failure wrappers
    pub fn root_cause(&self) -> &ResearchError {
        match self {
            Self::DomainBranchFailure { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Failed domain, if the error came out of a fan-out branch
    pub fn failed_domain(&self) -> Option<LegalDomain> {
        match self {
            Self::DomainBranchFailure { domain, .. } => Some(*domain),
            _ => None,
        }
    }

    /// Message shown to the end user instead of an answer
    pub fn user_message(&self) -> String {
        match self.root_cause() {
            Self::InvalidInput(_) => "질문을 입력해주세요.".to_string(),
            Self::Timeout { .. } => {
                "응답 시간이 초과되었습니다. 잠시 후 다시 시도해주세요.".to_string()
            }
            _ => match self.failed_domain() {
                Some(domain) => format!(
                    "{} 검색 중 오류가 발생했습니다. 다시 시도해주세요.",
                    domain.law_name()
                ),
                None => "질문 처리 중 오류가 발생했습니다. 다시 시도해주세요.".to_string(),
            },
        }
    }
}

impl From<DomainError> for ResearchError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Configuration { message } => Self::Configuration(message),
            DomainError::Internal { message } => Self::Internal(message),
            other => Self::LanguageModel {
                message: other.to_string(),
            },
        }
    }
}
