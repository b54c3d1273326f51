//! Passages and the passage source capability

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::domain_tag::LegalDomain;
use super::error::ResearchError;

/// Text returned when a search produced nothing
pub const NO_INFORMATION_FOUND: &str = "관련 정보를 찾을 수 없습니다.";

/// Text returned when a domain has no index to search
pub const INDEX_UNAVAILABLE: &str = "벡터DB가 존재하지 않습니다.";

/// Source id attached to sentinel passages
pub const UNKNOWN_SOURCE: &str = "N/A";

/// A unit of retrieved text with its source identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub text: String,
    pub source_id: String,
}

impl Passage {
    pub fn new(text: impl Into<String>, source_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_id: source_id.into(),
        }
    }

    /// Sentinel passage for an empty search
    pub fn no_information() -> Self {
        Self::new(NO_INFORMATION_FOUND, UNKNOWN_SOURCE)
    }

    /// Sentinel passage for a domain without an index
    pub fn index_unavailable() -> Self {
        Self::new(INDEX_UNAVAILABLE, UNKNOWN_SOURCE)
    }

    /// Whether this is one of the sentinel passages
    pub fn is_sentinel(&self) -> bool {
        self.source_id == UNKNOWN_SOURCE
            && (self.text == NO_INFORMATION_FOUND || self.text == INDEX_UNAVAILABLE)
    }
}

/// Replace an empty result set with the no-information sentinel
pub fn or_no_information(passages: Vec<Passage>) -> Vec<Passage> {
    if passages.is_empty() {
        vec![Passage::no_information()]
    } else {
        passages
    }
}

/// Ranked passage retrieval for one domain
///
/// Implementations never return an empty vector; a search without hits
/// yields [`Passage::no_information`].
#[async_trait]
pub trait PassageSource: Send + Sync + Debug {
    /// Domain this source is bound to
    fn domain(&self) -> LegalDomain;

    /// Search for passages matching the query
    async fn search(&self, query: &str) -> Result<Vec<Passage>, ResearchError>;

    /// Backend name, for logs
    fn source_type(&self) -> &'static str;
}
