//! In-memory statute corpus with keyword ranking

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::domain::research::{LegalDomain, Passage, PassageSource, ResearchError};

/// One corpus entry as stored in the JSON corpus file
#[derive(Debug, Clone, Deserialize)]
pub struct CorpusEntry {
    pub text: String,
    pub source: String,
}

/// Statute passage source for development and testing
///
/// Ranks entries by how many query terms they contain. A source built
/// with [`InMemoryPassageSource::unavailable`] has no index and answers
/// every search with the index-unavailable sentinel.
#[derive(Debug)]
pub struct InMemoryPassageSource {
    domain: LegalDomain,
    entries: Option<Vec<CorpusEntry>>,
    top_k: usize,
}

impl InMemoryPassageSource {
    pub fn new(domain: LegalDomain, entries: Vec<CorpusEntry>, top_k: usize) -> Self {
        Self {
            domain,
            entries: Some(entries),
            top_k: top_k.max(1),
        }
    }

    /// Source for a domain without a configured corpus
    pub fn unavailable(domain: LegalDomain) -> Self {
        Self {
            domain,
            entries: None,
            top_k: 1,
        }
    }

    /// Load a JSON corpus: `[{"text": ..., "source": ...}]`
    pub async fn from_file(
        domain: LegalDomain,
        path: impl AsRef<Path>,
        top_k: usize,
    ) -> Result<Self, ResearchError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            ResearchError::configuration(format!(
                "Failed to read corpus {}: {}",
                path.display(),
                e
            ))
        })?;

        let entries: Vec<CorpusEntry> = serde_json::from_str(&raw).map_err(|e| {
            ResearchError::configuration(format!(
                "Invalid corpus {}: {}",
                path.display(),
                e
            ))
        })?;

        info!(%domain, entries = entries.len(), path = %path.display(), "Corpus loaded");

        Ok(Self::new(domain, entries, top_k))
    }

    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn query_terms(query: &str) -> Vec<String> {
    query
        .split(|c: char| c.is_whitespace() || (c.is_ascii_punctuation() && c != '-'))
        .map(str::to_lowercase)
        .filter(|term| !term.is_empty())
        .collect()
}

fn score(text: &str, terms: &[String]) -> usize {
    let text = text.to_lowercase();
    terms.iter().filter(|term| text.contains(term.as_str())).count()
}

#[async_trait]
impl PassageSource for InMemoryPassageSource {
    fn domain(&self) -> LegalDomain {
        self.domain
    }

    async fn search(&self, query: &str) -> Result<Vec<Passage>, ResearchError> {
        let Some(entries) = &self.entries else {
            return Ok(vec![Passage::index_unavailable()]);
        };

        let terms = query_terms(query);
        let mut ranked: Vec<(usize, &CorpusEntry)> = entries
            .iter()
            .map(|entry| (score(&entry.text, &terms), entry))
            .filter(|(score, _)| *score > 0)
            .collect();

        // Stable sort keeps corpus order among equal scores
        ranked.sort_by(|a, b| b.0.cmp(&a.0));

        let passages: Vec<Passage> = ranked
            .into_iter()
            .take(self.top_k)
            .map(|(_, entry)| Passage::new(&entry.text, &entry.source))
            .collect();

        debug!(domain = %self.domain, hits = passages.len(), "Keyword search");

        if passages.is_empty() {
            return Ok(vec![Passage::no_information()]);
        }

        Ok(passages)
    }

    fn source_type(&self) -> &'static str {
        "in_memory"
    }
}
