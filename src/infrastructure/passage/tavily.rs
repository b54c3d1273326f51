//! Tavily web search passage source

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::domain::research::{LegalDomain, Passage, PassageSource, ResearchError};
use crate::infrastructure::llm::HttpClientTrait;

pub const DEFAULT_TAVILY_BASE_URL: &str = "https://api.tavily.com";

/// Source id attached to every web passage
pub const WEB_SOURCE: &str = "web search";

/// Web search through the Tavily API
#[derive(Debug)]
pub struct TavilySearchSource<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
    max_results: usize,
}

impl<C: HttpClientTrait> TavilySearchSource<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_TAVILY_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            auth_header: format!("Bearer {}", api_key.into()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_results: 10,
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.max(1);
        self
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.base_url)
    }
}

/// Wrap a result so the URL survives into the extractor's view
pub fn format_web_passage(url: &str, content: &str) -> Passage {
    Passage::new(
        format!("<Document href=\"{}\"/>\n{}\n</Document>", url, content),
        WEB_SOURCE,
    )
}

#[async_trait]
impl<C: HttpClientTrait> PassageSource for TavilySearchSource<C> {
    fn domain(&self) -> LegalDomain {
        LegalDomain::Web
    }

    async fn search(&self, query: &str) -> Result<Vec<Passage>, ResearchError> {
        let body = serde_json::json!({
            "query": query,
            "max_results": self.max_results,
            "search_depth": "basic",
        });
        let headers = vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ];

        let response = self
            .client
            .post_json(&self.search_url(), headers, &body)
            .await
            .map_err(|e| ResearchError::retrieval(LegalDomain::Web, e.to_string()))?;

        let parsed: TavilyResponse = serde_json::from_value(response).map_err(|e| {
            ResearchError::retrieval(LegalDomain::Web, format!("Invalid Tavily response: {}", e))
        })?;

        let passages: Vec<Passage> = parsed
            .results
            .iter()
            .filter(|result| !result.content.trim().is_empty())
            .map(|result| format_web_passage(&result.url, &result.content))
            .collect();

        debug!(hits = passages.len(), "Tavily search");

        if passages.is_empty() {
            return Ok(vec![Passage::no_information()]);
        }

        Ok(passages)
    }

    fn source_type(&self) -> &'static str {
        "tavily"
    }
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    url: String,
    #[serde(default)]
    content: String,
}
