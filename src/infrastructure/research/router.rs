//! LLM-backed domain router

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::prompts;
use crate::domain::research::{
    DomainRouter, LanguageModel, LanguageModelExt, LegalDomain, ResearchError, RouteSelection,
};

/// Routes a question with one schema-constrained completion
#[derive(Debug, Clone)]
pub struct LlmDomainRouter {
    model: Arc<dyn LanguageModel>,
}

impl LlmDomainRouter {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl DomainRouter for LlmDomainRouter {
    async fn route(&self, question: &str) -> Result<BTreeSet<LegalDomain>, ResearchError> {
        let prompt = prompts::router_prompt(question);
        let selection: RouteSelection = self.model.complete_structured(&prompt).await?;

        debug!(?selection, "Router selection");

        let domains = selection.domains();
        info!(
            domains = ?domains.iter().map(LegalDomain::as_str).collect::<Vec<_>>(),
            "Question routed"
        );

        Ok(domains)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::research::MockLanguageModel;

    fn router_with(reply: serde_json::Value) -> LlmDomainRouter {
        let model = MockLanguageModel::new().with_structured("route_selection", reply);
        LlmDomainRouter::new(Arc::new(model))
    }

    #[tokio::test]
    async fn test_single_domain() {
        let router = router_with(serde_json::json!({"tools": [{"tool": "search_personal"}]}));

        let domains = router.route("개인정보 보호법 제15조의 내용은?").await.unwrap();

        assert_eq!(domains, BTreeSet::from([LegalDomain::PersonalData]));
    }

    #[tokio::test]
    async fn test_domain_plus_web_with_duplicates() {
        let router = router_with(serde_json::json!({"tools": [
            {"tool": "search_web"},
            {"tool": "search_housing"},
            {"tool": "search_web"}
        ]}));

        let domains = router.route("전세 사기 예방 방법").await.unwrap();

        assert_eq!(
            domains.into_iter().collect::<Vec<_>>(),
            vec![LegalDomain::Housing, LegalDomain::Web]
        );
    }

    #[tokio::test]
    async fn test_empty_selection_is_schema_violation() {
        let router = router_with(serde_json::json!({"tools": []}));

        let err = router.route("질문").await.unwrap_err();

        assert!(matches!(err, ResearchError::SchemaViolation { .. }));
    }

    #[tokio::test]
    async fn test_unknown_label_is_schema_violation() {
        let router = router_with(serde_json::json!({"tools": [{"tool": "search_tax"}]}));

        let err = router.route("질문").await.unwrap_err();

        assert!(err.to_string().contains("search_tax"));
    }

    #[tokio::test]
    async fn test_malformed_reply_is_fatal() {
        let model = MockLanguageModel::new().with_raw_structured("route_selection", "labor");
        let router = LlmDomainRouter::new(Arc::new(model));

        let err = router.route("질문").await.unwrap_err();

        assert!(matches!(err, ResearchError::SchemaViolation { .. }));
    }
}
