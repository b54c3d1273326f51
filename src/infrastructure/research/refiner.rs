//! LLM-backed query refiner

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::prompts;
use crate::domain::research::{
    LanguageModel, LanguageModelExt, LegalDomain, QueryRefiner, RefinedQuery, ResearchError,
};

#[derive(Debug, Clone)]
pub struct LlmQueryRefiner {
    model: Arc<dyn LanguageModel>,
}

impl LlmQueryRefiner {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl QueryRefiner for LlmQueryRefiner {
    async fn refine(
        &self,
        domain: LegalDomain,
        question: &str,
        evidence_summary: &str,
    ) -> Result<RefinedQuery, ResearchError> {
        let prompt = prompts::refine_prompt(domain, question, evidence_summary);
        let refined: RefinedQuery = self.model.complete_structured(&prompt).await?;

        info!(
            %domain,
            query = %refined.question_refined,
            reason = %refined.reason,
            "Query rewritten"
        );

        Ok(refined)
    }
}
