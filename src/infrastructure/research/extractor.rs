//! LLM-backed information extractor

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::prompts;
use crate::domain::research::{
    ExtractionResult, InformationExtractor, LanguageModel, LanguageModelExt, LegalDomain, Passage,
    ResearchError,
};

/// Extracts scored strips from one passage, speaking as the domain expert
#[derive(Debug, Clone)]
pub struct LlmInformationExtractor {
    model: Arc<dyn LanguageModel>,
}

impl LlmInformationExtractor {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl InformationExtractor for LlmInformationExtractor {
    async fn extract(
        &self,
        domain: LegalDomain,
        question: &str,
        passage: &Passage,
    ) -> Result<ExtractionResult, ResearchError> {
        // Sentinels carry no facts; the outcome is always zero strips
        if passage.is_sentinel() {
            debug!(%domain, text = %passage.text, "Skipping extraction for sentinel passage");
            return Ok(ExtractionResult {
                strips: Vec::new(),
                query_relevance: 0.0,
            });
        }

        let prompt = prompts::extraction_prompt(domain, question, passage);
        let result: ExtractionResult = self.model.complete_structured(&prompt).await?;

        debug!(
            %domain,
            source = %passage.source_id,
            strips = result.strips.len(),
            query_relevance = result.query_relevance,
            "Extracted strips"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::research::MockLanguageModel;

    #[tokio::test]
    async fn test_extract_parses_scored_strips() {
        let model = Arc::new(MockLanguageModel::new().with_structured(
            "extraction_result",
            serde_json::json!({
                "strips": [{
                    "content": "사용자는 1년간 80% 이상 출근한 근로자에게 15일의 유급휴가를 주어야 한다.",
                    "source": "근로기준법 제60조",
                    "relevance_score": 0.95,
                    "faithfulness_score": 0.9
                }],
                "query_relevance": 0.9
            }),
        ));
        let extractor = LlmInformationExtractor::new(model.clone());
        let passage = Passage::new("제60조(연차 유급휴가) ...", "근로기준법 제60조");

        let result = extractor
            .extract(LegalDomain::Labor, "연차휴가는 며칠?", &passage)
            .await
            .unwrap();

        assert_eq!(result.strips.len(), 1);
        assert_eq!(result.query_relevance, 0.9);

        let calls = model.calls_for(Some("extraction_result"));
        assert_eq!(calls.len(), 1);
        assert!(calls[0].prompt.system.contains("근로기준법 전문가"));
        assert!(calls[0].prompt.user.contains("제60조(연차 유급휴가)"));
    }

    #[tokio::test]
    async fn test_sentinel_passage_skips_model() {
        let model = Arc::new(MockLanguageModel::new());
        let extractor = LlmInformationExtractor::new(model.clone());

        let result = extractor
            .extract(LegalDomain::Housing, "q", &Passage::no_information())
            .await
            .unwrap();

        assert!(result.strips.is_empty());
        assert!(model.calls().is_empty());
    }

    #[tokio::test]
    async fn test_out_of_range_score_is_schema_violation() {
        let model = Arc::new(MockLanguageModel::new().with_structured(
            "extraction_result",
            serde_json::json!({
                "strips": [{"content": "x", "source": "y", "relevance_score": 7, "faithfulness_score": 0.9}],
                "query_relevance": 0.9
            }),
        ));
        let extractor = LlmInformationExtractor::new(model);

        let err = extractor
            .extract(LegalDomain::Labor, "q", &Passage::new("text", "src"))
            .await
            .unwrap_err();

        assert!(matches!(err, ResearchError::SchemaViolation { .. }));
    }
}
