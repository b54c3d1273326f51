//! LLM-backed answer synthesis

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::prompts;
use crate::domain::research::{
    AnswerSynthesizer, InformationStrip, LanguageModel, LegalDomain, ResearchError,
};

/// Writes cited Markdown answers with free-text completion
#[derive(Debug, Clone)]
pub struct LlmAnswerSynthesizer {
    model: Arc<dyn LanguageModel>,
}

impl LlmAnswerSynthesizer {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl AnswerSynthesizer for LlmAnswerSynthesizer {
    async fn domain_answer(
        &self,
        domain: LegalDomain,
        question: &str,
        evidence: &[InformationStrip],
    ) -> Result<String, ResearchError> {
        debug!(%domain, strips = evidence.len(), "Generating domain answer");

        let prompt = prompts::domain_answer_prompt(domain, question, evidence);
        self.model.complete_text(&prompt).await
    }

    async fn final_answer(
        &self,
        question: &str,
        domain_answers: &[String],
    ) -> Result<String, ResearchError> {
        debug!(answers = domain_answers.len(), "Generating final answer");

        let prompt = prompts::final_answer_prompt(question, domain_answers);
        self.model.complete_text(&prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::research::MockLanguageModel;

    #[tokio::test]
    async fn test_domain_answer_renders_evidence() {
        let model = Arc::new(MockLanguageModel::new().with_text("답변 (출처: 근로기준법 제60조)"));
        let synthesizer = LlmAnswerSynthesizer::new(model.clone());
        let evidence = vec![InformationStrip::new("15일 유급휴가", "근로기준법 제60조", 0.9, 0.9)];

        let answer = synthesizer
            .domain_answer(LegalDomain::Labor, "연차?", &evidence)
            .await
            .unwrap();

        assert!(answer.contains("(출처: 근로기준법 제60조)"));
        let call = &model.calls_for(None)[0];
        assert!(call.prompt.user.contains("내용: 15일 유급휴가\n출처: 근로기준법 제60조"));
    }

    #[tokio::test]
    async fn test_domain_answer_without_evidence_asks_for_explicit_statement() {
        let model = Arc::new(MockLanguageModel::new().with_text("관련 정보를 찾을 수 없었습니다."));
        let synthesizer = LlmAnswerSynthesizer::new(model.clone());

        synthesizer
            .domain_answer(LegalDomain::Housing, "q", &[])
            .await
            .unwrap();

        let call = &model.calls()[0];
        assert!(call.prompt.system.contains("관련 정보를 찾을 수 없었다고 명시"));
        assert!(call.prompt.user.contains(prompts::NO_EVIDENCE));
    }

    #[tokio::test]
    async fn test_final_answer_joins_domain_answers() {
        let model = Arc::new(MockLanguageModel::new().with_text("최종"));
        let synthesizer = LlmAnswerSynthesizer::new(model.clone());

        let answer = synthesizer
            .final_answer("q", &["A".to_string(), "B".to_string()])
            .await
            .unwrap();

        assert_eq!(answer, "최종");
        assert!(model.calls()[0].prompt.user.contains("A\n\nB"));
    }
}
