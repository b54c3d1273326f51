//! Top-level research workflow: route, fan out per domain, join, synthesize

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{info, instrument, warn};

use super::corrective_loop::CorrectiveLoop;
use crate::domain::research::{
    AnswerSynthesizer, BranchFailurePolicy, DomainAnswer, DomainOutcome, DomainRouter,
    LegalDomain, ResearchError, TopLevelState,
};
use crate::infrastructure::observability::record_branch_failure;

/// Result of one conversation turn
#[derive(Debug, Clone, Serialize)]
pub struct ResearchOutcome {
    pub final_answer: String,
    pub domains: Vec<LegalDomain>,
    /// Domain answers in canonical domain order
    pub domain_answers: Vec<DomainAnswer>,
    /// Successful branch outcomes, in canonical domain order
    pub branches: Vec<DomainOutcome>,
}

/// Routes a question, runs one corrective loop per selected domain
/// concurrently, and merges the domain answers
#[derive(Debug, Clone)]
pub struct LegalResearchWorkflow {
    router: Arc<dyn DomainRouter>,
    loops: HashMap<LegalDomain, Arc<CorrectiveLoop>>,
    synthesizer: Arc<dyn AnswerSynthesizer>,
    policy: BranchFailurePolicy,
}

impl LegalResearchWorkflow {
    pub fn new(
        router: Arc<dyn DomainRouter>,
        loops: Vec<CorrectiveLoop>,
        synthesizer: Arc<dyn AnswerSynthesizer>,
    ) -> Self {
        let loops = loops
            .into_iter()
            .map(|corrective| (corrective.domain(), Arc::new(corrective)))
            .collect();

        Self {
            router,
            loops,
            synthesizer,
            policy: BranchFailurePolicy::default(),
        }
    }

    pub fn with_branch_failure_policy(mut self, policy: BranchFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn branch_failure_policy(&self) -> BranchFailurePolicy {
        self.policy
    }

    /// Run one turn over a fresh [`TopLevelState`]
    #[instrument(skip(self, question))]
    pub async fn run(&self, question: &str) -> Result<ResearchOutcome, ResearchError> {
        let mut state = TopLevelState::new(question);

        let domains = self.router.route(question).await?;
        if domains.is_empty() {
            return Err(ResearchError::schema_violation(
                "route_selection",
                "router returned no domains",
            ));
        }
        state.select_domains(domains);

        let (mut branches, failures) = self.fan_out(&state).await;

        for outcome in &branches {
            state.push_domain_answer(DomainAnswer::answered(outcome.domain, &outcome.answer));
        }

        // Degrade still fails the turn when no branch produced an answer
        let abort = self.policy == BranchFailurePolicy::Abort || branches.is_empty();

        if abort {
            if let Some(failure) = failures.into_iter().next() {
                return Err(failure);
            }
        } else {
            for failure in &failures {
                if let Some(domain) = failure.failed_domain() {
                    let reason = failure.root_cause().to_string();
                    state.push_domain_answer(DomainAnswer::unavailable(domain, &reason));
                }
            }
        }

        let final_answer = self
            .synthesizer
            .final_answer(question, &state.ordered_answers())
            .await?;
        state.set_final_answer(final_answer.clone());

        info!(
            domains = state.selected_domains().len(),
            answers = state.domain_answers().len(),
            "Research turn completed"
        );

        let mut domain_answers = state.domain_answers().to_vec();
        domain_answers.sort_by_key(|answer| answer.domain);
        branches.sort_by_key(|outcome| outcome.domain);

        Ok(ResearchOutcome {
            final_answer,
            domains: state.selected_domains().iter().copied().collect(),
            domain_answers,
            branches,
        })
    }

    /// Run every selected branch and join all of them before returning.
    ///
    /// Failures come back wrapped in `DomainBranchFailure`, sorted by domain.
    async fn fan_out(&self, state: &TopLevelState) -> (Vec<DomainOutcome>, Vec<ResearchError>) {
        let mut join_set = JoinSet::new();
        let mut pending = BTreeSet::new();
        let mut failures = Vec::new();

        for &domain in state.selected_domains() {
            let Some(corrective) = self.loops.get(&domain).cloned() else {
                failures.push(ResearchError::branch_failure(
                    domain,
                    ResearchError::configuration(format!("no passage source for {}", domain)),
                ));
                continue;
            };

            let question = state.question().to_string();
            pending.insert(domain);
            join_set.spawn(async move { (domain, corrective.run(&question).await) });
        }

        let mut branches = Vec::new();

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((domain, Ok(outcome))) => {
                    pending.remove(&domain);
                    info!(%domain, iterations = outcome.iterations, "Domain branch completed");
                    branches.push(outcome);
                }
                Ok((domain, Err(e))) => {
                    pending.remove(&domain);
                    warn!(%domain, error = %e, "Domain branch failed");
                    failures.push(ResearchError::branch_failure(domain, e));
                }
                Err(e) => {
                    warn!("Domain branch task join error: {}", e);
                }
            }
        }

        // Branches whose task panicked or was cancelled never reported back
        for domain in pending {
            failures.push(ResearchError::branch_failure(
                domain,
                ResearchError::internal("domain branch task did not complete"),
            ));
        }

        for failure in &failures {
            if let Some(domain) = failure.failed_domain() {
                record_branch_failure(domain);
            }
        }

        failures.sort_by_key(|failure| failure.failed_domain());
        (branches, failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::research::{
        CorrectiveLoopConfig, MockLanguageModel, Passage, PassageSource, ScriptedPassageSource,
    };
    use crate::infrastructure::research::{
        LlmAnswerSynthesizer, LlmDomainRouter, LlmInformationExtractor, LlmQueryRefiner,
        LoopAgents,
    };

    fn route(labels: &[&str]) -> serde_json::Value {
        let tools: Vec<_> = labels
            .iter()
            .map(|label| serde_json::json!({"tool": label}))
            .collect();
        serde_json::json!({ "tools": tools })
    }

    fn good_extraction(content: &str) -> String {
        serde_json::json!({
            "strips": [{"content": content, "source": "s", "relevance_score": 0.9, "faithfulness_score": 0.9}],
            "query_relevance": 0.9
        })
        .to_string()
    }

    /// Text replies: domain answers echo the law name, the final answer echoes its input
    fn text_reply(prompt: &crate::domain::research::ChatPrompt) -> Result<String, ResearchError> {
        if prompt.user.starts_with("다음 정보를 바탕으로") {
            Ok(format!("FINAL<{}>", prompt.user))
        } else if prompt.system.contains("주택임대차보호법 전문가") {
            Ok("전세금 반환 (출처: 주택임대차보호법 제3조의2)".to_string())
        } else if prompt.system.contains("개인정보보호법 전문가") {
            Ok("유출 통지 의무 (출처: 개인정보 보호법 제34조)".to_string())
        } else {
            Ok("웹 검색 결과 (출처: 웹사이트, https://example.com)".to_string())
        }
    }

    fn workflow(
        model: Arc<MockLanguageModel>,
        sources: Vec<ScriptedPassageSource>,
    ) -> LegalResearchWorkflow {
        let agents = LoopAgents {
            extractor: Arc::new(LlmInformationExtractor::new(model.clone())),
            refiner: Arc::new(LlmQueryRefiner::new(model.clone())),
            synthesizer: Arc::new(LlmAnswerSynthesizer::new(model.clone())),
        };
        let loops = sources
            .into_iter()
            .map(|source| {
                CorrectiveLoop::new(
                    Arc::new(source),
                    agents.clone(),
                    CorrectiveLoopConfig::default(),
                )
            })
            .collect();

        LegalResearchWorkflow::new(
            Arc::new(LlmDomainRouter::new(model.clone())),
            loops,
            Arc::new(LlmAnswerSynthesizer::new(model)),
        )
    }

    fn all_sources() -> Vec<ScriptedPassageSource> {
        vec![
            ScriptedPassageSource::new(LegalDomain::PersonalData)
                .with_fallback(vec![Passage::new("제34조 유출 통지", "개인정보 보호법 제34조")]),
            ScriptedPassageSource::new(LegalDomain::Labor),
            ScriptedPassageSource::new(LegalDomain::Housing)
                .with_fallback(vec![Passage::new("제3조의2", "주택임대차보호법 제3조의2")]),
            ScriptedPassageSource::new(LegalDomain::Web).with_fallback(vec![Passage::new(
                "<Document href=\"https://example.com\"/>\n전세 사기\n</Document>",
                "web search",
            )]),
        ]
    }

    #[tokio::test]
    async fn test_single_domain_article_question() {
        let model = Arc::new(
            MockLanguageModel::new()
                .with_structured("route_selection", route(&["search_personal"]))
                .with_structured_fn("extraction_result", |_| Ok(good_extraction("통지 의무")))
                .with_text_fn(text_reply),
        );
        let workflow = workflow(model.clone(), all_sources());

        let outcome = workflow.run("개인정보 유출 시 기업의 법적 조치는?").await.unwrap();

        assert_eq!(outcome.domains, vec![LegalDomain::PersonalData]);
        assert_eq!(outcome.domain_answers.len(), 1);
        assert!(outcome.final_answer.contains("(출처: 개인정보 보호법"));
        assert_eq!(outcome.branches[0].iterations, 1);
    }

    #[tokio::test]
    async fn test_topical_question_runs_domain_and_web() {
        let model = Arc::new(
            MockLanguageModel::new()
                .with_structured("route_selection", route(&["search_web", "search_housing"]))
                .with_structured_fn("extraction_result", |_| Ok(good_extraction("반환 의무")))
                .with_text_fn(text_reply),
        );
        let workflow = workflow(model.clone(), all_sources());

        let outcome = workflow.run("집주인이 전세금을 안 돌려줘요").await.unwrap();

        assert_eq!(outcome.domains, vec![LegalDomain::Housing, LegalDomain::Web]);
        assert_eq!(outcome.domain_answers.len(), 2);
        assert!(outcome.final_answer.contains("주택임대차보호법 제3조의2"));
        assert!(outcome.final_answer.contains("https://example.com"));

        let final_calls: Vec<_> = model
            .calls_for(None)
            .into_iter()
            .filter(|call| call.prompt.user.starts_with("다음 정보를 바탕으로"))
            .collect();
        assert_eq!(final_calls.len(), 1);
    }

    /// Source whose search only completes once every sharing branch is searching
    #[derive(Debug)]
    struct RendezvousSource {
        domain: LegalDomain,
        barrier: Arc<tokio::sync::Barrier>,
    }

    #[async_trait::async_trait]
    impl PassageSource for RendezvousSource {
        fn domain(&self) -> LegalDomain {
            self.domain
        }

        async fn search(&self, _query: &str) -> Result<Vec<Passage>, ResearchError> {
            self.barrier.wait().await;
            Ok(vec![Passage::new("본문", self.domain.law_name())])
        }

        fn source_type(&self) -> &'static str {
            "rendezvous"
        }
    }

    #[tokio::test]
    async fn test_domain_branches_run_concurrently() {
        let model = Arc::new(
            MockLanguageModel::new()
                .with_structured("route_selection", route(&["search_housing", "search_personal"]))
                .with_structured_fn("extraction_result", |_| Ok(good_extraction("요건")))
                .with_text_fn(text_reply),
        );
        let agents = LoopAgents {
            extractor: Arc::new(LlmInformationExtractor::new(model.clone())),
            refiner: Arc::new(LlmQueryRefiner::new(model.clone())),
            synthesizer: Arc::new(LlmAnswerSynthesizer::new(model.clone())),
        };
        let barrier = Arc::new(tokio::sync::Barrier::new(2));
        let loops = [LegalDomain::Housing, LegalDomain::PersonalData]
            .into_iter()
            .map(|domain| {
                CorrectiveLoop::new(
                    Arc::new(RendezvousSource {
                        domain,
                        barrier: barrier.clone(),
                    }),
                    agents.clone(),
                    CorrectiveLoopConfig::default(),
                )
            })
            .collect();
        let workflow = LegalResearchWorkflow::new(
            Arc::new(LlmDomainRouter::new(model.clone())),
            loops,
            Arc::new(LlmAnswerSynthesizer::new(model)),
        );

        let outcome = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            workflow.run("전세 계약서에 적힌 개인정보는?"),
        )
        .await
        .expect("domain branches ran sequentially")
        .unwrap();

        assert_eq!(
            outcome.domains,
            vec![LegalDomain::PersonalData, LegalDomain::Housing]
        );
        assert_eq!(outcome.domain_answers.len(), 2);
    }

    #[tokio::test]
    async fn test_final_input_is_order_insensitive() {
        let run = |labels: &'static [&'static str]| async move {
            let model = Arc::new(
                MockLanguageModel::new()
                    .with_structured("route_selection", route(labels))
                    .with_structured_fn("extraction_result", |_| Ok(good_extraction("x")))
                    .with_text_fn(text_reply),
            );
            workflow(model, all_sources())
                .run("q")
                .await
                .unwrap()
                .final_answer
        };

        let forward = run(&["search_housing", "search_web", "search_personal"]).await;
        let backward = run(&["search_personal", "search_web", "search_housing"]).await;

        assert_eq!(forward, backward);
    }

    #[tokio::test]
    async fn test_schema_violation_aborts_with_branch_failure() {
        let model = Arc::new(
            MockLanguageModel::new()
                .with_structured("route_selection", route(&["search_housing", "search_web"]))
                .with_structured_fn("extraction_result", |prompt| {
                    if prompt.system.contains("주택임대차보호법 전문가") {
                        Ok("{\"strips\": \"broken\"}".to_string())
                    } else {
                        Ok(good_extraction("x"))
                    }
                })
                .with_text_fn(text_reply),
        );
        let workflow = workflow(model.clone(), all_sources());

        let err = workflow.run("q").await.unwrap_err();

        assert_eq!(err.failed_domain(), Some(LegalDomain::Housing));
        assert!(matches!(
            err.root_cause(),
            ResearchError::SchemaViolation { .. }
        ));
        assert!(model
            .calls_for(None)
            .iter()
            .all(|call| !call.prompt.user.starts_with("다음 정보를 바탕으로")));
    }

    #[tokio::test]
    async fn test_degrade_policy_marks_failed_domain() {
        let model = Arc::new(
            MockLanguageModel::new()
                .with_structured("route_selection", route(&["search_housing", "search_web"]))
                .with_structured_fn("extraction_result", |_| Ok(good_extraction("x")))
                .with_text_fn(text_reply),
        );
        let mut sources = all_sources();
        sources[2] = ScriptedPassageSource::new(LegalDomain::Housing).with_error("index offline");
        let workflow = workflow(model, sources)
            .with_branch_failure_policy(BranchFailurePolicy::Degrade);

        let outcome = workflow.run("q").await.unwrap();

        assert_eq!(outcome.domain_answers.len(), 2);
        let housing = &outcome.domain_answers[0];
        assert_eq!(housing.domain, LegalDomain::Housing);
        assert!(housing.failed);
        assert!(housing.answer.starts_with("[주택임대차보호법] 답변 없음"));
        assert!(outcome.final_answer.contains("답변 없음"));
        assert_eq!(outcome.branches.len(), 1);
    }

    #[tokio::test]
    async fn test_degrade_policy_fails_when_every_branch_fails() {
        let model = Arc::new(
            MockLanguageModel::new()
                .with_structured("route_selection", route(&["search_labor"]))
                .with_text_fn(text_reply),
        );
        let sources = vec![ScriptedPassageSource::new(LegalDomain::Labor).with_error("down")];
        let workflow = workflow(model, sources)
            .with_branch_failure_policy(BranchFailurePolicy::Degrade);

        let err = workflow.run("q").await.unwrap_err();

        assert_eq!(err.failed_domain(), Some(LegalDomain::Labor));
        assert!(matches!(err.root_cause(), ResearchError::Retrieval { .. }));
    }

    #[tokio::test]
    async fn test_missing_loop_is_branch_failure() {
        let model = Arc::new(
            MockLanguageModel::new()
                .with_structured("route_selection", route(&["search_web"]))
                .with_text_fn(text_reply),
        );
        let workflow = workflow(model, vec![]);

        let err = workflow.run("q").await.unwrap_err();

        assert_eq!(err.failed_domain(), Some(LegalDomain::Web));
        assert!(matches!(err.root_cause(), ResearchError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_router_failure_is_not_a_branch_failure() {
        let model = Arc::new(
            MockLanguageModel::new().with_raw_structured("route_selection", "{\"tools\": 3}"),
        );
        let workflow = workflow(model, all_sources());

        let err = workflow.run("q").await.unwrap_err();

        assert!(err.failed_domain().is_none());
        assert!(matches!(err, ResearchError::SchemaViolation { .. }));
    }
}
