//! Corrective retrieval loop for one legal domain
//!
//! Drives [`LoopStage`] transitions over a fresh [`CorrectiveLoopState`]:
//! retrieve passages, extract and accept strips, and either rewrite the
//! query for another round or generate the domain answer. The stage table
//! guarantees termination after at most `max_iterations` extract rounds.

use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, info, instrument};

use crate::domain::research::{
    or_no_information, AnswerSynthesizer, CorrectiveLoopConfig, CorrectiveLoopState,
    DomainOutcome, InformationExtractor, InformationStrip, LegalDomain, LoopStage, LoopTrace,
    PassageSource, QueryRefiner, ResearchError,
};
use crate::infrastructure::observability::record_loop_iterations;

/// Agents one loop is composed of
#[derive(Debug, Clone)]
pub struct LoopAgents {
    pub extractor: Arc<dyn InformationExtractor>,
    pub refiner: Arc<dyn QueryRefiner>,
    pub synthesizer: Arc<dyn AnswerSynthesizer>,
}

/// Retrieve → Extract → {Rewrite → Retrieve | Generate} → Done
#[derive(Debug, Clone)]
pub struct CorrectiveLoop {
    domain: LegalDomain,
    source: Arc<dyn PassageSource>,
    agents: LoopAgents,
    config: CorrectiveLoopConfig,
}

impl CorrectiveLoop {
    pub fn new(
        source: Arc<dyn PassageSource>,
        agents: LoopAgents,
        config: CorrectiveLoopConfig,
    ) -> Self {
        Self {
            domain: source.domain(),
            source,
            agents,
            config,
        }
    }

    pub fn domain(&self) -> LegalDomain {
        self.domain
    }

    /// Run the loop to completion for one question
    #[instrument(skip(self, question), fields(domain = %self.domain))]
    pub async fn run(&self, question: &str) -> Result<DomainOutcome, ResearchError> {
        let mut state = CorrectiveLoopState::new(question);
        let mut trace = LoopTrace::default();
        let mut stage = LoopStage::Retrieve;

        while !stage.is_terminal() {
            debug!(?stage, iteration = state.iteration_count(), "Loop stage");

            match stage {
                LoopStage::Retrieve => self.retrieve(&mut state).await?,
                LoopStage::Extract => {
                    let accepted = self.extract(&state).await?;
                    trace.record(state.active_query(), state.passages().len(), accepted.len());
                    state.complete_extraction(accepted);
                }
                LoopStage::Rewrite => self.rewrite(&mut state).await?,
                LoopStage::Generate => self.generate(&mut state).await?,
                LoopStage::Done => {}
            }

            stage = stage.next(&state, &self.config);
        }

        record_loop_iterations(self.domain, state.iteration_count());
        info!(
            iterations = state.iteration_count(),
            accepted = state.accepted_strips().len(),
            "Corrective loop finished"
        );

        Ok(DomainOutcome {
            domain: self.domain,
            answer: state.domain_answer().unwrap_or_default().to_string(),
            iterations: state.iteration_count(),
            evidence: state.accepted_strips().to_vec(),
            trace,
        })
    }

    async fn retrieve(&self, state: &mut CorrectiveLoopState) -> Result<(), ResearchError> {
        let timeout = self.config.retrieval_timeout();
        let query = state.active_query().to_string();

        let passages = tokio::time::timeout(timeout, self.source.search(&query))
            .await
            .map_err(|_| {
                ResearchError::timeout(
                    format!("retrieve:{}", self.domain),
                    self.config.retrieval_timeout_ms,
                )
            })??;

        debug!(
            source = self.source.source_type(),
            query = %query,
            passages = passages.len(),
            "Retrieved passages"
        );

        state.replace_passages(or_no_information(passages));
        Ok(())
    }

    /// Accepted strips of this round, in passage order
    async fn extract(
        &self,
        state: &CorrectiveLoopState,
    ) -> Result<Vec<InformationStrip>, ResearchError> {
        let results = try_join_all(state.passages().iter().map(|passage| {
            self.agents
                .extractor
                .extract(self.domain, state.question(), passage)
        }))
        .await?;

        let acceptance = &self.config.acceptance;
        let accepted = results
            .into_iter()
            .zip(state.passages())
            .flat_map(|(result, passage)| acceptance.accept(result, passage))
            .collect();

        Ok(accepted)
    }

    async fn rewrite(&self, state: &mut CorrectiveLoopState) -> Result<(), ResearchError> {
        let refined = self
            .agents
            .refiner
            .refine(self.domain, state.question(), &state.evidence_summary())
            .await?;

        state.set_rewritten_query(refined.question_refined);
        Ok(())
    }

    async fn generate(&self, state: &mut CorrectiveLoopState) -> Result<(), ResearchError> {
        let answer = self
            .agents
            .synthesizer
            .domain_answer(self.domain, state.question(), state.accepted_strips())
            .await?;

        state.set_domain_answer(answer);
        Ok(())
    }
}
