//! Orchestration state and transition tables

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::config::CorrectiveLoopConfig;
use super::domain_tag::LegalDomain;
use super::extraction::InformationStrip;
use super::passage::Passage;

/// Stages of the corrective retrieval loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopStage {
    Retrieve,
    Extract,
    Rewrite,
    Generate,
    Done,
}

/// Outcome of the guard evaluated after each extract round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopDecision {
    Continue,
    End,
}

impl LoopDecision {
    /// End once any strip was accepted or the iteration cap is reached
    pub fn evaluate(state: &CorrectiveLoopState, config: &CorrectiveLoopConfig) -> Self {
        if state.iteration_count() >= config.max_iterations || !state.accepted_strips().is_empty()
        {
            Self::End
        } else {
            Self::Continue
        }
    }
}

impl LoopStage {
    /// Transition table for the corrective loop
    pub fn next(self, state: &CorrectiveLoopState, config: &CorrectiveLoopConfig) -> LoopStage {
        match self {
            Self::Retrieve => Self::Extract,
            Self::Extract => match LoopDecision::evaluate(state, config) {
                LoopDecision::Continue => Self::Rewrite,
                LoopDecision::End => Self::Generate,
            },
            Self::Rewrite => Self::Retrieve,
            Self::Generate | Self::Done => Self::Done,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }
}

/// Per-domain state threaded through one corrective loop invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrectiveLoopState {
    question: String,
    rewritten_query: Option<String>,
    passages: Vec<Passage>,
    accepted_strips: Vec<InformationStrip>,
    iteration_count: u32,
    domain_answer: Option<String>,
}

impl CorrectiveLoopState {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            rewritten_query: None,
            passages: Vec::new(),
            accepted_strips: Vec::new(),
            iteration_count: 0,
            domain_answer: None,
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn rewritten_query(&self) -> Option<&str> {
        self.rewritten_query.as_deref()
    }

    /// Query for the next retrieval: the rewrite if any, else the question
    pub fn active_query(&self) -> &str {
        self.rewritten_query.as_deref().unwrap_or(&self.question)
    }

    pub fn passages(&self) -> &[Passage] {
        &self.passages
    }

    pub fn accepted_strips(&self) -> &[InformationStrip] {
        &self.accepted_strips
    }

    pub fn iteration_count(&self) -> u32 {
        self.iteration_count
    }

    pub fn domain_answer(&self) -> Option<&str> {
        self.domain_answer.as_deref()
    }

    /// Each retrieval round replaces the working set
    pub fn replace_passages(&mut self, passages: Vec<Passage>) {
        self.passages = passages;
    }

    /// Close one extract round: append accepted strips, count the round
    pub fn complete_extraction(&mut self, accepted: Vec<InformationStrip>) {
        self.accepted_strips.extend(accepted);
        self.iteration_count += 1;
    }

    pub fn set_rewritten_query(&mut self, query: impl Into<String>) {
        self.rewritten_query = Some(query.into());
    }

    pub fn set_domain_answer(&mut self, answer: impl Into<String>) {
        self.domain_answer = Some(answer.into());
    }

    /// Accepted strips' content, one per line (refiner input)
    pub fn evidence_summary(&self) -> String {
        self.accepted_strips
            .iter()
            .map(|strip| strip.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// One retrieve/extract round, recorded for observability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopRound {
    pub query: String,
    pub passages: usize,
    pub accepted: usize,
}

/// Trace of a finished corrective loop
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoopTrace {
    pub rounds: Vec<LoopRound>,
}

impl LoopTrace {
    pub fn record(&mut self, query: impl Into<String>, passages: usize, accepted: usize) {
        self.rounds.push(LoopRound {
            query: query.into(),
            passages,
            accepted,
        });
    }
}

/// Result of one domain branch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainOutcome {
    pub domain: LegalDomain,
    pub answer: String,
    pub iterations: u32,
    pub evidence: Vec<InformationStrip>,
    pub trace: LoopTrace,
}

/// A domain answer as joined from a branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainAnswer {
    pub domain: LegalDomain,
    pub answer: String,
    /// Whether this is a placeholder for a failed branch
    #[serde(default)]
    pub failed: bool,
}

impl DomainAnswer {
    pub fn answered(domain: LegalDomain, answer: impl Into<String>) -> Self {
        Self {
            domain,
            answer: answer.into(),
            failed: false,
        }
    }

    /// Explicit marker for a branch that produced no answer
    pub fn unavailable(domain: LegalDomain, reason: &str) -> Self {
        Self {
            domain,
            answer: format!("[{}] 답변 없음: {}", domain.law_name(), reason),
            failed: true,
        }
    }
}

/// State for one conversation turn of the top-level workflow
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopLevelState {
    question: String,
    selected_domains: BTreeSet<LegalDomain>,
    domain_answers: Vec<DomainAnswer>,
    final_answer: Option<String>,
}

impl TopLevelState {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            selected_domains: BTreeSet::new(),
            domain_answers: Vec::new(),
            final_answer: None,
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn selected_domains(&self) -> &BTreeSet<LegalDomain> {
        &self.selected_domains
    }

    pub fn domain_answers(&self) -> &[DomainAnswer] {
        &self.domain_answers
    }

    pub fn final_answer(&self) -> Option<&str> {
        self.final_answer.as_deref()
    }

    pub fn select_domains(&mut self, domains: BTreeSet<LegalDomain>) {
        self.selected_domains = domains;
    }

    /// Append-only; join order does not matter
    pub fn push_domain_answer(&mut self, answer: DomainAnswer) {
        self.domain_answers.push(answer);
    }

    pub fn set_final_answer(&mut self, answer: impl Into<String>) {
        self.final_answer = Some(answer.into());
    }

    /// Domain answers in canonical domain order, independent of join order
    pub fn ordered_answers(&self) -> Vec<String> {
        let mut answers: Vec<&DomainAnswer> = self.domain_answers.iter().collect();
        answers.sort_by(|a, b| a.domain.cmp(&b.domain).then_with(|| a.answer.cmp(&b.answer)));
        answers.into_iter().map(|a| a.answer.clone()).collect()
    }
}
