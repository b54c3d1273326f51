//! Agent traits composed by the corrective loop and the top-level workflow

use std::collections::BTreeSet;
use std::fmt::Debug;

use async_trait::async_trait;

use super::domain_tag::LegalDomain;
use super::error::ResearchError;
use super::extraction::{ExtractionResult, InformationStrip, RefinedQuery};
use super::passage::Passage;

/// Classifies a question into the applicable legal domains
#[async_trait]
pub trait DomainRouter: Send + Sync + Debug {
    /// Returns a non-empty set of domains
    async fn route(&self, question: &str) -> Result<BTreeSet<LegalDomain>, ResearchError>;
}

/// Pulls scored facts out of one passage
#[async_trait]
pub trait InformationExtractor: Send + Sync + Debug {
    async fn extract(
        &self,
        domain: LegalDomain,
        question: &str,
        passage: &Passage,
    ) -> Result<ExtractionResult, ResearchError>;
}

/// Rewrites a question when the evidence gathered so far is insufficient
#[async_trait]
pub trait QueryRefiner: Send + Sync + Debug {
    async fn refine(
        &self,
        domain: LegalDomain,
        question: &str,
        evidence_summary: &str,
    ) -> Result<RefinedQuery, ResearchError>;
}

/// Turns evidence into cited Markdown answers
#[async_trait]
pub trait AnswerSynthesizer: Send + Sync + Debug {
    /// Answer for one domain from its accepted strips (may be empty)
    async fn domain_answer(
        &self,
        domain: LegalDomain,
        question: &str,
        evidence: &[InformationStrip],
    ) -> Result<String, ResearchError>;

    /// Final answer merged from every domain answer
    async fn final_answer(
        &self,
        question: &str,
        domain_answers: &[String],
    ) -> Result<String, ResearchError>;
}
