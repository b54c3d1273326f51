//! Legal research domain
//!
//! Types and traits for routed corrective retrieval: a domain router picks
//! the legal domains a question belongs to, one corrective loop per domain
//! retrieves and verifies passages, and a synthesizer merges the cited
//! domain answers into one final answer.

mod agents;
mod config;
mod domain_tag;
mod error;
mod extraction;
mod language_model;
mod passage;
mod routing;
mod session;
mod state;

pub use agents::{AnswerSynthesizer, DomainRouter, InformationExtractor, QueryRefiner};
pub use config::{BranchFailurePolicy, CorrectiveLoopConfig, WorkflowConfig, MAX_ITERATIONS};
pub use domain_tag::LegalDomain;
pub use error::ResearchError;
pub use extraction::{AcceptancePolicy, ExtractionResult, InformationStrip, RefinedQuery};
pub use language_model::{
    parse_structured, ChatPrompt, LanguageModel, LanguageModelExt, StructuredOutput,
};
pub use passage::{
    or_no_information, Passage, PassageSource, INDEX_UNAVAILABLE, NO_INFORMATION_FOUND,
    UNKNOWN_SOURCE,
};
pub use routing::{RouteSelection, ToolSelection};
pub use session::{SessionRecord, SessionRepository, SessionTurn};
pub use state::{
    CorrectiveLoopState, DomainAnswer, DomainOutcome, LoopDecision, LoopRound, LoopStage,
    LoopTrace, TopLevelState,
};

#[cfg(test)]
pub use language_model::mock::{MockLanguageModel, RecordedCall};
#[cfg(test)]
pub use passage::mock::ScriptedPassageSource;
#[cfg(test)]
pub use session::MockSessionRepository;
