//! Legal research orchestration: LLM-backed agents, the corrective
//! retrieval loop and the routed fan-out workflow

mod corrective_loop;
mod extractor;
mod factory;
mod language_model;
pub mod prompts;
mod refiner;
mod router;
mod synthesizer;
mod workflow;

pub use corrective_loop::{CorrectiveLoop, LoopAgents};
pub use extractor::LlmInformationExtractor;
pub use factory::ResearchWorkflowFactory;
pub use language_model::ProviderLanguageModel;
pub use refiner::LlmQueryRefiner;
pub use router::LlmDomainRouter;
pub use synthesizer::LlmAnswerSynthesizer;
pub use workflow::{LegalResearchWorkflow, ResearchOutcome};
