//! Legal RAG Gateway
//!
//! Answers Korean consumer-law questions by routing each question to the
//! relevant legal domains, running a corrective retrieval loop per domain
//! concurrently, and merging the cited domain answers:
//! - 개인정보 보호법, 근로기준법 and 주택임대차보호법 statute corpora
//! - Open web search through Tavily
//! - Per-session conversation history

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use tracing::info;

use api::state::AppState;
use infrastructure::research::ResearchWorkflowFactory;
use infrastructure::services::ConversationService;
use infrastructure::session::InMemorySessionRepository;

pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    Ok(AppState::new(Arc::new(create_conversation_service(config).await?)))
}

/// Wire the research workflow and session store into a [`ConversationService`]
pub async fn create_conversation_service(config: &AppConfig) -> anyhow::Result<ConversationService> {
    let workflow = ResearchWorkflowFactory::create(config).await?;

    info!(
        policy = ?workflow.branch_failure_policy(),
        max_turns = config.session.max_turns,
        session_ttl_secs = config.session.ttl_secs,
        "Research workflow ready"
    );

    Ok(ConversationService::new(
        Arc::new(workflow),
        Arc::new(InMemorySessionRepository::new()),
    )
    .with_max_turns(config.session.max_turns)
    .with_session_ttl(config.session.ttl()))
}
