//! Conversation service - one research turn per call, recorded per session

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::research::{ResearchError, SessionRecord, SessionRepository, SessionTurn};
use crate::infrastructure::observability::record_request;
use crate::infrastructure::research::{LegalResearchWorkflow, ResearchOutcome};

const DEFAULT_MAX_TURNS: usize = 20;
const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// A completed turn
#[derive(Debug, Clone)]
pub struct ConversationTurn {
    pub session_id: String,
    pub outcome: ResearchOutcome,
}

/// Entry point for questions; each call seeds a fresh workflow state
#[derive(Clone)]
pub struct ConversationService {
    workflow: Arc<LegalResearchWorkflow>,
    sessions: Arc<dyn SessionRepository>,
    max_turns: usize,
    session_ttl: Duration,
}

impl std::fmt::Debug for ConversationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationService")
            .field("workflow", &self.workflow)
            .field("max_turns", &self.max_turns)
            .field("session_ttl", &self.session_ttl)
            .finish_non_exhaustive()
    }
}

impl ConversationService {
    pub fn new(workflow: Arc<LegalResearchWorkflow>, sessions: Arc<dyn SessionRepository>) -> Self {
        Self {
            workflow,
            sessions,
            max_turns: DEFAULT_MAX_TURNS,
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }

    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns.max(1);
        self
    }

    pub fn with_session_ttl(mut self, session_ttl: Duration) -> Self {
        self.session_ttl = session_ttl;
        self
    }

    /// Answer `question` within `session_id`, returning only the final answer
    pub async fn handle(&self, question: &str, session_id: &str) -> Result<String, ResearchError> {
        let turn = self.ask(question, Some(session_id)).await?;
        Ok(turn.outcome.final_answer)
    }

    /// Answer `question`, creating a session when none is given
    #[instrument(skip(self, question))]
    pub async fn ask(
        &self,
        question: &str,
        session_id: Option<&str>,
    ) -> Result<ConversationTurn, ResearchError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(ResearchError::invalid_input("question must not be empty"));
        }

        let session_id = match session_id.map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => Uuid::new_v4().to_string(),
        };

        let started = Instant::now();
        let result = self.workflow.run(question).await;
        record_request(result.is_ok(), started.elapsed());

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(%session_id, error = %e, "Research turn failed");
                return Err(e);
            }
        };

        self.record_turn(&session_id, question, &outcome).await?;

        info!(
            %session_id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Question answered"
        );

        Ok(ConversationTurn {
            session_id,
            outcome,
        })
    }

    /// Stored conversation for a session
    pub async fn session(&self, session_id: &str) -> Result<Option<SessionRecord>, ResearchError> {
        self.sessions.find(session_id).await
    }

    pub async fn session_count(&self) -> Result<usize, ResearchError> {
        self.sessions.count().await
    }

    /// Delete sessions idle for longer than the session TTL
    #[instrument(skip(self))]
    pub async fn cleanup_expired(&self) -> Result<u64, ResearchError> {
        let ttl = chrono::Duration::from_std(self.session_ttl)
            .unwrap_or_else(|_| chrono::Duration::days(1));

        let deleted = self.sessions.delete_older_than(Utc::now() - ttl).await?;

        if deleted > 0 {
            info!(deleted_count = deleted, "Cleaned up expired sessions");
        }

        Ok(deleted)
    }

    /// Drop a stored conversation; returns whether it existed
    pub async fn end_session(&self, session_id: &str) -> Result<bool, ResearchError> {
        self.sessions.delete(session_id).await
    }

    async fn record_turn(
        &self,
        session_id: &str,
        question: &str,
        outcome: &ResearchOutcome,
    ) -> Result<(), ResearchError> {
        let turn = SessionTurn::new(question, outcome.domains.clone(), &outcome.final_answer);

        self.sessions
            .append_turn(session_id, turn, self.max_turns)
            .await?;

        Ok(())
    }
}
