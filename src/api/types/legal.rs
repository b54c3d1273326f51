//! Legal question request/response bodies

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::research::{DomainAnswer, DomainOutcome, LegalDomain, SessionRecord, SessionTurn};
use crate::infrastructure::services::ConversationTurn;

/// Body of `POST /v1/legal/ask`
#[derive(Debug, Clone, Deserialize)]
pub struct AskRequest {
    pub question: String,
    #[serde(default)]
    pub session_id: Option<String>,
    /// Include per-domain loop traces and evidence in the response
    #[serde(default)]
    pub include_trace: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AskResponse {
    pub session_id: String,
    pub answer: String,
    pub domains: Vec<LegalDomain>,
    pub domain_answers: Vec<DomainAnswer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branches: Option<Vec<DomainOutcome>>,
}

impl AskResponse {
    pub fn from_turn(turn: ConversationTurn, include_trace: bool) -> Self {
        let outcome = turn.outcome;
        Self {
            session_id: turn.session_id,
            answer: outcome.final_answer,
            domains: outcome.domains,
            domain_answers: outcome.domain_answers,
            branches: include_trace.then_some(outcome.branches),
        }
    }
}

/// Body of `GET /v1/sessions/{session_id}`
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub turns: Vec<SessionTurn>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SessionRecord> for SessionResponse {
    fn from(record: SessionRecord) -> Self {
        Self {
            session_id: record.session_id().to_string(),
            turns: record.turns().to_vec(),
            created_at: record.created_at(),
            updated_at: record.updated_at(),
        }
    }
}
