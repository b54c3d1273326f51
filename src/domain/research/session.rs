//! Conversation session records

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain_tag::LegalDomain;
use super::error::ResearchError;

#[cfg(test)]
use mockall::automock;

/// One answered turn of a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionTurn {
    pub question: String,
    pub domains: Vec<LegalDomain>,
    pub final_answer: String,
    pub created_at: DateTime<Utc>,
}

impl SessionTurn {
    pub fn new(
        question: impl Into<String>,
        domains: Vec<LegalDomain>,
        final_answer: impl Into<String>,
    ) -> Self {
        Self {
            question: question.into(),
            domains,
            final_answer: final_answer.into(),
            created_at: Utc::now(),
        }
    }
}

/// Conversation state kept between turns, keyed by an opaque session id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    session_id: String,
    turns: Vec<SessionTurn>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(session_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            turns: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn turns(&self) -> &[SessionTurn] {
        &self.turns
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn last_final_answer(&self) -> Option<&str> {
        self.turns.last().map(|turn| turn.final_answer.as_str())
    }

    pub fn push_turn(&mut self, turn: SessionTurn) {
        self.updated_at = turn.created_at;
        self.turns.push(turn);
    }

    /// Keep only the most recent `max_turns` turns
    pub fn truncate_history(&mut self, max_turns: usize) {
        if self.turns.len() > max_turns {
            let excess = self.turns.len() - max_turns;
            self.turns.drain(..excess);
        }
    }
}

/// Storage for conversation sessions
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Finds a session by id
    async fn find(&self, session_id: &str) -> Result<Option<SessionRecord>, ResearchError>;

    /// Appends a turn, creating the session if needed and keeping only the
    /// latest `max_turns` turns. Concurrent appends to one session all land.
    async fn append_turn(
        &self,
        session_id: &str,
        turn: SessionTurn,
        max_turns: usize,
    ) -> Result<SessionRecord, ResearchError>;

    /// Deletes a session, returning whether it existed
    async fn delete(&self, session_id: &str) -> Result<bool, ResearchError>;

    /// Number of stored sessions
    async fn count(&self) -> Result<usize, ResearchError>;

    /// Deletes sessions last updated before `before`, returning how many
    async fn delete_older_than(&self, before: DateTime<Utc>) -> Result<u64, ResearchError>;
}
