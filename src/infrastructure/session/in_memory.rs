//! In-memory session repository

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::research::{ResearchError, SessionRecord, SessionRepository, SessionTurn};

/// Process-local session store keyed by session id
#[derive(Debug, Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<String, SessionRecord>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn find(&self, session_id: &str) -> Result<Option<SessionRecord>, ResearchError> {
        Ok(self.sessions.read().await.get(session_id).cloned())
    }

    async fn append_turn(
        &self,
        session_id: &str,
        turn: SessionTurn,
        max_turns: usize,
    ) -> Result<SessionRecord, ResearchError> {
        let mut sessions = self.sessions.write().await;
        let record = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionRecord::new(session_id));

        record.push_turn(turn);
        record.truncate_history(max_turns);

        Ok(record.clone())
    }

    async fn delete(&self, session_id: &str) -> Result<bool, ResearchError> {
        Ok(self.sessions.write().await.remove(session_id).is_some())
    }

    async fn count(&self) -> Result<usize, ResearchError> {
        Ok(self.sessions.read().await.len())
    }

    async fn delete_older_than(&self, before: DateTime<Utc>) -> Result<u64, ResearchError> {
        let mut sessions = self.sessions.write().await;
        let before_len = sessions.len();

        sessions.retain(|_, record| record.updated_at() >= before);

        Ok((before_len - sessions.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::domain::research::LegalDomain;

    #[tokio::test]
    async fn test_append_creates_and_find() {
        let repo = InMemorySessionRepository::new();

        repo.append_turn("s-1", SessionTurn::new("q", vec![LegalDomain::Labor], "a"), 20)
            .await
            .unwrap();

        let found = repo.find("s-1").await.unwrap().unwrap();
        assert_eq!(found.last_final_answer(), Some("a"));
        assert!(repo.find("missing").await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_append_truncates_and_delete() {
        let repo = InMemorySessionRepository::new();
        repo.append_turn("s-1", SessionTurn::new("q1", vec![], "a1"), 1)
            .await
            .unwrap();

        let record = repo
            .append_turn("s-1", SessionTurn::new("q2", vec![], "a2"), 1)
            .await
            .unwrap();

        assert_eq!(record.turns().len(), 1);
        assert_eq!(record.turns()[0].question, "q2");
        assert_eq!(repo.count().await.unwrap(), 1);

        assert!(repo.delete("s-1").await.unwrap());
        assert!(!repo.delete("s-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_appends_to_one_session_all_land() {
        let repo = Arc::new(InMemorySessionRepository::new());

        let mut handles = Vec::new();
        for i in 0..16 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.append_turn("s", SessionTurn::new(format!("q{}", i), vec![], "a"), 20)
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(repo.find("s").await.unwrap().unwrap().turns().len(), 16);
    }

    #[tokio::test]
    async fn test_delete_older_than_uses_last_update() {
        let repo = InMemorySessionRepository::new();
        repo.append_turn("s-1", SessionTurn::new("q", vec![], "a"), 20)
            .await
            .unwrap();
        repo.append_turn("s-2", SessionTurn::new("q", vec![], "a"), 20)
            .await
            .unwrap();

        let deleted = repo
            .delete_older_than(Utc::now() - chrono::Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(deleted, 0);

        let deleted = repo
            .delete_older_than(Utc::now() + chrono::Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(repo.count().await.unwrap(), 0);
    }
}
