//! Application state shared by handlers

use std::sync::Arc;

use crate::infrastructure::services::ConversationService;

#[derive(Debug, Clone)]
pub struct AppState {
    pub conversation: Arc<ConversationService>,
}

impl AppState {
    pub fn new(conversation: Arc<ConversationService>) -> Self {
        Self { conversation }
    }
}
