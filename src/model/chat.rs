use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::common::Id;

/// Document `chats/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    #[serde(default)]
    pub conversation_id: Id,
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Conversation {
    pub fn has_participant(&self, user_id: &str) -> bool {
        self.participants.iter().any(|p| p == user_id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewConversationRequest {
    pub participants: Vec<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateConversationRequest {
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// Document in `chats/{id}/messages`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub message_id: Id,
    pub sender_id: String,
    pub message: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMessageRequest {
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotQueryRequest {
    pub query: String,
}
