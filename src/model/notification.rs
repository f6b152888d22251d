use serde::{Deserialize, Serialize};

use super::common::Id;

fn default_kind() -> String {
    "general".to_string()
}

/// Document in `users/{uid}/notifications`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    #[serde(default)]
    pub notification_id: Id,
    pub title: String,
    pub body: String,
    pub user_id: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationRequest {
    pub title: String,
    pub body: String,
    pub user_id: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationSubscriptionRequest {
    pub topic: String,
}

/// Document `notification_topics/{uid}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopicSubscriptions {
    #[serde(default)]
    pub topics: Vec<String>,
}

impl TopicSubscriptions {
    /// Returns false when already subscribed
    pub fn subscribe(&mut self, topic: &str) -> bool {
        if self.topics.iter().any(|t| t == topic) {
            return false;
        }
        self.topics.push(topic.to_string());
        true
    }

    /// Returns false when not subscribed
    pub fn unsubscribe(&mut self, topic: &str) -> bool {
        let before = self.topics.len();
        self.topics.retain(|t| t != topic);
        self.topics.len() != before
    }
}
