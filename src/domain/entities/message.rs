use super::User;
use chrono::{DateTime, Utc};

/// An inbound text message delivered by the session
#[derive(Debug, Clone)]
pub struct MessageEvent {
    pub id: String,
    pub channel_id: String,
    pub author: User,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl MessageEvent {
    pub fn new(channel_id: impl Into<String>, author: User, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            channel_id: channel_id.into(),
            author,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Handle to a message the bot has sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub id: String,
    pub channel_id: String,
}
