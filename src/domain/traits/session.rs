use std::time::Duration;

use crate::application::errors::SessionError;
use crate::domain::entities::{Permissions, SentMessage};

/// Session trait - abstraction over the chat-platform connection.
///
/// Calls are blocking and made inline from the dispatch path; the event
/// source may invoke them from several threads at once.
pub trait Session: Send + Sync {
    /// Open the connection. Failure here aborts startup.
    fn open(&self) -> Result<(), SessionError> {
        Ok(())
    }

    /// Close the connection
    fn close(&self) -> Result<(), SessionError> {
        Ok(())
    }

    /// Send a text message to a channel
    fn send_message(&self, channel_id: &str, content: &str) -> Result<SentMessage, SessionError>;

    /// Replace the content of a previously sent message
    fn edit_message(
        &self,
        channel_id: &str,
        message_id: &str,
        content: &str,
    ) -> Result<SentMessage, SessionError>;

    /// Resolve a user's effective permission bits in a channel
    fn user_channel_permissions(
        &self,
        user_id: &str,
        channel_id: &str,
    ) -> Result<Permissions, SessionError>;

    /// Identity of the bot account this session is logged in as
    fn bot_info(&self) -> BotInfo;

    /// Last measured gateway heartbeat latency, if the platform reports one
    fn heartbeat_latency(&self) -> Option<Duration> {
        None
    }
}

/// Bot information
#[derive(Debug, Clone)]
pub struct BotInfo {
    pub id: String,
    pub name: String,
    pub username: String,
}
