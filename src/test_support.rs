//! Session double shared by unit tests

use std::collections::HashMap;
use std::sync::Mutex;

use crate::application::errors::SessionError;
use crate::domain::entities::{Permissions, SentMessage};
use crate::domain::traits::{BotInfo, Session};

pub const BOT_ID: &str = "bot-self";

/// Records outbound traffic and answers permission lookups from a table
#[derive(Default)]
pub struct RecordingSession {
    sent: Mutex<Vec<(String, String)>>,
    edits: Mutex<Vec<(String, String, String)>>,
    permissions: HashMap<String, Permissions>,
    permission_error: Option<SessionError>,
    fail_sends: bool,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_permissions(mut self, user_id: &str, permissions: Permissions) -> Self {
        self.permissions.insert(user_id.to_string(), permissions);
        self
    }

    pub fn failing_permissions(mut self, error: SessionError) -> Self {
        self.permission_error = Some(error);
        self
    }

    pub fn failing_sends(mut self) -> Self {
        self.fail_sends = true;
        self
    }

    /// (channel, content) pairs in send order
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// (channel, message id, content) triples in edit order
    pub fn edits(&self) -> Vec<(String, String, String)> {
        self.edits.lock().unwrap().clone()
    }
}

impl Session for RecordingSession {
    fn send_message(&self, channel_id: &str, content: &str) -> Result<SentMessage, SessionError> {
        if self.fail_sends {
            return Err(SessionError::Transport("send disabled".to_string()));
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push((channel_id.to_string(), content.to_string()));
        Ok(SentMessage {
            id: format!("m{}", sent.len()),
            channel_id: channel_id.to_string(),
        })
    }

    fn edit_message(
        &self,
        channel_id: &str,
        message_id: &str,
        content: &str,
    ) -> Result<SentMessage, SessionError> {
        self.edits.lock().unwrap().push((
            channel_id.to_string(),
            message_id.to_string(),
            content.to_string(),
        ));
        Ok(SentMessage {
            id: message_id.to_string(),
            channel_id: channel_id.to_string(),
        })
    }

    fn user_channel_permissions(
        &self,
        user_id: &str,
        _channel_id: &str,
    ) -> Result<Permissions, SessionError> {
        if let Some(err) = &self.permission_error {
            return Err(err.clone());
        }
        Ok(self.permissions.get(user_id).copied().unwrap_or_default())
    }

    fn bot_info(&self) -> BotInfo {
        BotInfo {
            id: BOT_ID.to_string(),
            name: "forge-bot".to_string(),
            username: "forge_bot".to_string(),
        }
    }
}
