use crate::application::errors::ModuleError;
use crate::application::services::BotContext;
use crate::domain::entities::MessageEvent;

/// Module trait - lifecycle plug-ins started and stopped with the bot
pub trait Module: Send + Sync {
    fn name(&self) -> &str;

    fn version(&self) -> &str;

    /// Called once after the session opens
    fn initialize(&self, bot: &BotContext) -> Result<(), ModuleError>;

    /// Called once while the bot shuts down
    fn shutdown(&self) -> Result<(), ModuleError>;

    /// Observe every message not authored by a bot
    fn on_message(&self, _event: &MessageEvent) {}

    /// Observe every command that ran to completion
    fn on_command(&self, _name: &str, _event: &MessageEvent) {}
}
