//! Application services - Bot lifecycle and event handling

pub mod bot_context;

pub use bot_context::{BotContext, BotSettings};
