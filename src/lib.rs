//! forge-bot - a modular command bot scaffold
//!
//! Commands register into a [`CommandRegistry`], inbound messages are
//! parsed against a trigger prefix and run through an ordered middleware
//! chain before the handler executes. The chat platform sits behind the
//! [`Session`] trait.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod commands;
pub mod modules;

#[cfg(test)]
mod test_support;

pub use application::errors::{BotError, CommandError, ConfigError, MiddlewareError, ModuleError, SessionError};
pub use application::messaging::{DispatchOutcome, Middleware, MiddlewareChain, Next};
pub use application::services::{BotContext, BotSettings};
pub use domain::entities::{Command, CommandContext, CommandRegistry, FnCommand, MessageEvent, Permissions, SentMessage, User};
pub use domain::traits::{BotInfo, Module, Session};
