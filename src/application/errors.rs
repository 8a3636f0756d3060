//! Application layer errors

use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Chat-platform session errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Channel not found: {0}")]
    ChannelNotFound(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Command execution errors
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Middleware infrastructure failures; these abort the chain for one event
#[derive(Error, Debug)]
pub enum MiddlewareError {
    #[error("Error getting user permissions: {0}")]
    PermissionLookup(#[source] SessionError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Module lifecycle errors
#[derive(Error, Debug)]
pub enum ModuleError {
    #[error("Initialization failed: {0}")]
    Initialize(String),

    #[error("Shutdown failed: {0}")]
    Shutdown(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
