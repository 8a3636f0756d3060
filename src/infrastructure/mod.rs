//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Adapters: Platform sessions (console)

pub mod config;
pub mod adapters;
