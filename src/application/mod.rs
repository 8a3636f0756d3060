//! Application layer - Use cases and business logic
//!
//! This layer contains:
//! - Services: Bot lifecycle and event handling
//! - Errors: Domain-specific errors
//! - Messaging: Argument parsing, middleware, dispatching

pub mod errors;
pub mod services;
pub mod messaging;
