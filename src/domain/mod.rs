//! Domain layer - Core business objects and abstractions
//!
//! This layer contains:
//! - Entities: Core business objects (User, MessageEvent, Command, Permissions)
//! - Traits: Abstractions for infrastructure (Session, Module)

pub mod entities;
pub mod traits;
