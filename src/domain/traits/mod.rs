//! Domain traits - Abstractions for infrastructure implementations

pub mod module;
pub mod session;

pub use module::Module;
pub use session::{BotInfo, Session};
