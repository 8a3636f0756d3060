//! Domain entities - Core business objects

pub mod user;
pub mod message;
pub mod permission;
pub mod command;

pub use user::User;
pub use message::{MessageEvent, SentMessage};
pub use permission::Permissions;
pub use command::{Command, CommandContext, CommandFn, CommandRegistry, FnCommand, DEFAULT_CATEGORY};
