//! Built-in command set

pub mod basic;

pub use basic::{HelpCommand, InfoCommand, PingCommand, StatsCommand};
