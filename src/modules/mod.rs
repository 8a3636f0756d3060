//! Bundled modules

pub mod stats;

pub use stats::{StatsModule, StatsSnapshot};
