//! Statistics module - counts traffic seen by the bot

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::application::errors::ModuleError;
use crate::application::services::BotContext;
use crate::domain::entities::MessageEvent;
use crate::domain::traits::Module;

#[derive(Debug, Default)]
struct Counters {
    messages: u64,
    commands: u64,
}

/// Point-in-time view of the counters
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub start_time: DateTime<Utc>,
    pub uptime_secs: i64,
    pub messages: u64,
    pub commands: u64,
}

pub struct StatsModule {
    started_at: DateTime<Utc>,
    counters: Mutex<Counters>,
}

impl StatsModule {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            counters: Mutex::new(Counters::default()),
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let (messages, commands) = {
            let c = self.counters();
            (c.messages, c.commands)
        };
        StatsSnapshot {
            start_time: self.started_at,
            uptime_secs: (Utc::now() - self.started_at).num_seconds(),
            messages,
            commands,
        }
    }

    fn counters(&self) -> MutexGuard<'_, Counters> {
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for StatsModule {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for StatsModule {
    fn name(&self) -> &str {
        "Statistics"
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn initialize(&self, bot: &BotContext) -> Result<(), ModuleError> {
        tracing::info!(
            "Statistics module initialized ({} commands registered)",
            bot.registry().len()
        );
        Ok(())
    }

    fn shutdown(&self) -> Result<(), ModuleError> {
        let snapshot = self.snapshot();
        tracing::info!(
            messages = snapshot.messages,
            commands = snapshot.commands,
            "Statistics module shutdown"
        );
        Ok(())
    }

    fn on_message(&self, _event: &MessageEvent) {
        self.counters().messages += 1;
    }

    fn on_command(&self, _name: &str, _event: &MessageEvent) {
        self.counters().commands += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::User;
    use std::sync::Arc;

    #[test]
    fn test_counts_messages_and_commands() {
        let stats = StatsModule::new();
        let event = MessageEvent::new("c", User::new("u"), "!ping");

        stats.on_message(&event);
        stats.on_message(&event);
        stats.on_command("ping", &event);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.messages, 2);
        assert_eq!(snapshot.commands, 1);
        assert!(snapshot.uptime_secs >= 0);
    }

    #[test]
    fn test_concurrent_updates_are_not_lost() {
        let stats = Arc::new(StatsModule::new());
        let event = MessageEvent::new("c", User::new("u"), "hi");

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..100 {
                        stats.on_message(&event);
                    }
                });
            }
        });

        assert_eq!(stats.snapshot().messages, 800);
    }

    #[test]
    fn test_counts_continue_after_poisoned_lock() {
        let stats = Arc::new(StatsModule::new());
        let event = MessageEvent::new("c", User::new("u"), "!ping");
        stats.on_message(&event);

        let poisoner = stats.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.counters.lock().unwrap();
            panic!("poison the counters lock");
        })
        .join();
        assert!(stats.counters.is_poisoned());

        stats.on_message(&event);
        stats.on_command("ping", &event);
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.messages, 2);
        assert_eq!(snapshot.commands, 1);
    }

    #[test]
    fn test_snapshot_serializes() {
        let json = serde_json::to_value(StatsModule::new().snapshot()).unwrap();
        assert_eq!(json["messages"], 0);
        assert!(json["start_time"].is_string());
    }
}
