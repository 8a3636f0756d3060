use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::application::errors::CommandError;
use crate::application::services::BotContext;
use crate::domain::entities::{MessageEvent, SentMessage};
use crate::domain::traits::Session;

/// Bucket for commands that declare no category
pub const DEFAULT_CATEGORY: &str = "General";

/// A bot command. Handlers are registered once and never mutated.
pub trait Command: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Usage line without the trigger prefix, e.g. `help [command]`
    fn usage(&self) -> &str;

    fn execute(&self, ctx: &CommandContext<'_>, args: &[String]) -> Result<(), CommandError>;

    /// Permission tags the invoking user must hold
    fn permissions(&self) -> &[&'static str] {
        &[]
    }

    fn cooldown(&self) -> Duration {
        Duration::ZERO
    }

    fn category(&self) -> &str {
        ""
    }
}

/// Everything a command can reach while executing
pub struct CommandContext<'a> {
    pub event: &'a MessageEvent,
    pub session: &'a dyn Session,
    pub bot: &'a BotContext,
}

impl CommandContext<'_> {
    /// Send a message to the channel the command came from
    pub fn reply(&self, content: &str) -> Result<SentMessage, CommandError> {
        Ok(self.session.send_message(&self.event.channel_id, content)?)
    }
}

/// Command handler function type
pub type CommandFn =
    Box<dyn Fn(&CommandContext<'_>, &[String]) -> Result<(), CommandError> + Send + Sync>;

/// Closure-backed command, built up field by field
pub struct FnCommand {
    name: String,
    description: String,
    usage: String,
    category: String,
    permissions: Vec<&'static str>,
    cooldown: Duration,
    handler: Option<CommandFn>,
}

impl FnCommand {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            usage: name.clone(),
            name,
            description: String::new(),
            category: String::new(),
            permissions: Vec::new(),
            cooldown: Duration::ZERO,
            handler: None,
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_permission(mut self, permission: &'static str) -> Self {
        self.permissions.push(permission);
        self
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&CommandContext<'_>, &[String]) -> Result<(), CommandError> + Send + Sync + 'static,
    {
        self.handler = Some(Box::new(handler));
        self
    }
}

impl Command for FnCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn usage(&self) -> &str {
        &self.usage
    }

    fn execute(&self, ctx: &CommandContext<'_>, args: &[String]) -> Result<(), CommandError> {
        match &self.handler {
            Some(handler) => handler(ctx, args),
            None => Err(CommandError::ExecutionFailed(format!(
                "command {} has no handler",
                self.name
            ))),
        }
    }

    fn permissions(&self) -> &[&'static str] {
        &self.permissions
    }

    fn cooldown(&self) -> Duration {
        self.cooldown
    }

    fn category(&self) -> &str {
        &self.category
    }
}

impl fmt::Debug for FnCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCommand")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("permissions", &self.permissions)
            .field("cooldown", &self.cooldown)
            .finish_non_exhaustive()
    }
}

/// Command registry keyed by name. Re-registering a name replaces the
/// earlier handler.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Arc<dyn Command>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<C: Command + 'static>(&mut self, command: C) {
        self.register_arc(Arc::new(command));
    }

    pub fn register_arc(&mut self, command: Arc<dyn Command>) {
        let name = command.name().to_string();
        tracing::info!("Registered command: {}", name);
        self.commands.insert(name, command);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Command>> {
        self.commands.get(name)
    }

    /// Group commands by category label, sorted by category then name.
    /// An empty label lands in [`DEFAULT_CATEGORY`].
    pub fn categories(&self) -> BTreeMap<String, Vec<Arc<dyn Command>>> {
        let mut categories: BTreeMap<String, Vec<Arc<dyn Command>>> = BTreeMap::new();
        for cmd in self.commands.values() {
            let category = match cmd.category() {
                "" => DEFAULT_CATEGORY,
                other => other,
            };
            categories
                .entry(category.to_string())
                .or_default()
                .push(Arc::clone(cmd));
        }
        for commands in categories.values_mut() {
            commands.sort_by(|a, b| a.name().cmp(b.name()));
        }
        categories
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
