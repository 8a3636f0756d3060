use std::collections::BTreeMap;
use std::sync::Arc;

use crate::application::errors::BotError;
use crate::application::messaging::{DispatchOutcome, MessageDispatcher, Middleware, MiddlewareChain};
use crate::domain::entities::{Command, CommandRegistry, MessageEvent};
use crate::domain::traits::{Module, Session};

/// Runtime settings the bot core needs
#[derive(Debug, Clone)]
pub struct BotSettings {
    pub name: String,
    pub prefix: String,
    pub owner_id: Option<String>,
    pub debug: bool,
    pub version: String,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            name: "forge-bot".to_string(),
            prefix: "!".to_string(),
            owner_id: None,
            debug: false,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Owns the registry, middleware and modules for one bot.
///
/// Built mutably at startup, then shared behind an `Arc` and only read
/// while events are dispatched.
pub struct BotContext {
    settings: BotSettings,
    registry: CommandRegistry,
    dispatcher: MessageDispatcher,
    modules: Vec<Arc<dyn Module>>,
}

impl BotContext {
    pub fn new(settings: BotSettings) -> Self {
        Self {
            dispatcher: MessageDispatcher::new(settings.prefix.clone()),
            settings,
            registry: CommandRegistry::new(),
            modules: Vec::new(),
        }
    }

    pub fn register_command<C: Command + 'static>(&mut self, command: C) {
        self.registry.register(command);
    }

    pub fn register_module<M: Module + 'static>(&mut self, module: M) {
        self.register_module_arc(Arc::new(module));
    }

    pub fn register_module_arc(&mut self, module: Arc<dyn Module>) {
        tracing::info!("Registered module: {}", module.name());
        self.modules.push(module);
    }

    pub fn add_middleware<M: Middleware + 'static>(&mut self, middleware: M) {
        tracing::info!("Added middleware: {}", middleware.name());
        self.dispatcher.add_middleware(Arc::new(middleware));
    }

    pub fn settings(&self) -> &BotSettings {
        &self.settings
    }

    pub fn prefix(&self) -> &str {
        self.dispatcher.prefix()
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn middleware(&self) -> &MiddlewareChain {
        self.dispatcher.middleware()
    }

    pub fn modules(&self) -> &[Arc<dyn Module>] {
        &self.modules
    }

    pub fn command_categories(&self) -> BTreeMap<String, Vec<Arc<dyn Command>>> {
        self.registry.categories()
    }

    /// Open the session, then initialize modules. A module that fails to
    /// initialize is logged and skipped.
    pub fn start(&self, session: &dyn Session) -> Result<(), BotError> {
        tracing::info!("{} v{} starting up...", self.settings.name, self.settings.version);

        session.open()?;

        for module in &self.modules {
            match module.initialize(self) {
                Ok(()) => tracing::info!("Module '{}' v{} initialized", module.name(), module.version()),
                Err(e) => tracing::error!("Error initializing module {}: {}", module.name(), e),
            }
        }

        tracing::info!("{} is now running", self.settings.name);
        Ok(())
    }

    /// Shut every module down, then close the session
    pub fn shutdown(&self, session: &dyn Session) -> Result<(), BotError> {
        tracing::info!("Shutting down {}...", self.settings.name);

        for module in &self.modules {
            match module.shutdown() {
                Ok(()) => tracing::info!("Module '{}' shutdown complete", module.name()),
                Err(e) => tracing::error!("Error shutting down module {}: {}", module.name(), e),
            }
        }

        session.close()?;
        Ok(())
    }

    /// Entry point for every inbound message
    pub fn handle_message(&self, session: &dyn Session, event: &MessageEvent) -> DispatchOutcome {
        if !event.author.is_bot {
            for module in &self.modules {
                module.on_message(event);
            }
        }

        let outcome = self.dispatcher.dispatch(self, session, event);

        if outcome == DispatchOutcome::Executed {
            if let Some(invocation) = self.dispatcher.parser().parse(&event.content) {
                for module in &self.modules {
                    module.on_command(&invocation.name, event);
                }
            }
        }

        outcome
    }
}
