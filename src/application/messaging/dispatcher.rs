//! Message dispatcher - Routes command messages through middleware to handlers

use std::cell::Cell;
use std::sync::Arc;

use super::middleware::{Context, Endpoint, Middleware, MiddlewareChain};
use super::parser::MessageParser;
use crate::application::services::BotContext;
use crate::domain::entities::{CommandContext, MessageEvent};
use crate::domain::traits::Session;

/// Notice sent when a command handler fails; the error itself stays in the logs
pub const GENERIC_ERROR_NOTICE: &str = "❌ An error occurred while executing the command.";

/// What happened to one inbound event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Not a command for us: bot author, no prefix, empty or unknown command
    Ignored,
    /// The handler ran and succeeded
    Executed,
    /// The handler ran and returned an error
    Failed,
    /// A middleware step declined to continue
    Halted,
    /// A middleware step failed before the handler ran
    Aborted,
}

/// Message dispatcher - parses commands and drives the middleware chain
pub struct MessageDispatcher {
    parser: MessageParser,
    chain: MiddlewareChain,
}

impl MessageDispatcher {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            parser: MessageParser::new(prefix),
            chain: MiddlewareChain::new(),
        }
    }

    /// Add middleware to the chain
    pub fn with_middleware<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.chain.push(Arc::new(middleware));
        self
    }

    pub fn add_middleware(&mut self, middleware: Arc<dyn Middleware>) {
        self.chain.push(middleware);
    }

    pub fn middleware(&self) -> &MiddlewareChain {
        &self.chain
    }

    pub fn parser(&self) -> &MessageParser {
        &self.parser
    }

    pub fn prefix(&self) -> &str {
        self.parser.prefix()
    }

    /// Route one inbound event. Runs synchronously to completion.
    pub fn dispatch(
        &self,
        bot: &BotContext,
        session: &dyn Session,
        event: &MessageEvent,
    ) -> DispatchOutcome {
        // Never react to bots, ourselves included
        if event.author.is_bot || event.author.id == session.bot_info().id {
            return DispatchOutcome::Ignored;
        }

        let Some(invocation) = self.parser.parse(&event.content) else {
            return DispatchOutcome::Ignored;
        };

        let Some(command) = bot.registry().get(&invocation.name) else {
            tracing::debug!("Unknown command: {}", invocation.name);
            return DispatchOutcome::Ignored;
        };

        let ctx = Context {
            event,
            session,
            command: command.as_ref(),
            args: &invocation.args,
        };

        let succeeded: Cell<Option<bool>> = Cell::new(None);
        let endpoint: &Endpoint<'_> = &|ctx| {
            let cmd_ctx = CommandContext {
                event: ctx.event,
                session: ctx.session,
                bot,
            };
            match ctx.command.execute(&cmd_ctx, ctx.args) {
                Ok(()) => succeeded.set(Some(true)),
                Err(e) => {
                    tracing::error!("Error executing command {}: {}", ctx.command.name(), e);
                    ctx.notify(GENERIC_ERROR_NOTICE);
                    succeeded.set(Some(false));
                }
            }
        };

        let result = self.chain.run(&ctx, endpoint);
        if let Err(e) = &result {
            tracing::error!("Middleware error: {}", e);
        }

        match (succeeded.get(), result) {
            (Some(true), _) => DispatchOutcome::Executed,
            (Some(false), _) => DispatchOutcome::Failed,
            (None, Ok(())) => DispatchOutcome::Halted,
            (None, Err(_)) => DispatchOutcome::Aborted,
        }
    }
}
