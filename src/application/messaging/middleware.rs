//! Middleware system for command processing pipeline
//!
//! Each step receives the invocation context and a [`Next`] continuation.
//! Calling `next.run(ctx)` proceeds; returning without calling it halts the
//! chain; returning an error aborts it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::application::errors::MiddlewareError;
use crate::domain::entities::{Command, MessageEvent};
use crate::domain::traits::Session;

/// Context passed through middleware chain
pub struct Context<'a> {
    pub event: &'a MessageEvent,
    pub session: &'a dyn Session,
    pub command: &'a dyn Command,
    pub args: &'a [String],
}

impl Context<'_> {
    /// Send a user-facing notice to the originating channel. Delivery
    /// failures are logged and otherwise ignored.
    pub fn notify(&self, content: &str) {
        if let Err(e) = self.session.send_message(&self.event.channel_id, content) {
            tracing::warn!(
                channel = %self.event.channel_id,
                "Failed to send notice: {}",
                e
            );
        }
    }
}

/// Middleware trait - steps that may veto progression to the command
pub trait Middleware: Send + Sync {
    fn name(&self) -> &str;

    fn process(&self, ctx: &Context<'_>, next: Next<'_>) -> MiddlewareResult;
}

/// Result of middleware processing
pub type MiddlewareResult = Result<(), MiddlewareError>;

/// Terminal action run once every step has passed
pub type Endpoint<'a> = dyn Fn(&Context<'_>) + 'a;

/// Continuation over the remaining steps
pub struct Next<'a> {
    remaining: &'a [Arc<dyn Middleware>],
    endpoint: &'a Endpoint<'a>,
}

impl<'a> Next<'a> {
    pub fn new(remaining: &'a [Arc<dyn Middleware>], endpoint: &'a Endpoint<'a>) -> Self {
        Self { remaining, endpoint }
    }

    /// Process remaining middleware, then the endpoint
    pub fn run(self, ctx: &Context<'_>) -> MiddlewareResult {
        match self.remaining.split_first() {
            Some((step, rest)) => step.process(ctx, Next::new(rest, self.endpoint)),
            None => {
                (self.endpoint)(ctx);
                Ok(())
            }
        }
    }
}

/// Ordered middleware list
#[derive(Default, Clone)]
pub struct MiddlewareChain {
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.push(Arc::new(middleware));
        self
    }

    pub fn push(&mut self, middleware: Arc<dyn Middleware>) {
        self.middlewares.push(middleware);
    }

    /// Run every step in registration order, then `endpoint`
    pub fn run(&self, ctx: &Context<'_>, endpoint: &Endpoint<'_>) -> MiddlewareResult {
        Next::new(&self.middlewares, endpoint).run(ctx)
    }

    pub fn names(&self) -> Vec<&str> {
        self.middlewares.iter().map(|m| m.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CooldownKey {
    user_id: String,
    channel_id: String,
}

/// Per-user, per-channel cooldown between commands.
///
/// Entries are never evicted: every user/channel pair that has issued a
/// command keeps one timestamp for the life of the process.
pub struct CooldownMiddleware {
    last_used: Mutex<HashMap<CooldownKey, Instant>>,
    duration: Duration,
}

impl CooldownMiddleware {
    pub fn new(duration: Duration) -> Self {
        Self {
            last_used: Mutex::new(HashMap::new()),
            duration,
        }
    }

    /// Record an invocation now, or return the remaining wait.
    /// The check and the update happen under one lock.
    fn check_and_set(&self, key: CooldownKey, duration: Duration) -> Option<Duration> {
        let mut last_used = self.timestamps();

        let now = Instant::now();
        if let Some(last) = last_used.get(&key) {
            let elapsed = now.duration_since(*last);
            if elapsed < duration {
                return Some(duration - elapsed);
            }
        }

        last_used.insert(key, now);
        None
    }

    /// Number of tracked user/channel pairs
    pub fn tracked(&self) -> usize {
        self.timestamps().len()
    }

    // A panic elsewhere cannot leave a timestamp half-written
    fn timestamps(&self) -> MutexGuard<'_, HashMap<CooldownKey, Instant>> {
        self.last_used.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Middleware for CooldownMiddleware {
    fn name(&self) -> &str {
        "Cooldown"
    }

    fn process(&self, ctx: &Context<'_>, next: Next<'_>) -> MiddlewareResult {
        let key = CooldownKey {
            user_id: ctx.event.author.id.clone(),
            channel_id: ctx.event.channel_id.clone(),
        };
        let duration = self.duration.max(ctx.command.cooldown());

        if let Some(remaining) = self.check_and_set(key, duration) {
            tracing::debug!(
                user = %ctx.event.author.id,
                channel = %ctx.event.channel_id,
                "Cooldown active, {:?} remaining",
                remaining
            );
            ctx.notify(&format!(
                "⏰ Please wait {:.1} seconds before using another command.",
                remaining.as_secs_f64()
            ));
            return Ok(());
        }

        next.run(ctx)
    }
}

/// Requires the invoking user to hold permission tags in the channel.
///
/// The tags checked are the ones configured here plus the ones the
/// command itself declares.
pub struct PermissionMiddleware {
    required: Vec<String>,
}

impl PermissionMiddleware {
    pub fn new<S: Into<String>>(permissions: impl IntoIterator<Item = S>) -> Self {
        Self {
            required: permissions.into_iter().map(Into::into).collect(),
        }
    }
}

impl Middleware for PermissionMiddleware {
    fn name(&self) -> &str {
        "Permission"
    }

    fn process(&self, ctx: &Context<'_>, next: Next<'_>) -> MiddlewareResult {
        let granted = ctx
            .session
            .user_channel_permissions(&ctx.event.author.id, &ctx.event.channel_id)
            .map_err(MiddlewareError::PermissionLookup)?;

        let missing = self
            .required
            .iter()
            .map(String::as_str)
            .find(|perm| !granted.has_tag(perm))
            .or_else(|| {
                ctx.command
                    .permissions()
                    .iter()
                    .copied()
                    .find(|perm| !granted.has_tag(perm))
            });

        if let Some(perm) = missing {
            tracing::debug!(
                user = %ctx.event.author.id,
                command = %ctx.command.name(),
                "Missing permission {}",
                perm
            );
            ctx.notify("❌ You don't have permission to use this command.");
            return Ok(());
        }

        next.run(ctx)
    }
}

/// Restricts commands to the bot owner
pub struct OwnerOnlyMiddleware {
    owner_id: String,
}

impl OwnerOnlyMiddleware {
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
        }
    }
}

impl Middleware for OwnerOnlyMiddleware {
    fn name(&self) -> &str {
        "OwnerOnly"
    }

    fn process(&self, ctx: &Context<'_>, next: Next<'_>) -> MiddlewareResult {
        if ctx.event.author.id != self.owner_id {
            ctx.notify("❌ This command is restricted to the bot owner.");
            return Ok(());
        }

        next.run(ctx)
    }
}

/// Logs every command that reaches this step
pub struct LoggingMiddleware;

impl Middleware for LoggingMiddleware {
    fn name(&self) -> &str {
        "Logging"
    }

    fn process(&self, ctx: &Context<'_>, next: Next<'_>) -> MiddlewareResult {
        tracing::info!(
            user = %ctx.event.author,
            user_id = %ctx.event.author.id,
            channel = %ctx.event.channel_id,
            "Command executed: {}",
            ctx.event.content
        );

        let result = next.run(ctx);
        if let Err(e) = &result {
            tracing::warn!("[{}] Error: {}", ctx.event.channel_id, e);
        }
        result
    }
}
