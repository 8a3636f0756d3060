//! Built-in commands

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Instant;

use crate::application::errors::CommandError;
use crate::domain::entities::{Command, CommandContext, DEFAULT_CATEGORY};
use crate::modules::StatsModule;

/// Replies, then edits the reply with the measured latency
pub struct PingCommand;

impl Command for PingCommand {
    fn name(&self) -> &str {
        "ping"
    }

    fn description(&self) -> &str {
        "Pong! Check bot latency"
    }

    fn usage(&self) -> &str {
        "ping"
    }

    fn execute(&self, ctx: &CommandContext<'_>, _args: &[String]) -> Result<(), CommandError> {
        let started = Instant::now();
        let message = ctx.reply("🏓 Pong!")?;

        let latency = ctx
            .session
            .heartbeat_latency()
            .unwrap_or_else(|| started.elapsed());
        ctx.session.edit_message(
            &message.channel_id,
            &message.id,
            &format!("🏓 Pong! Latency: {:?}", latency),
        )?;
        Ok(())
    }

    fn category(&self) -> &str {
        DEFAULT_CATEGORY
    }
}

/// Lists commands by category, or details one command
pub struct HelpCommand;

impl HelpCommand {
    fn describe(ctx: &CommandContext<'_>, cmd: &dyn Command) -> String {
        let category = match cmd.category() {
            "" => DEFAULT_CATEGORY,
            other => other,
        };
        let mut text = format!("**Command: {}**\n{}\n", cmd.name(), cmd.description());
        let _ = writeln!(text, "Usage: `{}{}`", ctx.bot.prefix(), cmd.usage());
        let _ = writeln!(text, "Category: {}", category);
        let _ = write!(text, "Cooldown: {} seconds", cmd.cooldown().as_secs());
        if !cmd.permissions().is_empty() {
            let _ = write!(text, "\nPermissions: {}", cmd.permissions().join(", "));
        }
        text
    }

    fn overview(ctx: &CommandContext<'_>) -> String {
        let settings = ctx.bot.settings();
        let mut text = format!(
            "🔥 {} Commands\nUse `{}help <command>` for detailed information\n",
            settings.name,
            ctx.bot.prefix()
        );
        for (category, commands) in ctx.bot.command_categories() {
            let _ = write!(text, "\n__{}__\n", category);
            for cmd in commands {
                let _ = writeln!(text, "**{}** - {}", cmd.name(), cmd.description());
            }
        }
        let _ = write!(text, "\n{} v{}", settings.name, settings.version);
        text
    }
}

impl Command for HelpCommand {
    fn name(&self) -> &str {
        "help"
    }

    fn description(&self) -> &str {
        "Show available commands"
    }

    fn usage(&self) -> &str {
        "help [command]"
    }

    fn execute(&self, ctx: &CommandContext<'_>, args: &[String]) -> Result<(), CommandError> {
        let text = match args.first() {
            Some(name) => match ctx.bot.registry().get(name) {
                Some(cmd) => Self::describe(ctx, cmd.as_ref()),
                None => "❌ Command not found.".to_string(),
            },
            None => Self::overview(ctx),
        };
        ctx.reply(&text)?;
        Ok(())
    }

    fn category(&self) -> &str {
        DEFAULT_CATEGORY
    }
}

/// Summarises the running bot
pub struct InfoCommand;

impl Command for InfoCommand {
    fn name(&self) -> &str {
        "info"
    }

    fn description(&self) -> &str {
        "Show bot information"
    }

    fn usage(&self) -> &str {
        "info"
    }

    fn execute(&self, ctx: &CommandContext<'_>, _args: &[String]) -> Result<(), CommandError> {
        let bot = ctx.bot;
        let settings = bot.settings();
        let text = format!(
            "🔥 {name}\n\
             Version: {version}\n\
             Commands: {commands}\n\
             Modules: {modules}\n\
             Middleware: {middleware} ({chain})\n\
             Prefix: {prefix}\n\
             Debug Mode: {debug}",
            name = settings.name,
            version = settings.version,
            commands = bot.registry().len(),
            modules = bot.modules().len(),
            middleware = bot.middleware().len(),
            chain = bot.middleware().names().join(" → "),
            prefix = bot.prefix(),
            debug = settings.debug,
        );
        ctx.reply(&text)?;
        Ok(())
    }

    fn category(&self) -> &str {
        DEFAULT_CATEGORY
    }
}

/// Reports counters from the statistics module as JSON
pub struct StatsCommand {
    stats: Arc<StatsModule>,
}

impl StatsCommand {
    pub fn new(stats: Arc<StatsModule>) -> Self {
        Self { stats }
    }
}

impl Command for StatsCommand {
    fn name(&self) -> &str {
        "stats"
    }

    fn description(&self) -> &str {
        "Show message and command counters"
    }

    fn usage(&self) -> &str {
        "stats"
    }

    fn execute(&self, ctx: &CommandContext<'_>, _args: &[String]) -> Result<(), CommandError> {
        let json = serde_json::to_string_pretty(&self.stats.snapshot())
            .map_err(|e| CommandError::ExecutionFailed(e.to_string()))?;
        ctx.reply(&format!("📊 Statistics\n```json\n{}\n```", json))?;
        Ok(())
    }

    fn category(&self) -> &str {
        "Utility"
    }
}
