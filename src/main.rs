use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

use forge_bot::application::messaging::{
    CooldownMiddleware, LoggingMiddleware, OwnerOnlyMiddleware, PermissionMiddleware,
};
use forge_bot::commands::{HelpCommand, InfoCommand, PingCommand, StatsCommand};
use forge_bot::infrastructure::adapters::console::{self, ConsoleSession};
use forge_bot::infrastructure::config::Config;
use forge_bot::modules::StatsModule;
use forge_bot::{BotContext, BotError};

#[derive(Parser)]
#[command(name = "forge-bot")]
#[command(about = "A modular command bot scaffold", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Bot token (overrides config and environment)
    #[arg(short, long)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot on the console session
    Run,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    // Initialize logging
    let log = init_logging(std::env::var("DEBUG").as_deref() == Ok("true"));

    if !dotenv_loaded {
        tracing::debug!("No .env file found, using system environment variables");
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            if let Err(e) = run_bot(&cli.config, cli.token, &log) {
                tracing::error!("Error running forge-bot: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Version => {
            println!("forge-bot v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => {
            if let Err(e) = init_config(&cli.config) {
                tracing::error!("Failed to write config: {}", e);
                std::process::exit(1);
            }
        }
    }
}

type LogHandle = reload::Handle<EnvFilter, Registry>;

fn init_logging(debug: bool) -> LogHandle {
    let rust_log = std::env::var("RUST_LOG").ok();
    let (filter, handle) = reload::Layer::new(log_filter(rust_log.as_deref(), debug));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
    handle
}

/// `RUST_LOG` wins when it parses; otherwise `debug` picks the default level
fn log_filter(rust_log: Option<&str>, debug: bool) -> EnvFilter {
    let default = if debug { "debug" } else { "info" };
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default))
}

fn load_config(config_path: &str, token_override: Option<String>) -> Result<Config, BotError> {
    let mut config = if std::path::Path::new(config_path).exists() {
        let mut config = Config::load(config_path)?;
        config.apply_env();
        config
    } else {
        tracing::info!("No config file at {}, using defaults and environment", config_path);
        Config::load_env()
    };

    if let Some(token) = token_override {
        config.bot.token = Some(token);
    }

    config.validate()?;
    Ok(config)
}

fn build_bot(config: &Config) -> Result<BotContext, BotError> {
    let mut bot = BotContext::new(config.settings());

    let stats = Arc::new(StatsModule::new());

    bot.register_command(PingCommand);
    bot.register_command(HelpCommand);
    bot.register_command(InfoCommand);
    bot.register_command(StatsCommand::new(Arc::clone(&stats)));

    bot.register_module_arc(stats);

    // Installed even at zero: commands may declare their own cooldown
    bot.add_middleware(CooldownMiddleware::new(config.cooldown()?));
    if config.middleware.owner_only {
        if let Some(owner) = config.owner_id() {
            bot.add_middleware(OwnerOnlyMiddleware::new(owner));
        }
    }
    bot.add_middleware(PermissionMiddleware::new(
        config.middleware.required_permissions.iter().cloned(),
    ));
    if config.middleware.logging {
        bot.add_middleware(LoggingMiddleware);
    }

    Ok(bot)
}

fn run_bot(config_path: &str, token_override: Option<String>, log: &LogHandle) -> Result<(), BotError> {
    let config = load_config(config_path, token_override)?;
    if config.bot.debug {
        let rust_log = std::env::var("RUST_LOG").ok();
        if let Err(e) = log.reload(log_filter(rust_log.as_deref(), true)) {
            tracing::warn!("Failed to raise log level: {}", e);
        }
    }
    tracing::info!("Starting forge-bot: {}", config.bot.name);

    let bot = Arc::new(build_bot(&config)?);
    let session = Arc::new(ConsoleSession::new(&config));

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| BotError::Internal(format!("Failed to start runtime: {}", e)))?;
    let result = rt.block_on(console::run(bot, session));
    rt.shutdown_timeout(Duration::from_secs(1));
    result
}

fn init_config(path: &str) -> Result<(), BotError> {
    if std::path::Path::new(path).exists() {
        return Err(BotError::Internal(format!("{} already exists", path)));
    }

    let yaml = Config::default().to_yaml()?;
    std::fs::write(path, yaml)
        .map_err(|e| BotError::Internal(format!("Failed to write {}: {}", path, e)))?;
    println!("Wrote default config to {}", path);
    Ok(())
}
