//! Console adapter for development/testing

use std::future::Future;
use std::io::BufRead;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::application::errors::{BotError, SessionError};
use crate::application::services::BotContext;
use crate::domain::entities::{MessageEvent, Permissions, SentMessage, User};
use crate::domain::traits::{BotInfo, Session};
use crate::infrastructure::config::Config;

const INPUT_BUFFER: usize = 32;

/// Console session: stdin lines become messages from one local user,
/// bot output goes to stdout.
pub struct ConsoleSession {
    token: String,
    info: BotInfo,
    user: User,
    channel_id: String,
    permissions: Permissions,
}

impl ConsoleSession {
    pub fn new(config: &Config) -> Self {
        Self {
            token: config.bot.token.clone().unwrap_or_default(),
            info: BotInfo {
                id: "console-bot".to_string(),
                name: config.bot.name.clone(),
                username: "console".to_string(),
            },
            user: User::new(config.console.user_id.clone())
                .with_username(config.console.username.clone()),
            channel_id: config.console.channel_id.clone(),
            permissions: Permissions::from_tags(config.console.permissions.iter().map(String::as_str)),
        }
    }

    /// Wrap a line of input as a message from the console user
    pub fn event(&self, line: impl Into<String>) -> MessageEvent {
        MessageEvent::new(self.channel_id.clone(), self.user.clone(), line)
    }
}

impl Session for ConsoleSession {
    fn open(&self) -> Result<(), SessionError> {
        if self.token.trim().is_empty() {
            return Err(SessionError::Auth("empty token".to_string()));
        }
        tracing::info!("Console session opened as {}", self.info.username);
        Ok(())
    }

    fn close(&self) -> Result<(), SessionError> {
        tracing::info!("Console session closed");
        Ok(())
    }

    fn send_message(&self, channel_id: &str, content: &str) -> Result<SentMessage, SessionError> {
        println!("[BOT #{}] {}", channel_id, content);
        Ok(SentMessage {
            id: uuid::Uuid::new_v4().to_string(),
            channel_id: channel_id.to_string(),
        })
    }

    fn edit_message(
        &self,
        channel_id: &str,
        message_id: &str,
        content: &str,
    ) -> Result<SentMessage, SessionError> {
        let short_id: String = message_id.chars().take(8).collect();
        println!("[BOT #{} edited {}] {}", channel_id, short_id, content);
        Ok(SentMessage {
            id: message_id.to_string(),
            channel_id: channel_id.to_string(),
        })
    }

    fn user_channel_permissions(
        &self,
        user_id: &str,
        channel_id: &str,
    ) -> Result<Permissions, SessionError> {
        if channel_id != self.channel_id {
            return Err(SessionError::ChannelNotFound(channel_id.to_string()));
        }
        if user_id == self.user.id {
            Ok(self.permissions)
        } else {
            Ok(Permissions::NONE)
        }
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}

/// Run the bot against stdin until EOF or Ctrl-C.
///
/// Stdin is read on its own thread so an interrupt never waits for a
/// pending read.
pub async fn run(bot: Arc<BotContext>, session: Arc<ConsoleSession>) -> Result<(), BotError> {
    let (sender, receiver) = mpsc::channel(INPUT_BUFFER);
    spawn_stdin_reader(sender)?;

    let interrupt = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Interrupt received"),
            Err(e) => {
                tracing::warn!("Cannot listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    run_with_input(bot, session, receiver, interrupt).await
}

/// Dispatch lines from `input` until it closes or `shutdown` completes.
///
/// Every line is dispatched on the blocking pool, so lines typed in quick
/// succession are handled concurrently. In-flight dispatches finish before
/// the bot shuts down.
pub async fn run_with_input(
    bot: Arc<BotContext>,
    session: Arc<ConsoleSession>,
    mut input: mpsc::Receiver<String>,
    shutdown: impl Future<Output = ()>,
) -> Result<(), BotError> {
    bot.start(session.as_ref())?;
    println!(
        "Type messages as {} in #{} (prefix '{}'). Ctrl-D or Ctrl-C to exit.",
        session.user, session.channel_id, bot.prefix()
    );

    tokio::pin!(shutdown);
    let mut tasks = JoinSet::new();

    loop {
        tokio::select! {
            line = input.recv() => match line {
                Some(line) => {
                    let event = session.event(line);
                    let bot = Arc::clone(&bot);
                    let session = Arc::clone(&session);
                    tasks.spawn_blocking(move || {
                        let outcome = bot.handle_message(session.as_ref(), &event);
                        tracing::debug!(event = %event.id, "Dispatch outcome: {:?}", outcome);
                    });
                }
                None => break,
            },
            Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                if let Err(e) = joined {
                    tracing::error!("Dispatch task failed: {}", e);
                }
            }
            _ = &mut shutdown => break,
        }
    }

    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            tracing::error!("Dispatch task failed: {}", e);
        }
    }

    bot.shutdown(session.as_ref())
}

fn spawn_stdin_reader(sender: mpsc::Sender<String>) -> Result<(), BotError> {
    std::thread::Builder::new()
        .name("console-stdin".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if sender.blocking_send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::error!("Failed to read stdin: {}", e);
                        break;
                    }
                }
            }
        })
        .map_err(|e| BotError::Internal(format!("Failed to spawn stdin reader: {}", e)))?;
    Ok(())
}
