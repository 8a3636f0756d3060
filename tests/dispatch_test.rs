//! Dispatch integration tests
//! Run with: cargo test --test dispatch_test

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex, Once};
use std::time::Duration;

use forge_bot::application::messaging::{
    CooldownMiddleware, LoggingMiddleware, OwnerOnlyMiddleware, PermissionMiddleware,
};
use forge_bot::{
    BotContext, BotInfo, BotSettings, DispatchOutcome, FnCommand, MessageEvent, Permissions,
    SentMessage, Session, SessionError, User,
};

static INIT: Once = Once::new();

fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

#[derive(Default)]
struct FakeSession {
    sent: Mutex<Vec<(String, String)>>,
    permissions: HashMap<String, Permissions>,
}

impl FakeSession {
    fn grant(mut self, user: &str, permissions: Permissions) -> Self {
        self.permissions.insert(user.to_string(), permissions);
        self
    }

    fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(_, c)| c.clone()).collect()
    }
}

impl Session for FakeSession {
    fn send_message(&self, channel_id: &str, content: &str) -> Result<SentMessage, SessionError> {
        self.sent
            .lock()
            .unwrap()
            .push((channel_id.to_string(), content.to_string()));
        Ok(SentMessage {
            id: "1".to_string(),
            channel_id: channel_id.to_string(),
        })
    }

    fn edit_message(&self, channel_id: &str, message_id: &str, _content: &str) -> Result<SentMessage, SessionError> {
        Ok(SentMessage {
            id: message_id.to_string(),
            channel_id: channel_id.to_string(),
        })
    }

    fn user_channel_permissions(&self, user_id: &str, _channel_id: &str) -> Result<Permissions, SessionError> {
        Ok(self.permissions.get(user_id).copied().unwrap_or_default())
    }

    fn bot_info(&self) -> BotInfo {
        BotInfo {
            id: "self".to_string(),
            name: "forge-bot".to_string(),
            username: "forge_bot".to_string(),
        }
    }
}

fn settings() -> BotSettings {
    BotSettings {
        owner_id: Some("owner".to_string()),
        ..BotSettings::default()
    }
}

fn counting_command(name: &str, counter: &Arc<AtomicUsize>) -> FnCommand {
    let counter = Arc::clone(counter);
    FnCommand::new(name).with_handler(move |ctx, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        ctx.reply("done")?;
        Ok(())
    })
}

fn message(user: &str, text: &str) -> MessageEvent {
    MessageEvent::new("general", User::new(user), text)
}

/// Two calls inside the window: one execution, one wait notice.
/// A call after the window executes again.
#[test]
fn test_cooldown_window() {
    ensure_init();
    let counter = Arc::new(AtomicUsize::new(0));
    let mut bot = BotContext::new(settings());
    bot.register_command(counting_command("roll", &counter));
    bot.add_middleware(CooldownMiddleware::new(Duration::from_millis(200)));
    bot.add_middleware(LoggingMiddleware);
    let session = FakeSession::default();

    assert_eq!(bot.handle_message(&session, &message("u1", "!roll")), DispatchOutcome::Executed);
    assert_eq!(bot.handle_message(&session, &message("u1", "!roll")), DispatchOutcome::Halted);
    assert_eq!(counter.load(Ordering::SeqCst), 1);

    let notices: Vec<String> = session
        .sent()
        .into_iter()
        .filter(|m| m.starts_with("⏰"))
        .collect();
    assert_eq!(notices.len(), 1);

    std::thread::sleep(Duration::from_millis(250));
    assert_eq!(bot.handle_message(&session, &message("u1", "!roll")), DispatchOutcome::Executed);
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

/// N threads racing the same user/channel inside the window produce exactly
/// one execution.
#[test]
fn test_concurrent_cooldown_executes_once() {
    ensure_init();
    const THREADS: usize = 16;

    let counter = Arc::new(AtomicUsize::new(0));
    let mut bot = BotContext::new(settings());
    bot.register_command(counting_command("roll", &counter));
    bot.add_middleware(CooldownMiddleware::new(Duration::from_secs(60)));
    let bot = Arc::new(bot);
    let session = Arc::new(FakeSession::default());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let bot = Arc::clone(&bot);
            let session = Arc::clone(&session);
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                barrier.wait();
                bot.handle_message(session.as_ref(), &message("same-user", "!roll"))
            })
        })
        .collect();

    let outcomes: Vec<DispatchOutcome> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert_eq!(outcomes.iter().filter(|o| **o == DispatchOutcome::Executed).count(), 1);
    assert_eq!(outcomes.iter().filter(|o| **o == DispatchOutcome::Halted).count(), THREADS - 1);
}

#[test]
fn test_permission_gate() {
    ensure_init();
    let counter = Arc::new(AtomicUsize::new(0));
    let mut bot = BotContext::new(settings());
    bot.register_command(counting_command("ban", &counter).with_permission("BAN_MEMBERS"));
    bot.add_middleware(PermissionMiddleware::new(["KICK_MEMBERS"]));
    let session = FakeSession::default()
        .grant("mod", Permissions::BAN_MEMBERS | Permissions::KICK_MEMBERS)
        .grant("helper", Permissions::KICK_MEMBERS);

    assert_eq!(bot.handle_message(&session, &message("helper", "!ban x")), DispatchOutcome::Halted);
    assert_eq!(bot.handle_message(&session, &message("nobody", "!ban x")), DispatchOutcome::Halted);
    assert_eq!(counter.load(Ordering::SeqCst), 0);

    assert_eq!(bot.handle_message(&session, &message("mod", "!ban x")), DispatchOutcome::Executed);
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn test_owner_only_then_cooldown() {
    ensure_init();
    let counter = Arc::new(AtomicUsize::new(0));
    let mut bot = BotContext::new(settings());
    bot.register_command(counting_command("restart", &counter));
    let owner = bot.settings().owner_id.clone().unwrap_or_default();
    bot.add_middleware(OwnerOnlyMiddleware::new(owner));
    bot.add_middleware(CooldownMiddleware::new(Duration::from_secs(60)));
    let session = FakeSession::default();

    // Rejected before reaching the cooldown, so the owner's window is untouched
    assert_eq!(bot.handle_message(&session, &message("guest", "!restart")), DispatchOutcome::Halted);
    assert_eq!(bot.handle_message(&session, &message("owner", "!restart")), DispatchOutcome::Executed);
    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert_eq!(
        session.sent(),
        vec!["❌ This command is restricted to the bot owner.".to_string(), "done".to_string()]
    );
}

#[test]
fn test_self_messages_never_dispatch() {
    ensure_init();
    let counter = Arc::new(AtomicUsize::new(0));
    let mut bot = BotContext::new(settings());
    bot.register_command(counting_command("roll", &counter));
    let session = FakeSession::default();

    for text in ["!roll", "!roll twice", "!roll \"quoted arg\""] {
        let own = MessageEvent::new("general", User::new("self"), text);
        assert_eq!(bot.handle_message(&session, &own), DispatchOutcome::Ignored);
    }
    assert_eq!(counter.load(Ordering::SeqCst), 0);
    assert!(session.sent().is_empty());
}

#[test]
fn test_prefix_is_configurable() {
    ensure_init();
    let counter = Arc::new(AtomicUsize::new(0));
    let mut bot = BotContext::new(BotSettings {
        prefix: ">>".to_string(),
        ..settings()
    });
    bot.register_command(counting_command("roll", &counter));
    let session = FakeSession::default();

    assert_eq!(bot.handle_message(&session, &message("u", "!roll")), DispatchOutcome::Ignored);
    assert_eq!(bot.handle_message(&session, &message("u", ">roll")), DispatchOutcome::Ignored);
    assert_eq!(bot.handle_message(&session, &message("u", ">>roll")), DispatchOutcome::Executed);
}
