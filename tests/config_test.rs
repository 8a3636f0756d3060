//! Config loading integration tests
//! Run with: cargo test --test config_test

use std::path::PathBuf;

use forge_bot::infrastructure::config::Config;
use forge_bot::ConfigError;

struct TempFile(PathBuf);

impl TempFile {
    fn with_content(content: &str) -> Self {
        let path = std::env::temp_dir().join(format!("forge-bot-{}.yaml", uuid::Uuid::new_v4()));
        std::fs::write(&path, content).unwrap();
        Self(path)
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

#[test]
fn test_load_from_file() {
    let file = TempFile::with_content(
        r#"
bot:
  name: guild-helper
  prefix: "!"
  token: from-file
middleware:
  cooldown-seconds: 1
  logging: false
console:
  user-id: "1001"
  channel-id: lobby
"#,
    );

    let config = Config::load(&file.0).unwrap();
    assert_eq!(config.bot.name, "guild-helper");
    assert_eq!(config.bot.token.as_deref(), Some("from-file"));
    assert!(!config.middleware.logging);
    assert_eq!(config.console.user_id, "1001");
    assert_eq!(config.console.permissions, vec!["ADMINISTRATOR".to_string()]);
    assert!(config.validate().is_ok());

    let settings = config.settings();
    assert_eq!(settings.prefix, "!");
    assert_eq!(settings.owner_id, None);
}

#[test]
fn test_missing_file_is_error() {
    let path = std::env::temp_dir().join(format!("forge-bot-missing-{}.yaml", uuid::Uuid::new_v4()));
    assert!(matches!(Config::load(path), Err(ConfigError::Parse(_))));
}

#[test]
fn test_file_without_token_fails_validation() {
    let file = TempFile::with_content("bot:\n  name: x\n  prefix: \"!\"\n");
    let config = Config::load(&file.0).unwrap();
    assert!(matches!(config.validate(), Err(ConfigError::MissingField(_))));
}
