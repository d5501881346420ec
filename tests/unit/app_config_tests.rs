/*!
 * Tests for application configuration functionality
 */

use modtrans::app_config::{Cadence, Config, CronFields, LogLevel, ModelTierConfig};
use tempfile::TempDir;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.translation.primary.model, "deepseek-v3");
    assert!(config.translation.secondary.is_none());
    assert!(!config.translation.enable_fallback);
    assert_eq!(config.translation.target_language, "Chinese");
    assert_eq!(config.translation.batch_size, 16);
    assert_eq!(config.translation.concurrent_requests, 8);
    assert_eq!(config.translation.timeout_secs, 60);

    assert!(!config.notification.enable);
    assert_eq!(config.notification.bot_api, "https://api.telegram.org/bot");
    assert_eq!(config.notification.retry_attempts, 10);
    assert_eq!(config.notification.retry_delay_secs, 1);

    // Daily interval per platform by default
    assert_eq!(config.schedule.curseforge.interval_secs, Some(86400));
    assert_eq!(config.schedule.modrinth.interval_secs, Some(86400));

    assert_eq!(config.log_level, LogLevel::Info);
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();

    // Defaults ship without an API key, so validation must fail until one
    // is filled in.
    assert!(config.validate().is_err());
    config.translation.primary.api_key = "sk-1234567890".to_string();
    assert!(config.validate().is_ok());

    // Empty model name
    config.translation.primary.model = String::new();
    assert!(config.validate().is_err());
    config.translation.primary.model = "deepseek-v3".to_string();

    // Fallback enabled without a secondary tier
    config.translation.enable_fallback = true;
    assert!(config.validate().is_err());

    // Secondary tier present but missing its key
    config.translation.secondary = Some(ModelTierConfig {
        model: "qwen-turbo".to_string(),
        api_key: String::new(),
        endpoint: "https://example.invalid/v1".to_string(),
    });
    assert!(config.validate().is_err());

    if let Some(secondary) = &mut config.translation.secondary {
        secondary.api_key = "sk-0987654321".to_string();
    }
    assert!(config.validate().is_ok());

    // Zero-valued pipeline knobs
    config.translation.batch_size = 0;
    assert!(config.validate().is_err());
    config.translation.batch_size = 16;

    config.translation.concurrent_requests = 0;
    assert!(config.validate().is_err());
    config.translation.concurrent_requests = 8;

    // Notifications enabled require credentials
    config.notification.enable = true;
    assert!(config.validate().is_err());
    config.notification.bot_token = "123:abc".to_string();
    assert!(config.validate().is_err());
    config.notification.chat_id = "-100123".to_string();
    assert!(config.validate().is_ok());
}

/// Test cadence validation for cron and interval triggers
#[test]
fn test_cadence_validation_withVariousTriggers_shouldValidateCorrectly() {
    let interval = Cadence {
        interval_secs: Some(900),
        cron: None,
    };
    assert!(interval.validate().is_ok());

    let zero_interval = Cadence {
        interval_secs: Some(0),
        cron: None,
    };
    assert!(zero_interval.validate().is_err());

    let nothing = Cadence {
        interval_secs: None,
        cron: None,
    };
    assert!(nothing.validate().is_err());

    let daily_at_four = Cadence {
        interval_secs: None,
        cron: Some(CronFields {
            day: None,
            hour: Some(4),
            minute: Some(0),
            second: None,
        }),
    };
    assert!(daily_at_four.validate().is_ok());

    let empty_cron = Cadence {
        interval_secs: None,
        cron: Some(CronFields::default()),
    };
    assert!(empty_cron.validate().is_err());

    let bad_hour = Cadence {
        interval_secs: None,
        cron: Some(CronFields {
            day: None,
            hour: Some(24),
            minute: None,
            second: None,
        }),
    };
    assert!(bad_hour.validate().is_err());

    let bad_day = Cadence {
        interval_secs: None,
        cron: Some(CronFields {
            day: Some(0),
            hour: None,
            minute: None,
            second: None,
        }),
    };
    assert!(bad_day.validate().is_err());
}

/// Test loading a missing config writes defaults and round-trips
#[test]
fn test_load_or_create_withMissingFile_shouldWriteDefaultsAndRoundTrip() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("conf.json");

    assert!(!path.exists());
    let created = Config::load_or_create(&path).expect("create defaults");
    assert!(path.exists());
    assert_eq!(created.translation.batch_size, 16);

    // Edit and save, then reload
    let mut edited = created;
    edited.translation.primary.api_key = "sk-test".to_string();
    edited.translation.batch_size = 4;
    edited.log_level = LogLevel::Debug;
    edited.save(&path).expect("save");

    let reloaded = Config::load_or_create(&path).expect("reload");
    assert_eq!(reloaded.translation.primary.api_key, "sk-test");
    assert_eq!(reloaded.translation.batch_size, 4);
    assert_eq!(reloaded.log_level, LogLevel::Debug);
}

/// Test that a partial config file is filled in with defaults
#[test]
fn test_load_or_create_withPartialFile_shouldApplyFieldDefaults() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("conf.json");

    std::fs::write(
        &path,
        r#"{ "translation": { "primary": { "api_key": "sk-partial" } } }"#,
    )
    .expect("write partial config");

    let config = Config::load_or_create(&path).expect("load partial");
    assert_eq!(config.translation.primary.api_key, "sk-partial");
    assert_eq!(config.translation.primary.model, "deepseek-v3");
    assert_eq!(config.translation.concurrent_requests, 8);
    assert_eq!(config.log_level, LogLevel::Info);
}
