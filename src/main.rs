// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info};
use tokio::sync::watch;

use crate::app_config::Config;
use crate::app_controller::Controller;
use crate::notify::Notifier;
use crate::store::{Repository, StoreConnection};
use crate::translation::batch::BatchTranslator;
use crate::translation::core::{Platform, TranslationService};

mod app_config;
mod app_controller;
mod errors;
mod notify;
mod providers;
mod retry;
mod scheduler;
mod store;
mod text_normalizer;
mod translation;

/// CLI wrapper for Platform to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliPlatform {
    Curseforge,
    Modrinth,
}

impl From<CliPlatform> for Platform {
    fn from(cli_platform: CliPlatform) -> Self {
        match cli_platform {
            CliPlatform::Curseforge => Platform::Curseforge,
            CliPlatform::Modrinth => Platform::Modrinth,
        }
    }
}

/// CLI wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// modtrans - scheduled AI translation of Minecraft mod listings
///
/// Watches the CurseForge and Modrinth mirror collections for summaries that
/// need (re)translation, translates them with a tiered completion API and
/// records the results.
#[derive(Parser, Debug)]
#[command(name = "modtrans")]
#[command(version = "1.0.0")]
#[command(about = "Scheduled AI translation service for Minecraft mod listings")]
#[command(long_about = "modtrans scans mod listing mirrors for untranslated or stale summaries,
translates them through an OpenAI-compatible completion API with tiered-model
fallback, and announces completed batches over a messaging webhook.

EXAMPLES:
    modtrans                                  # Run on the configured schedule
    modtrans --once                           # Drain all platforms once, then exit
    modtrans --once -p modrinth               # Drain a single platform once
    modtrans -c /etc/modtrans/conf.json       # Use a specific config file
    modtrans --log-level debug                # Verbose logging

CONFIGURATION:
    Configuration is stored in conf.json by default. If the config file does
    not exist, a default one is created for you to fill in.")]
struct CommandLineOptions {
    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Run one drain cycle per platform and exit instead of scheduling
    #[arg(long)]
    once: bool,

    /// Restrict to a single platform
    #[arg(short, long, value_enum)]
    platform: Option<CliPlatform>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let color = Self::color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:5} {}\x1B[0m",
                color,
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default; the level is
    // updated after the config is loaded.
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    let config = Config::load_or_create(&cli.config_path)
        .with_context(|| format!("Failed to load configuration from {}", cli.config_path))?;

    let log_level = cli
        .log_level
        .map(app_config::LogLevel::from)
        .unwrap_or_else(|| config.log_level.clone());
    log::set_max_level(log_level.to_level_filter());

    // A half-configured process must not reach the scheduler.
    config
        .validate()
        .context("Configuration validation failed")?;

    let store = match &config.store.database_path {
        Some(path) => StoreConnection::new(path)?,
        None => StoreConnection::new_default()?,
    };
    let repository = Repository::new(store);

    let service = TranslationService::from_config(&config.translation)?;
    let translator = BatchTranslator::new(
        service,
        config.translation.concurrent_requests,
        config.translation.enable_fallback,
    );
    let notifier = Notifier::new(config.notification.clone());

    let controller = Arc::new(Controller::new(
        repository,
        translator,
        Arc::new(notifier),
        config.translation.batch_size,
    ));

    let platforms: Vec<Platform> = match cli.platform {
        Some(p) => vec![p.into()],
        None => Platform::ALL.to_vec(),
    };

    if cli.once {
        return run_once(&controller, &platforms).await;
    }

    run_scheduled(controller, &config, &platforms).await
}

/// Drain each selected platform once and exit
async fn run_once(controller: &Arc<Controller>, platforms: &[Platform]) -> Result<()> {
    let mut failed = false;

    for platform in platforms {
        match controller.run_drain_cycle(*platform).await {
            Ok(summary) => {
                info!(
                    "{}: {} succeeded, {} failed, {} tokens",
                    platform.display_name(),
                    summary.succeeded,
                    summary.failed,
                    summary.tokens_used
                );
            }
            Err(e) => {
                error!("{} drain cycle failed: {}", platform.display_name(), e);
                failed = true;
            }
        }
    }

    if failed {
        anyhow::bail!("One or more drain cycles failed");
    }
    Ok(())
}

/// Run the recurring per-platform loops until interrupted
async fn run_scheduled(
    controller: Arc<Controller>,
    config: &Config,
    platforms: &[Platform],
) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut handles = Vec::new();
    for platform in platforms {
        let cadence = match platform {
            Platform::Curseforge => config.schedule.curseforge.clone(),
            Platform::Modrinth => config.schedule.modrinth.clone(),
        };
        handles.push(tokio::spawn(scheduler::run_platform_loop(
            controller.clone(),
            *platform,
            cadence,
            shutdown_rx.clone(),
        )));
    }

    info!("Scheduler started");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutting down...");

    shutdown_tx.send(true).ok();
    for handle in handles {
        handle.await.ok();
    }

    Ok(())
}
