/*!
 * Common test utilities for the modtrans test suite
 */

use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;

use modtrans::app_config::NotificationConfig;
use modtrans::errors::NotifyError;
use modtrans::providers::CompletionProvider;
use modtrans::providers::mock::MockCompletion;
use modtrans::translation::batch::BatchTranslator;
use modtrans::translation::core::{Platform, TranslationService};
use modtrans::{Controller, Notifier, Repository, ResultNotifier};

/// Initializes logging for a test, safe to call from every test
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Announcement channel that records every handoff instead of delivering it
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    /// Announcements received, in arrival order
    sent: Arc<Mutex<Vec<(Platform, Vec<String>)>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every announcement received so far
    pub fn announcements(&self) -> Vec<(Platform, Vec<String>)> {
        self.sent.lock().expect("notifier lock").clone()
    }
}

#[async_trait]
impl ResultNotifier for RecordingNotifier {
    async fn send_result(
        &self,
        platform: Platform,
        translated_ids: &[String],
    ) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .expect("notifier lock")
            .push((platform, translated_ids.to_vec()));
        Ok(())
    }
}

/// Creates an in-memory repository seeded with the given source listings
pub async fn seeded_repository(
    platform: Platform,
    listings: &[(&str, &str)],
) -> Result<Repository> {
    let repository = Repository::new_in_memory()?;
    for (id, summary) in listings {
        repository.upsert_source(platform, id, summary).await?;
    }
    Ok(repository)
}

/// Creates a batch translator backed by mock completion clients
pub fn mock_translator(
    primary: MockCompletion,
    secondary: Option<MockCompletion>,
    enable_fallback: bool,
) -> BatchTranslator {
    let service = TranslationService::new(
        Arc::new(primary),
        secondary.map(|s| Arc::new(s) as Arc<dyn CompletionProvider>),
        "Chinese",
    );
    BatchTranslator::new(service, 4, enable_fallback)
}

/// Creates a notifier that never sends anything
pub fn disabled_notifier() -> Notifier {
    Notifier::new(NotificationConfig::default())
}

/// Assembles a controller over the given repository and translator
pub fn controller(
    repository: Repository,
    translator: BatchTranslator,
    batch_size: usize,
) -> Controller {
    Controller::new(
        repository,
        translator,
        Arc::new(disabled_notifier()),
        batch_size,
    )
}

/// Assembles a controller with an explicit announcement channel
pub fn controller_with_notifier(
    repository: Repository,
    translator: BatchTranslator,
    notifier: Arc<dyn ResultNotifier>,
    batch_size: usize,
) -> Controller {
    Controller::new(repository, translator, notifier, batch_size)
}
