/*!
 * Job driver: one drain cycle per scheduled trigger.
 *
 * A cycle repeatedly pulls a page of outstanding work from the change-set
 * query, routes it through the batch translator, persists every success and
 * folds the counts into running totals. The loop ends when a page comes back
 * empty, at which point the cycle summary is logged and, given at least one
 * success, announced over the notification channel.
 */

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use log::{error, info, warn};

use crate::notify::ResultNotifier;
use crate::retry::retry_fixed;
use crate::store::Repository;
use crate::translation::batch::BatchTranslator;
use crate::translation::core::Platform;

/// Attempts for one translation record write
const RECORD_WRITE_ATTEMPTS: u32 = 3;

/// Fixed delay between record write attempts
const RECORD_WRITE_DELAY: Duration = Duration::from_millis(500);

/// Running totals for one drain cycle
#[derive(Debug, Clone, Default)]
pub struct CycleSummary {
    /// Items translated and durably recorded
    pub succeeded: u64,
    /// Items that exhausted all tiers, or whose record write failed
    pub failed: u64,
    /// Tokens consumed across all successful tier attempts
    pub tokens_used: u64,
    /// Identities of the durably recorded items, in completion order
    pub translated_ids: Vec<String>,
}

/// Main application controller driving drain cycles
pub struct Controller {
    /// Store access for the change-set query and persistence writer
    repository: Repository,
    /// Batch translator with tier fallback
    translator: BatchTranslator,
    /// Announcement channel
    notifier: Arc<dyn ResultNotifier>,
    /// Items per change-set page
    batch_size: usize,
}

impl Controller {
    /// Create a new controller
    pub fn new(
        repository: Repository,
        translator: BatchTranslator,
        notifier: Arc<dyn ResultNotifier>,
        batch_size: usize,
    ) -> Self {
        Self {
            repository,
            translator,
            notifier,
            batch_size: batch_size.max(1),
        }
    }

    /// Drain the backlog for one platform.
    ///
    /// Each iteration re-queries the store, since concurrent writes may have
    /// changed the untranslated/stale classification. Identities that failed
    /// this cycle are excluded from subsequent pages; they will reappear on
    /// the next scheduled cycle.
    pub async fn run_drain_cycle(&self, platform: Platform) -> Result<CycleSummary> {
        info!("Starting {} translation check...", platform.display_name());

        let (untranslated, stale) = self.repository.count_outstanding(platform).await?;
        info!(
            "{} backlog estimate: {} untranslated, {} stale",
            platform.display_name(),
            untranslated,
            stale
        );

        let mut summary = CycleSummary::default();
        let mut failed_this_cycle: HashSet<String> = HashSet::new();

        loop {
            let page = self
                .repository
                .next_page(platform, self.batch_size, &failed_this_cycle)
                .await?;
            if page.is_empty() {
                break;
            }

            let result = self.translator.translate_batch(page).await;
            summary.tokens_used += result.tokens_used;

            let mut recorded = 0;
            for item in result.succeeded {
                // The translation already paid its tokens; a transient write
                // failure gets a few retries before the result is discarded.
                // A write that still fails means the translation was not
                // durably recorded; the item counts as failed and is
                // re-selected on a future cycle.
                let write = retry_fixed(
                    RECORD_WRITE_ATTEMPTS,
                    RECORD_WRITE_DELAY,
                    "translation record write",
                    || self.repository.record(&item),
                )
                .await;
                match write {
                    Ok(()) => {
                        summary.succeeded += 1;
                        summary.translated_ids.push(item.id);
                        recorded += 1;
                    }
                    Err(e) => {
                        error!(
                            "Failed to record translation for {}/{}: {}",
                            platform, item.id, e
                        );
                        summary.failed += 1;
                        failed_this_cycle.insert(item.id);
                    }
                }
            }

            for item in result.failed {
                summary.failed += 1;
                failed_this_cycle.insert(item.id);
            }

            info!("Successfully translated {} items.", recorded);
        }

        info!(
            "Totally translated {} {} items, failed {}, used {} tokens.",
            summary.succeeded,
            platform.display_name(),
            summary.failed,
            summary.tokens_used
        );

        if summary.succeeded > 0 {
            if let Err(e) = self
                .notifier
                .send_result(platform, &summary.translated_ids)
                .await
            {
                // Announcement failure never fails the cycle.
                warn!("Failed to announce {} results: {}", platform, e);
            }
        }

        info!("{} translation check completed.", platform.display_name());

        Ok(summary)
    }
}
