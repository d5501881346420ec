/*!
 * Batch translation processing.
 *
 * This module fans a page of work items out to the translation service with
 * bounded concurrency, then retries the failures once against the secondary
 * model tier when fallback is enabled. Every input item ends up in exactly
 * one of `succeeded` or `failed`; nothing is silently dropped.
 */

use std::sync::Arc;

use futures::future::join_all;
use log::{error, info};
use tokio::sync::Semaphore;

use super::core::{Tier, TranslationService, WorkItem};

/// Default number of in-flight translation requests
pub const DEFAULT_CONCURRENT_REQUESTS: usize = 8;

/// Aggregate outcome of one batch, consumed immediately by the job driver
#[derive(Debug, Default)]
pub struct BatchResult {
    /// Items translated successfully, each carrying `translated_text`
    pub succeeded: Vec<WorkItem>,
    /// Items that exhausted all tiers
    pub failed: Vec<WorkItem>,
    /// Total tokens reported across all successful tier attempts
    pub tokens_used: u64,
}

/// Batch translator for processing pages of work items
#[derive(Debug, Clone)]
pub struct BatchTranslator {
    /// The translation service to use
    service: TranslationService,

    /// Maximum number of concurrent requests
    max_concurrent_requests: usize,

    /// Whether primary-tier failures are retried at the secondary tier
    enable_fallback: bool,
}

impl BatchTranslator {
    /// Create a new batch translator
    pub fn new(service: TranslationService, max_concurrent_requests: usize, enable_fallback: bool) -> Self {
        Self {
            service,
            max_concurrent_requests: max_concurrent_requests.max(1),
            enable_fallback,
        }
    }

    /// Fallback runs only when enabled and a secondary client exists
    fn fallback_active(&self) -> bool {
        self.enable_fallback && self.service.has_secondary()
    }

    /// Translate a page of work items.
    ///
    /// Pass 1 sends every item to the primary tier concurrently. Pass 2, run
    /// only when fallback is active, re-sends the primary failures to the
    /// secondary tier. There is no third tier.
    pub async fn translate_batch(&self, items: Vec<WorkItem>) -> BatchResult {
        if items.is_empty() {
            return BatchResult::default();
        }

        let total = items.len();
        let (mut succeeded, primary_failed, mut tokens_used) =
            self.run_tier_pass(items, Tier::Primary).await;

        let failed = if primary_failed.is_empty() || !self.fallback_active() {
            primary_failed
        } else {
            info!(
                "Retrying {} items at secondary tier after primary failures",
                primary_failed.len()
            );
            let (retried_ok, retried_failed, retry_tokens) =
                self.run_tier_pass(primary_failed, Tier::Secondary).await;
            succeeded.extend(retried_ok);
            tokens_used += retry_tokens;
            retried_failed
        };

        debug_assert_eq!(succeeded.len() + failed.len(), total);

        BatchResult {
            succeeded,
            failed,
            tokens_used,
        }
    }

    /// One concurrent fan-out of `items` against a single tier.
    ///
    /// Each item runs in its own task so a panic in one item's pipeline is
    /// contained: the join error is logged and the item counted as a failure
    /// for this tier, forfeiting only its own tokens. Results are collected
    /// in input order, so the aggregate is deterministic regardless of
    /// completion order.
    async fn run_tier_pass(
        &self,
        items: Vec<WorkItem>,
        tier: Tier,
    ) -> (Vec<WorkItem>, Vec<WorkItem>, u64) {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_requests));

        let handles: Vec<_> = items
            .iter()
            .cloned()
            .map(|item| {
                let service = self.service.clone();
                let semaphore = semaphore.clone();
                tokio::spawn(async move {
                    let _permit = semaphore.acquire_owned().await.expect("semaphore closed");
                    service.translate_item(item, tier).await
                })
            })
            .collect();

        let mut succeeded = Vec::new();
        let mut failed = Vec::new();
        let mut tokens_used = 0u64;

        for (idx, joined) in join_all(handles).await.into_iter().enumerate() {
            match joined {
                Ok(Ok(success)) => {
                    tokens_used += success.tokens;
                    succeeded.push(success.item);
                }
                Ok(Err(item)) => {
                    failed.push(item);
                }
                Err(e) => {
                    let item = &items[idx];
                    error!(
                        "Translation task panicked for {}/{} at {} tier: {}",
                        item.platform, item.id, tier, e
                    );
                    failed.push(item.clone());
                }
            }
        }

        (succeeded, failed, tokens_used)
    }
}
