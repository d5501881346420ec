/*!
 * Mock completion provider for testing.
 *
 * Behaviors:
 * - `MockCompletion::working()` - always succeeds, echoing a tagged translation
 * - `MockCompletion::failing()` - always fails
 * - `MockCompletion::failing_for(...)` - fails only for requests whose user
 *   text contains one of the given markers, which is how tests script
 *   per-item tier failures
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::errors::ProviderError;
use crate::providers::{Completion, CompletionProvider, CompletionRequest};

/// Behavior mode for the mock provider
#[derive(Debug, Clone)]
enum MockBehavior {
    /// Always succeeds with a tagged translation
    Working,
    /// Always fails with a request error
    Failing,
    /// Fails for user texts containing any of these markers
    FailingFor(Vec<String>),
    /// Responds slowly (for timeout-adjacent tests)
    Slow { delay_ms: u64 },
}

/// Scripted completion provider for tests
#[derive(Debug, Clone)]
pub struct MockCompletion {
    /// Behavior mode
    behavior: MockBehavior,
    /// Tag prepended to successful outputs, to tell tiers apart in asserts
    tag: String,
    /// Tokens reported per successful request
    tokens_per_request: u64,
    /// Number of requests served
    request_count: Arc<AtomicUsize>,
}

impl MockCompletion {
    fn new(behavior: MockBehavior, tag: &str) -> Self {
        Self {
            behavior,
            tag: tag.to_string(),
            tokens_per_request: 10,
            request_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a mock that always succeeds
    pub fn working(tag: &str) -> Self {
        Self::new(MockBehavior::Working, tag)
    }

    /// Create a mock that always fails
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing, "failing")
    }

    /// Create a mock that fails for user texts containing any given marker
    pub fn failing_for(markers: &[&str], tag: &str) -> Self {
        Self::new(
            MockBehavior::FailingFor(markers.iter().map(|m| m.to_string()).collect()),
            tag,
        )
    }

    /// Create a mock that delays each response
    pub fn slow(delay_ms: u64, tag: &str) -> Self {
        Self::new(MockBehavior::Slow { delay_ms }, tag)
    }

    /// Override the tokens reported per successful request
    pub fn with_tokens(mut self, tokens: u64) -> Self {
        self.tokens_per_request = tokens;
        self
    }

    /// Number of requests this mock has served
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    fn succeed(&self, request: &CompletionRequest) -> Completion {
        Completion {
            text: format!("[{}] {}", self.tag, request.user_text),
            total_tokens: self.tokens_per_request,
        }
    }
}

#[async_trait]
impl CompletionProvider for MockCompletion {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);

        match &self.behavior {
            MockBehavior::Working => Ok(self.succeed(&request)),
            MockBehavior::Failing => {
                Err(ProviderError::RequestFailed("mock failure".to_string()))
            }
            MockBehavior::FailingFor(markers) => {
                if markers.iter().any(|m| request.user_text.contains(m)) {
                    Err(ProviderError::RequestFailed(format!(
                        "mock failure for {:?}",
                        request.user_text
                    )))
                } else {
                    Ok(self.succeed(&request))
                }
            }
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(std::time::Duration::from_millis(*delay_ms)).await;
                Ok(self.succeed(&request))
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.tag
    }
}
