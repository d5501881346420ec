/*!
 * Completion endpoint clients.
 *
 * This module contains the client seam for text-completion services. The
 * production client speaks the OpenAI-compatible chat completions protocol;
 * a scripted mock exists for exercising the pipeline in tests.
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// One completion request: a system instruction plus the user text.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System instruction describing the task
    pub system: String,
    /// The text to complete against
    pub user_text: String,
}

impl CompletionRequest {
    /// Create a new completion request
    pub fn new(system: impl Into<String>, user_text: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user_text: user_text.into(),
        }
    }
}

/// A successful completion: the raw model output and reported token usage.
#[derive(Debug, Clone)]
pub struct Completion {
    /// Raw completion text, before any post-processing
    pub text: String,
    /// Total tokens the endpoint reported for this request
    pub total_tokens: u64,
}

/// Common trait for completion endpoint clients
///
/// Both configured model tiers hold a boxed implementation of this trait,
/// which is what makes unit testing with scripted fakes straightforward.
#[async_trait]
pub trait CompletionProvider: Send + Sync + Debug {
    /// Issue one completion request
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError>;

    /// Model identifier this client is configured for, used in logs
    fn model_name(&self) -> &str;
}

pub mod mock;
pub mod openai_compat;
