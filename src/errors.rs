/*!
 * Error types for the modtrans application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when talking to a completion endpoint
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// The request exceeded the configured timeout
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// The requested tier has no configured client
    #[error("No client configured for tier: {0}")]
    TierUnavailable(String),

    /// The completion came back without usable text
    #[error("Empty completion response")]
    EmptyResponse,
}

/// Errors that can occur when announcing results
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Error when making the webhook request fails
    #[error("Notification request failed: {0}")]
    RequestFailed(String),

    /// The messaging API reported a failure
    #[error("Notification API error: {0}")]
    ApiError(String),

    /// All delivery attempts were exhausted
    #[error("Notification delivery failed after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
        /// The last error observed
        last_error: String,
    },
}
