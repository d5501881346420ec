/*!
 * Result announcements over the messaging webhook.
 *
 * After a drain cycle with at least one success, the job driver hands the
 * translated identity list here. The message carries a count header, one
 * identity per line and a platform hashtag footer, capped at the transport's
 * hard message-length ceiling. Delivery is retried with a fixed delay a
 * bounded number of times; exhaustion is logged by the caller, never fatal.
 */

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::app_config::NotificationConfig;
use crate::errors::NotifyError;
use crate::retry::retry_fixed;
use crate::translation::core::Platform;

/// Telegram's maximum text message length
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Common trait for announcement channels
///
/// The job driver holds a boxed implementation of this trait, which is what
/// makes asserting on the announcement handoff in tests straightforward.
#[async_trait]
pub trait ResultNotifier: Send + Sync {
    /// Announce the successfully translated identities for a platform
    async fn send_result(
        &self,
        platform: Platform,
        translated_ids: &[String],
    ) -> Result<(), NotifyError>;
}

/// Notifier for announcing completed drain cycles
#[derive(Debug, Clone)]
pub struct Notifier {
    /// HTTP client for webhook requests
    client: Client,
    /// Notification settings
    config: NotificationConfig,
}

/// Telegram sendMessage response envelope
#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    /// Whether the API accepted the message
    ok: bool,
    /// Error description when `ok` is false
    description: Option<String>,
    /// Message details when `ok` is true
    result: Option<SentMessage>,
}

/// Delivered message details
#[derive(Debug, Deserialize)]
struct SentMessage {
    /// Identifier assigned by the API
    message_id: i64,
}

impl Notifier {
    /// Create a notifier from configuration
    pub fn new(config: NotificationConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            config,
        }
    }
}

#[async_trait]
impl ResultNotifier for Notifier {
    /// Announce the successfully translated identities for a platform.
    ///
    /// No-op when notifications are disabled. Retries delivery with a fixed
    /// delay up to the configured attempt bound.
    async fn send_result(
        &self,
        platform: Platform,
        translated_ids: &[String],
    ) -> Result<(), NotifyError> {
        if !self.config.enable {
            debug!("Notifications disabled, skipping announcement for {}", platform);
            return Ok(());
        }

        let message = build_message(platform, translated_ids, MAX_MESSAGE_CHARS);
        let attempts = self.config.retry_attempts;
        let delay = Duration::from_secs(self.config.retry_delay_secs);

        let message_id = retry_fixed(attempts, delay, "notification delivery", || {
            self.send_message(&message)
        })
        .await
        .map_err(|e| NotifyError::RetriesExhausted {
            attempts: attempts.max(1),
            last_error: e.to_string(),
        })?;

        info!(
            "Announced {} translated {} items, message_id: {}",
            translated_ids.len(),
            platform,
            message_id
        );

        Ok(())
    }
}

impl Notifier {
    /// One delivery attempt
    async fn send_message(&self, text: &str) -> Result<i64, NotifyError> {
        let url = format!(
            "{}{}/sendMessage",
            self.config.bot_api, self.config.bot_token
        );

        let response = self
            .client
            .post(&url)
            .json(&json!({
                "chat_id": self.config.chat_id,
                "text": text,
            }))
            .send()
            .await
            .map_err(|e| NotifyError::RequestFailed(e.to_string()))?;

        let body = response
            .json::<SendMessageResponse>()
            .await
            .map_err(|e| NotifyError::RequestFailed(e.to_string()))?;

        if !body.ok {
            return Err(NotifyError::ApiError(
                body.description
                    .unwrap_or_else(|| "no error description".to_string()),
            ));
        }

        body.result
            .map(|m| m.message_id)
            .ok_or_else(|| NotifyError::ApiError("missing result in response".to_string()))
    }
}

/// Assemble the announcement text within the message-length ceiling.
///
/// The header always reports the full count; identity lines that do not fit
/// the remaining budget are dropped.
pub fn build_message(platform: Platform, translated_ids: &[String], max_chars: usize) -> String {
    let (noun, footer) = match platform {
        Platform::Curseforge => ("mods", "\n#Curseforge_Translate"),
        Platform::Modrinth => ("projects", "\n#Modrinth_Translate"),
    };

    let header = format!(
        "Translated {} {} {}, IDs:\n",
        translated_ids.len(),
        platform.display_name(),
        noun
    );

    let budget = max_chars.saturating_sub(header.chars().count() + footer.chars().count());

    let mut lines = String::new();
    let mut used = 0;
    for id in translated_ids {
        // Lines after the first need a separating newline.
        let increment = id.chars().count() + usize::from(!lines.is_empty());
        if used + increment > budget {
            break;
        }
        if !lines.is_empty() {
            lines.push('\n');
        }
        lines.push_str(id);
        used += increment;
    }

    format!("{}{}{}", header, lines, footer)
}
