/*!
 * Core translation service implementation.
 *
 * This module contains the domain types of the pipeline and the
 * TranslationService, which translates one work item at a time by calling the
 * completion client configured for the requested model tier.
 */

use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Result, anyhow};
use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::app_config::TranslationConfig;
use crate::errors::ProviderError;
use crate::providers::openai_compat::OpenAiCompat;
use crate::providers::{CompletionProvider, CompletionRequest};
use crate::text_normalizer::normalize;

/// Source platform a work item belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// CurseForge mod listing
    Curseforge,
    /// Modrinth project listing
    Modrinth,
}

impl Platform {
    /// All supported platforms
    pub const ALL: [Platform; 2] = [Platform::Curseforge, Platform::Modrinth];

    /// Capitalized platform name for messages
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Curseforge => "Curseforge",
            Self::Modrinth => "Modrinth",
        }
    }

    /// Lowercase platform identifier, used as the store key
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Curseforge => "curseforge",
            Self::Modrinth => "modrinth",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Platform {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "curseforge" => Ok(Self::Curseforge),
            "modrinth" => Ok(Self::Modrinth),
            _ => Err(anyhow!("Invalid platform: {}", s)),
        }
    }
}

/// Which configured model tier handles a translation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tier {
    /// Primary ("upgrade") model
    #[default]
    Primary,
    /// Secondary ("downgrade") fallback model
    Secondary,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Secondary => write!(f, "secondary"),
        }
    }
}

/// One translatable unit, constructed by the change-set query and discarded
/// at the end of a job cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// Source platform
    pub platform: Platform,
    /// Identifier, unique within the platform
    pub id: String,
    /// Current source text
    pub original_text: String,
    /// Translated text; set if and only if the item succeeded
    pub translated_text: Option<String>,
    /// Tier that produced (or should produce) the translation
    pub tier: Tier,
}

impl WorkItem {
    /// Create a fresh untranslated work item
    pub fn new(platform: Platform, id: impl Into<String>, original_text: impl Into<String>) -> Self {
        Self {
            platform,
            id: id.into(),
            original_text: original_text.into(),
            translated_text: None,
            tier: Tier::Primary,
        }
    }

    /// The `(platform, id)` pair naming this unit and its persisted record
    pub fn identity(&self) -> (Platform, &str) {
        (self.platform, &self.id)
    }
}

/// A successfully translated item together with its token cost
#[derive(Debug, Clone)]
pub struct ItemSuccess {
    /// The item, with `translated_text` populated
    pub item: WorkItem,
    /// Tokens the endpoint reported for this translation
    pub tokens: u64,
}

/// Translation service holding the per-tier completion clients
///
/// Clients are built once at startup and shared read-only across the worker
/// pool; the service is cheap to clone.
#[derive(Debug, Clone)]
pub struct TranslationService {
    /// Primary tier client
    primary: Arc<dyn CompletionProvider>,
    /// Secondary tier client, absent when fallback is not configured
    secondary: Option<Arc<dyn CompletionProvider>>,
    /// Language the items are translated into
    target_language: String,
}

impl TranslationService {
    /// Create a service from explicit clients (used by tests)
    pub fn new(
        primary: Arc<dyn CompletionProvider>,
        secondary: Option<Arc<dyn CompletionProvider>>,
        target_language: impl Into<String>,
    ) -> Self {
        Self {
            primary,
            secondary,
            target_language: target_language.into(),
        }
    }

    /// Build the service from configuration
    pub fn from_config(config: &TranslationConfig) -> Result<Self> {
        let primary: Arc<dyn CompletionProvider> = Arc::new(OpenAiCompat::new(
            config.primary.api_key.clone(),
            config.primary.endpoint.clone(),
            config.primary.model.clone(),
            config.temperature,
            config.timeout_secs,
        ));

        let secondary: Option<Arc<dyn CompletionProvider>> = match &config.secondary {
            Some(secondary) if config.enable_fallback => Some(Arc::new(OpenAiCompat::new(
                secondary.api_key.clone(),
                secondary.endpoint.clone(),
                secondary.model.clone(),
                config.temperature,
                config.timeout_secs,
            ))),
            _ => None,
        };

        Ok(Self {
            primary,
            secondary,
            target_language: config.target_language.clone(),
        })
    }

    /// Whether a secondary tier is available for fallback
    pub fn has_secondary(&self) -> bool {
        self.secondary.is_some()
    }

    /// The fixed system instruction sent with every request
    fn system_prompt(&self) -> String {
        format!(
            "Translate the introduction text of a Minecraft Mod into {lang}. \
             Do not translate mod-specific terms. Translate vanilla Minecraft \
             item names according to the {lang} Minecraft Wiki. No explanations, \
             no additional notes, only the translated text.",
            lang = self.target_language
        )
    }

    fn client_for(&self, tier: Tier) -> Result<&Arc<dyn CompletionProvider>, ProviderError> {
        match tier {
            Tier::Primary => Ok(&self.primary),
            Tier::Secondary => self
                .secondary
                .as_ref()
                .ok_or_else(|| ProviderError::TierUnavailable(tier.to_string())),
        }
    }

    /// Translate raw text with the given tier's model.
    ///
    /// Returns the normalized translation and the reported token usage.
    pub async fn complete(
        &self,
        text: &str,
        tier: Tier,
    ) -> Result<(String, u64), ProviderError> {
        let client = self.client_for(tier)?;
        let request = CompletionRequest::new(self.system_prompt(), text);

        let completion = client.complete(request).await?;

        Ok((normalize(&completion.text), completion.total_tokens))
    }

    /// Translate one work item with the given tier.
    ///
    /// On success the returned item carries `translated_text` and the tier
    /// that produced it. On failure the original item comes back unchanged so
    /// the caller can re-route it; nothing is partially mutated.
    pub async fn translate_item(
        &self,
        item: WorkItem,
        tier: Tier,
    ) -> Result<ItemSuccess, WorkItem> {
        let start = Instant::now();

        match self.complete(&item.original_text, tier).await {
            Ok((translated, tokens)) => {
                debug!(
                    "Translated {}/{} at {} tier in {:?} ({} tokens)",
                    item.platform,
                    item.id,
                    tier,
                    start.elapsed(),
                    tokens
                );
                let mut item = item;
                item.translated_text = Some(translated);
                item.tier = tier;
                Ok(ItemSuccess { item, tokens })
            }
            Err(e) => {
                error!(
                    "Translation failed for {}/{} at {} tier: {}",
                    item.platform, item.id, tier, e
                );
                Err(item)
            }
        }
    }
}
