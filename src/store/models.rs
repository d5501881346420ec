/*!
 * Record types for the store layer.
 */

use serde::{Deserialize, Serialize};

use crate::translation::core::Platform;

/// The durable state of one item's translation.
///
/// At most one record exists per `(platform, id)`; the persistence writer
/// replaces it wholesale on every successful translation. Records are never
/// deleted by this system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRecord {
    /// Source platform
    pub platform: Platform,
    /// Identifier, unique within the platform
    pub id: String,
    /// Source text this record was translated from
    pub original: String,
    /// Translated text
    pub translated: String,
    /// When the translation was recorded, RFC 3339
    pub translated_at: String,
    /// Set externally when the source text is known to have drifted
    pub needs_update: bool,
}
