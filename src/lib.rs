/*!
 * # modtrans
 *
 * A Rust service that keeps AI translations of Minecraft mod listings fresh.
 *
 * ## Features
 *
 * - Scans the CurseForge and Modrinth mirror collections for summaries that
 *   are missing a translation or whose source text changed since the last one
 * - Translates outstanding text through an OpenAI-compatible completion API
 *   with a primary model tier and an optional secondary fallback tier
 * - Concurrent batch processing with per-item failure isolation and token
 *   accounting
 * - Durable upsert-by-identity translation records
 * - Optional Telegram announcements of each completed drain cycle
 * - Per-platform interval or cron-style scheduling
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `text_normalizer`: Deterministic cleanup of model output
 * - `providers`: Completion endpoint clients:
 *   - `providers::openai_compat`: OpenAI-compatible API client
 *   - `providers::mock`: Scripted client for tests
 * - `translation`: The translation pipeline:
 *   - `translation::core`: Domain types and the per-item translation service
 *   - `translation::batch`: Concurrent fan-out with tier fallback
 * - `store`: Document store boundary (change-set query, persistence writer)
 * - `app_controller`: Job driver running drain cycles
 * - `scheduler`: Per-platform recurring triggers
 * - `notify`: Result announcements with bounded retry
 * - `retry`: Fixed-delay retry utility
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod notify;
pub mod providers;
pub mod retry;
pub mod scheduler;
pub mod store;
pub mod text_normalizer;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, CycleSummary};
pub use errors::{NotifyError, ProviderError};
pub use notify::{Notifier, ResultNotifier};
pub use store::Repository;
pub use translation::{BatchResult, BatchTranslator, Platform, Tier, TranslationService, WorkItem};
