/*!
 * Translation pipeline.
 *
 * - `core`: domain types (platform, tier, work item) and the per-item
 *   translation service sitting on top of the completion clients
 * - `batch`: concurrent fan-out over a page of work items with tier fallback
 */

pub mod batch;
pub mod core;

pub use batch::{BatchResult, BatchTranslator};
pub use core::{Platform, Tier, TranslationService, WorkItem};
