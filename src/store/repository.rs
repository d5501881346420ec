/*!
 * Repository layer for the document store.
 *
 * Implements the two sides of the pipeline's store boundary: the change-set
 * query that pages through outstanding work, and the persistence writer that
 * upserts translation records by identity.
 */

use std::collections::HashSet;

use anyhow::{Result, bail};
use chrono::Utc;
use log::debug;
use rusqlite::{Connection, OptionalExtension, params};

use super::connection::StoreConnection;
use super::models::TranslationRecord;
use crate::translation::core::{Platform, WorkItem};

/// Repository for store operations
#[derive(Clone)]
pub struct Repository {
    /// Store connection
    store: StoreConnection,
}

impl Repository {
    /// Create a new repository with the given store connection
    pub fn new(store: StoreConnection) -> Self {
        Self { store }
    }

    /// Create a repository with the default store location
    pub fn new_default() -> Result<Self> {
        let store = StoreConnection::new_default()?;
        Ok(Self::new(store))
    }

    /// Create a repository with an in-memory store (for testing)
    pub fn new_in_memory() -> Result<Self> {
        let store = StoreConnection::new_in_memory()?;
        Ok(Self::new(store))
    }

    // =========================================================================
    // Change-Set Query
    // =========================================================================

    /// Read the next page of outstanding work for a platform.
    ///
    /// Pass 1 selects untranslated items; the stale pass runs only once the
    /// untranslated pass comes back empty. `exclude` holds identities already
    /// attempted and failed this cycle, so a permanently failing item cannot
    /// be re-selected and starve the drain loop. An empty return means both
    /// passes are exhausted for this cycle.
    pub async fn next_page(
        &self,
        platform: Platform,
        batch_size: usize,
        exclude: &HashSet<String>,
    ) -> Result<Vec<WorkItem>> {
        let page = self.next_untranslated_page(platform, batch_size, exclude).await?;
        if !page.is_empty() {
            return Ok(page);
        }

        self.next_stale_page(platform, batch_size, exclude).await
    }

    /// Items present in the source collection with no translation record.
    ///
    /// Pages are ordered by identity, never by row offset: successful upserts
    /// remove items from this set, so re-issuing the query naturally advances
    /// even while new rows are inserted concurrently.
    pub async fn next_untranslated_page(
        &self,
        platform: Platform,
        batch_size: usize,
        exclude: &HashSet<String>,
    ) -> Result<Vec<WorkItem>> {
        let exclude = exclude.clone();

        self.store
            .execute_async(move |conn| {
                // Over-fetch by the exclusion count so a page full of
                // excluded identities cannot hide remaining work.
                let fetch_limit = (batch_size + exclude.len()) as i64;

                let mut stmt = conn.prepare(
                    r#"
                    SELECT m.id, m.summary
                    FROM mods m
                    LEFT JOIN translations t
                        ON t.platform = m.platform AND t.id = m.id
                    WHERE m.platform = ?1 AND m.summary != '' AND t.id IS NULL
                    ORDER BY m.id
                    LIMIT ?2
                    "#,
                )?;

                let rows = stmt.query_map(params![platform.as_str(), fetch_limit], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })?;

                collect_page(platform, batch_size, &exclude, rows)
            })
            .await
    }

    /// Items whose stored `original` no longer matches the current source
    /// text, or whose record was externally flagged for update.
    pub async fn next_stale_page(
        &self,
        platform: Platform,
        batch_size: usize,
        exclude: &HashSet<String>,
    ) -> Result<Vec<WorkItem>> {
        let exclude = exclude.clone();

        self.store
            .execute_async(move |conn| {
                let fetch_limit = (batch_size + exclude.len()) as i64;

                let mut stmt = conn.prepare(
                    r#"
                    SELECT m.id, m.summary
                    FROM mods m
                    JOIN translations t
                        ON t.platform = m.platform AND t.id = m.id
                    WHERE m.platform = ?1
                      AND m.summary != ''
                      AND (t.original != m.summary OR t.needs_update = 1)
                    ORDER BY m.id
                    LIMIT ?2
                    "#,
                )?;

                let rows = stmt.query_map(params![platform.as_str(), fetch_limit], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })?;

                collect_page(platform, batch_size, &exclude, rows)
            })
            .await
    }

    /// Estimated backlog for a platform: (untranslated, stale) counts
    pub async fn count_outstanding(&self, platform: Platform) -> Result<(u64, u64)> {
        self.store
            .execute_async(move |conn| {
                let untranslated: u64 = conn.query_row(
                    r#"
                    SELECT COUNT(*)
                    FROM mods m
                    LEFT JOIN translations t
                        ON t.platform = m.platform AND t.id = m.id
                    WHERE m.platform = ?1 AND m.summary != '' AND t.id IS NULL
                    "#,
                    [platform.as_str()],
                    |row| row.get(0),
                )?;

                let stale: u64 = conn.query_row(
                    r#"
                    SELECT COUNT(*)
                    FROM mods m
                    JOIN translations t
                        ON t.platform = m.platform AND t.id = m.id
                    WHERE m.platform = ?1
                      AND m.summary != ''
                      AND (t.original != m.summary OR t.needs_update = 1)
                    "#,
                    [platform.as_str()],
                    |row| row.get(0),
                )?;

                Ok((untranslated, stale))
            })
            .await
    }

    // =========================================================================
    // Persistence Writer
    // =========================================================================

    /// Upsert the translation record for one successfully translated item.
    ///
    /// Stores the source text the item was translated from, the translated
    /// text and the current time, and clears any external update flag.
    /// Idempotent: re-running with identical inputs leaves the same record.
    pub async fn record(&self, item: &WorkItem) -> Result<()> {
        let item = item.clone();

        self.store
            .execute_async(move |conn| upsert_translation(conn, &item))
            .await
    }

    /// Upsert translation records for a batch of successfully translated
    /// items in one transaction. Returns the number of records written.
    pub async fn record_batch(&self, items: &[WorkItem]) -> Result<usize> {
        let items = items.to_vec();

        self.store
            .execute_async(move |conn| {
                let tx = conn.unchecked_transaction()?;
                for item in &items {
                    upsert_translation(&tx, item)?;
                }
                tx.commit()?;

                debug!("Recorded {} translations", items.len());
                Ok(items.len())
            })
            .await
    }

    /// Read back the translation record for an identity
    pub async fn get_translation(
        &self,
        platform: Platform,
        id: &str,
    ) -> Result<Option<TranslationRecord>> {
        let id = id.to_string();

        self.store
            .execute_async(move |conn| {
                let result = conn
                    .query_row(
                        r#"
                        SELECT original, translated, translated_at, needs_update
                        FROM translations
                        WHERE platform = ?1 AND id = ?2
                        "#,
                        params![platform.as_str(), id],
                        |row| {
                            Ok(TranslationRecord {
                                platform,
                                id: id.clone(),
                                original: row.get(0)?,
                                translated: row.get(1)?,
                                translated_at: row.get(2)?,
                                needs_update: row.get::<_, i64>(3)? != 0,
                            })
                        },
                    )
                    .optional()?;

                Ok(result)
            })
            .await
    }

    // =========================================================================
    // Source collection maintenance
    // =========================================================================

    /// Insert or replace a source listing. The pipeline itself never calls
    /// this; it exists for the mirror ingestion job and for tests.
    pub async fn upsert_source(
        &self,
        platform: Platform,
        id: &str,
        summary: &str,
    ) -> Result<()> {
        let id = id.to_string();
        let summary = summary.to_string();

        self.store
            .execute_async(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO mods (platform, id, summary)
                    VALUES (?1, ?2, ?3)
                    ON CONFLICT(platform, id) DO UPDATE SET summary = excluded.summary
                    "#,
                    params![platform.as_str(), id, summary],
                )?;
                Ok(())
            })
            .await
    }

    /// Flag an existing translation record for re-translation. Set by
    /// external tooling when source drift is detected out of band.
    pub async fn mark_needs_update(&self, platform: Platform, id: &str) -> Result<()> {
        let id = id.to_string();

        self.store
            .execute_async(move |conn| {
                conn.execute(
                    "UPDATE translations SET needs_update = 1 WHERE platform = ?1 AND id = ?2",
                    params![platform.as_str(), id],
                )?;
                Ok(())
            })
            .await
    }
}

/// Filter a fetched page against the exclusion set and cap it at `batch_size`
fn collect_page(
    platform: Platform,
    batch_size: usize,
    exclude: &HashSet<String>,
    rows: impl Iterator<Item = rusqlite::Result<(String, String)>>,
) -> Result<Vec<WorkItem>> {
    let mut page = Vec::with_capacity(batch_size);

    for row in rows {
        let (id, summary) = row?;
        if exclude.contains(&id) {
            continue;
        }
        page.push(WorkItem::new(platform, id, summary));
        if page.len() == batch_size {
            break;
        }
    }

    Ok(page)
}

/// Upsert one translation record keyed by `(platform, id)`
fn upsert_translation(conn: &Connection, item: &WorkItem) -> Result<()> {
    let Some(translated) = &item.translated_text else {
        bail!(
            "Refusing to record untranslated item {}/{}",
            item.platform,
            item.id
        );
    };

    conn.execute(
        r#"
        INSERT INTO translations (platform, id, original, translated, translated_at, needs_update)
        VALUES (?1, ?2, ?3, ?4, ?5, 0)
        ON CONFLICT(platform, id) DO UPDATE SET
            original = excluded.original,
            translated = excluded.translated,
            translated_at = excluded.translated_at,
            needs_update = 0
        "#,
        params![
            item.platform.as_str(),
            item.id,
            item.original_text,
            translated,
            Utc::now().to_rfc3339(),
        ],
    )?;

    Ok(())
}
