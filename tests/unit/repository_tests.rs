/*!
 * Tests for the store repository: change-set query and persistence writer
 */

use std::collections::HashSet;

use modtrans::Repository;
use modtrans::translation::core::{Platform, WorkItem};

use crate::common::seeded_repository;

fn translated(platform: Platform, id: &str, original: &str, translated: &str) -> WorkItem {
    let mut item = WorkItem::new(platform, id, original);
    item.translated_text = Some(translated.to_string());
    item
}

/// Test that listings without a translation record are selected in id order
#[tokio::test]
async fn test_next_page_withUntranslatedListings_shouldReturnThemInIdOrder() {
    let repository = seeded_repository(
        Platform::Modrinth,
        &[("cc", "Third mod"), ("aa", "First mod"), ("bb", "Second mod")],
    )
    .await
    .expect("seed");

    let page = repository
        .next_page(Platform::Modrinth, 10, &HashSet::new())
        .await
        .expect("page");

    let ids: Vec<_> = page.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["aa", "bb", "cc"]);
    assert!(page.iter().all(|i| i.translated_text.is_none()));
}

/// Test that pages respect the batch size and advance as records are written
#[tokio::test]
async fn test_next_page_withSmallBatchSize_shouldAdvanceAsRecordsAreWritten() {
    let listings: Vec<(String, String)> = (1..=5)
        .map(|i| (format!("id-{}", i), format!("summary {}", i)))
        .collect();
    let refs: Vec<(&str, &str)> = listings
        .iter()
        .map(|(id, s)| (id.as_str(), s.as_str()))
        .collect();
    let repository = seeded_repository(Platform::Curseforge, &refs).await.expect("seed");

    let mut seen = Vec::new();
    let mut pages = Vec::new();
    loop {
        let page = repository
            .next_page(Platform::Curseforge, 2, &HashSet::new())
            .await
            .expect("page");
        if page.is_empty() {
            break;
        }
        pages.push(page.len());
        for item in page {
            seen.push(item.id.clone());
            let done = translated(item.platform, &item.id, &item.original_text, "译文");
            repository.record(&done).await.expect("record");
        }
    }

    assert_eq!(pages, vec![2, 2, 1]);
    assert_eq!(seen.len(), 5);
}

/// Test that empty summaries are never selected
#[tokio::test]
async fn test_next_page_withEmptySummary_shouldSkipListing() {
    let repository = seeded_repository(
        Platform::Modrinth,
        &[("empty", ""), ("real", "An actual summary")],
    )
    .await
    .expect("seed");

    let page = repository
        .next_page(Platform::Modrinth, 10, &HashSet::new())
        .await
        .expect("page");

    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, "real");
}

/// Test that excluded identities are filtered without hiding remaining work
#[tokio::test]
async fn test_next_page_withExclusions_shouldStillSurfaceRemainingWork() {
    let repository = seeded_repository(
        Platform::Modrinth,
        &[("a", "one"), ("b", "two"), ("c", "three")],
    )
    .await
    .expect("seed");

    // Exclude the first two ids; with batch_size 2 the page must still
    // reach past them to "c".
    let exclude: HashSet<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
    let page = repository
        .next_page(Platform::Modrinth, 2, &exclude)
        .await
        .expect("page");

    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, "c");
}

/// Test that an up-to-date record keeps its listing out of both passes
#[tokio::test]
async fn test_next_page_withCurrentTranslation_shouldReturnNothing() {
    let repository = seeded_repository(Platform::Curseforge, &[("m1", "hello")])
        .await
        .expect("seed");

    let done = translated(Platform::Curseforge, "m1", "hello", "你好");
    repository.record(&done).await.expect("record");

    let page = repository
        .next_page(Platform::Curseforge, 10, &HashSet::new())
        .await
        .expect("page");
    assert!(page.is_empty());

    let (untranslated, stale) = repository
        .count_outstanding(Platform::Curseforge)
        .await
        .expect("count");
    assert_eq!((untranslated, stale), (0, 0));
}

/// Test that source drift makes a translated listing stale exactly once
#[tokio::test]
async fn test_next_page_withDriftedSource_shouldReselectUntilRetranslated() {
    let repository = seeded_repository(Platform::Modrinth, &[("m1", "old text")])
        .await
        .expect("seed");

    let done = translated(Platform::Modrinth, "m1", "old text", "旧译文");
    repository.record(&done).await.expect("record");

    // Drift the source
    repository
        .upsert_source(Platform::Modrinth, "m1", "new text")
        .await
        .expect("drift");

    let page = repository
        .next_page(Platform::Modrinth, 10, &HashSet::new())
        .await
        .expect("page");
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].original_text, "new text");

    // Re-translate against the new source
    let redone = translated(Platform::Modrinth, "m1", "new text", "新译文");
    repository.record(&redone).await.expect("re-record");

    let page = repository
        .next_page(Platform::Modrinth, 10, &HashSet::new())
        .await
        .expect("page");
    assert!(page.is_empty());

    let record = repository
        .get_translation(Platform::Modrinth, "m1")
        .await
        .expect("read")
        .expect("record present");
    assert_eq!(record.original, "new text");
    assert_eq!(record.translated, "新译文");
}

/// Test that the external update flag forces re-selection and is cleared
#[tokio::test]
async fn test_mark_needs_update_shouldForceReselectionUntilRecorded() {
    let repository = seeded_repository(Platform::Curseforge, &[("m1", "text")])
        .await
        .expect("seed");

    let done = translated(Platform::Curseforge, "m1", "text", "文本");
    repository.record(&done).await.expect("record");
    repository
        .mark_needs_update(Platform::Curseforge, "m1")
        .await
        .expect("flag");

    let page = repository
        .next_page(Platform::Curseforge, 10, &HashSet::new())
        .await
        .expect("page");
    assert_eq!(page.len(), 1);

    // Recording clears the flag
    repository.record(&done).await.expect("re-record");
    let record = repository
        .get_translation(Platform::Curseforge, "m1")
        .await
        .expect("read")
        .expect("record present");
    assert!(!record.needs_update);

    let page = repository
        .next_page(Platform::Curseforge, 10, &HashSet::new())
        .await
        .expect("page");
    assert!(page.is_empty());
}

/// Test that the untranslated pass drains before the stale pass starts
#[tokio::test]
async fn test_next_page_withMixedBacklog_shouldPreferUntranslated() {
    let repository = seeded_repository(Platform::Modrinth, &[("new", "fresh"), ("old", "v1")])
        .await
        .expect("seed");

    let done = translated(Platform::Modrinth, "old", "v1", "旧");
    repository.record(&done).await.expect("record");
    repository
        .upsert_source(Platform::Modrinth, "old", "v2")
        .await
        .expect("drift");

    // "new" is untranslated, "old" is stale; the first page holds only "new".
    let page = repository
        .next_page(Platform::Modrinth, 10, &HashSet::new())
        .await
        .expect("page");
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, "new");

    let (untranslated, stale) = repository
        .count_outstanding(Platform::Modrinth)
        .await
        .expect("count");
    assert_eq!((untranslated, stale), (1, 1));
}

/// Test that platforms are isolated key spaces
#[tokio::test]
async fn test_next_page_withTwoPlatforms_shouldNotLeakAcross() {
    let repository = Repository::new_in_memory().expect("store");
    repository
        .upsert_source(Platform::Curseforge, "42", "cf summary")
        .await
        .expect("seed cf");
    repository
        .upsert_source(Platform::Modrinth, "42", "mr summary")
        .await
        .expect("seed mr");

    let done = translated(Platform::Curseforge, "42", "cf summary", "译");
    repository.record(&done).await.expect("record");

    let cf_page = repository
        .next_page(Platform::Curseforge, 10, &HashSet::new())
        .await
        .expect("cf page");
    assert!(cf_page.is_empty());

    let mr_page = repository
        .next_page(Platform::Modrinth, 10, &HashSet::new())
        .await
        .expect("mr page");
    assert_eq!(mr_page.len(), 1);
    assert_eq!(mr_page[0].original_text, "mr summary");
}

/// Test that recording is an idempotent upsert keyed by identity
#[tokio::test]
async fn test_record_withRepeatedWrites_shouldKeepOneRecordPerIdentity() {
    let repository = seeded_repository(Platform::Modrinth, &[("m1", "text")])
        .await
        .expect("seed");

    let first = translated(Platform::Modrinth, "m1", "text", "第一");
    repository.record(&first).await.expect("first write");
    let second = translated(Platform::Modrinth, "m1", "text", "第二");
    repository.record(&second).await.expect("second write");

    let record = repository
        .get_translation(Platform::Modrinth, "m1")
        .await
        .expect("read")
        .expect("record present");
    assert_eq!(record.translated, "第二");

    // Still exactly one outstanding-free listing
    let page = repository
        .next_page(Platform::Modrinth, 10, &HashSet::new())
        .await
        .expect("page");
    assert!(page.is_empty());
}

/// Test that recording an item with no translated text is rejected
#[tokio::test]
async fn test_record_withUntranslatedItem_shouldFail() {
    let repository = seeded_repository(Platform::Modrinth, &[("m1", "text")])
        .await
        .expect("seed");

    let item = WorkItem::new(Platform::Modrinth, "m1", "text");
    assert!(repository.record(&item).await.is_err());
    assert!(
        repository
            .get_translation(Platform::Modrinth, "m1")
            .await
            .expect("read")
            .is_none()
    );
}

/// Test batch recording in one transaction
#[tokio::test]
async fn test_record_batch_withSeveralItems_shouldWriteAll() {
    let repository = seeded_repository(
        Platform::Curseforge,
        &[("a", "one"), ("b", "two"), ("c", "three")],
    )
    .await
    .expect("seed");

    let items = vec![
        translated(Platform::Curseforge, "a", "one", "一"),
        translated(Platform::Curseforge, "b", "two", "二"),
        translated(Platform::Curseforge, "c", "three", "三"),
    ];
    let written = repository.record_batch(&items).await.expect("batch write");
    assert_eq!(written, 3);

    let (untranslated, stale) = repository
        .count_outstanding(Platform::Curseforge)
        .await
        .expect("count");
    assert_eq!((untranslated, stale), (0, 0));
}
