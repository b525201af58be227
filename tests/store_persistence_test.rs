//! Link records and content survive a restart

mod common;

use anyhow::Result;
use common::*;
use kodegen_tools_interlink::{
    ContentKey, InterlinkConfig, Interlinker, LinkFilter, LinkStatus, LinkStore,
    MemoryContentRepository,
};
use tempfile::TempDir;

#[tokio::test]
async fn test_records_survive_reopen() -> Result<()> {
    let dir = TempDir::new()?;
    let db_path = dir.path().join("links.sqlite");
    let content_path = dir.path().join("content.json");

    MemoryContentRepository::with_items(vec![redis_basics(), eviction_policies()])
        .save_json(&content_path)
        .await?;

    {
        let engine = Interlinker::new(
            MemoryContentRepository::load_json(&content_path).await?,
            LinkStore::open(&db_path).await?,
            InterlinkConfig::default(),
        );
        let summary = engine.auto_link_all(None).await?;
        assert_eq!(summary.total_inserted, 1);
        engine.repo().save_json(&content_path).await?;
        engine.store().close().await;
    }

    let engine = Interlinker::new(
        MemoryContentRepository::load_json(&content_path).await?,
        LinkStore::open(&db_path).await?,
        InterlinkConfig::default(),
    );
    let active = engine
        .list_links(&LinkFilter::default().with_status(LinkStatus::Active))
        .await?;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].source, ContentKey::article(1));
    assert!(
        body_of(engine.repo(), ContentKey::article(1))
            .await?
            .contains(EVICTION_URL)
    );

    // Nothing new on the second run
    assert_eq!(engine.auto_link_all(None).await?.total_inserted, 0);
    Ok(())
}

#[tokio::test]
async fn test_rejections_persist() -> Result<()> {
    let dir = TempDir::new()?;
    let db_path = dir.path().join("links.sqlite");
    let items = vec![redis_basics(), eviction_policies()];

    {
        let engine = Interlinker::new(
            MemoryContentRepository::with_items(items.clone()),
            LinkStore::open(&db_path).await?,
            InterlinkConfig::default(),
        );
        engine.scan(ContentKey::article(1)).await?;
        let suggestion = engine.list_links(&LinkFilter::default()).await?.remove(0);
        engine.reject_link(suggestion.id).await?;
        engine.store().close().await;
    }

    let engine = Interlinker::new(
        MemoryContentRepository::with_items(items),
        LinkStore::open(&db_path).await?,
        InterlinkConfig::default(),
    );
    assert_eq!(engine.auto_link(ContentKey::article(1)).await?.inserted, 0);
    assert_eq!(
        engine.store().count_by_status().await?.get(&LinkStatus::Rejected),
        Some(&1)
    );
    Ok(())
}
