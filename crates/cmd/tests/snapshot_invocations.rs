use std::time::Duration;

use anyhow::Result;
use tempfile::tempdir;

use cmd::commands::{create_command, rename_command, tree_command, view_command};
use cmd::common::{ConfigOverrides, MemfsContext};

/// Separate invocations sharing one snapshot file behave like one session
#[tokio::test]
async fn test_state_survives_between_invocations() -> Result<()> {
    let tmp = tempdir()?;
    let snapshot = tmp.path().join("store.json");
    let config = ConfigOverrides {
        tenant: Some("agent-1".to_string()),
        ..ConfigOverrides::default()
    }
    .resolve()?;
    let ctx = MemfsContext::new(config, Some(snapshot.clone()));

    let (fs, store) = ctx.open()?;
    create_command(&fs, "/memories/draft.md", "line one\nline two").await?;
    ctx.finish(fs, &store).await?;
    assert!(snapshot.exists());

    let (fs, store) = ctx.open()?;
    rename_command(&fs, "/memories/draft.md", "/memories/done/final.md").await?;
    ctx.finish(fs, &store).await?;

    let (fs, store) = ctx.open()?;
    assert_eq!(
        view_command(&fs, "/memories/done/final.md", Some((2, -1))).await?,
        "   2: line two"
    );
    assert_eq!(
        tree_command(&fs).await?,
        "/memories\n└─┬ done/\n  └── final.md"
    );
    ctx.finish(fs, &store).await?;

    let saved = std::fs::read_to_string(&snapshot)?;
    assert!(saved.contains("memory:agent-1:/memories/done/final.md"));
    Ok(())
}

#[tokio::test]
async fn test_failed_command_still_saves() -> Result<()> {
    let tmp = tempdir()?;
    let snapshot = tmp.path().join("store.json");
    let ctx = MemfsContext::new(ConfigOverrides::default().resolve()?, Some(snapshot.clone()));

    let (fs, store) = ctx.open()?;
    create_command(&fs, "/memories/a.md", "a").await?;
    let result = create_command(&fs, "/memories/a.md", "again").await;
    ctx.finish(fs, &store).await?;

    assert!(result.is_err());
    let (fs, store) = ctx.open()?;
    assert_eq!(view_command(&fs, "/memories/a.md", None).await?, "   1: a");
    ctx.finish(fs, &store).await?;
    Ok(())
}

fn ttl_context(snapshot: std::path::PathBuf, ttl: u64) -> Result<MemfsContext> {
    let config = ConfigOverrides {
        ttl_seconds: Some(ttl),
        ..ConfigOverrides::default()
    }
    .resolve()?;
    Ok(MemfsContext::new(config, Some(snapshot)))
}

#[tokio::test(start_paused = true)]
async fn test_expiry_survives_between_invocations() -> Result<()> {
    let tmp = tempdir()?;
    let ctx = ttl_context(tmp.path().join("store.json"), 5)?;

    let (fs, store) = ctx.open()?;
    create_command(&fs, "/memories/ephemeral.md", "ephemeral").await?;
    ctx.finish(fs, &store).await?;

    let (fs, store) = ctx.open()?;
    let ttl = store.ttl("memory:/memories/ephemeral.md").await;
    assert!(ttl.is_some_and(|ttl| ttl <= Duration::from_secs(5)));

    tokio::time::advance(Duration::from_secs(3600)).await;
    assert!(view_command(&fs, "/memories/ephemeral.md", None).await.is_err());
    assert_eq!(store.ttl("memory:/memories/ephemeral.md").await, None);
    ctx.finish(fs, &store).await?;

    let (fs, store) = ctx.open()?;
    assert!(fs.get_all_paths().await?.is_empty());
    ctx.finish(fs, &store).await?;
    Ok(())
}

#[tokio::test]
async fn test_expired_snapshot_entries_are_not_revived() -> Result<()> {
    let tmp = tempdir()?;
    let snapshot = tmp.path().join("store.json");
    std::fs::write(
        &snapshot,
        r#"{"memory:/memories/old.md":{"content":"old","expires_at_ms":1000},
            "memory:/memories/kept.md":{"content":"kept"}}"#,
    )?;
    let ctx = ttl_context(snapshot, 60)?;

    let (fs, store) = ctx.open()?;
    assert!(view_command(&fs, "/memories/old.md", None).await.is_err());
    assert_eq!(view_command(&fs, "/memories/kept.md", None).await?, "   1: kept");
    ctx.finish(fs, &store).await?;
    Ok(())
}
