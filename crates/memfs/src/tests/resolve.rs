use super::{new_fs, new_fs_with};
use crate::store::KeyValueStore;
use crate::*;

#[tokio::test]
async fn test_classify_lifecycle() -> Result<()> {
    let (fs, _) = new_fs();
    let path = "/memories/notes.md";

    assert_eq!(fs.classify(path).await?, PathKind::Absent);
    fs.create(path, "hello").await?;
    assert_eq!(fs.classify(path).await?, PathKind::File);
    fs.delete(path).await?;
    assert_eq!(fs.classify(path).await?, PathKind::Absent);
    Ok(())
}

#[tokio::test]
async fn test_directories_are_derived() -> Result<()> {
    let (fs, _) = new_fs();
    fs.create("/memories/projects/alpha/plan.md", "plan").await?;

    assert_eq!(fs.classify("/memories/projects").await?, PathKind::Directory);
    assert_eq!(fs.classify("/memories/projects/alpha/").await?, PathKind::Directory);
    assert_eq!(fs.classify("/memories/proj").await?, PathKind::Absent);

    fs.delete("/memories/projects/alpha/plan.md").await?;
    assert_eq!(fs.classify("/memories/projects").await?, PathKind::Absent);
    Ok(())
}

#[tokio::test]
async fn test_root_always_directory() -> Result<()> {
    let (fs, _) = new_fs();
    assert_eq!(fs.classify("/memories").await?, PathKind::Directory);
    assert_eq!(fs.list_children("/memories").await?, Vec::<Child>::new());
    Ok(())
}

#[tokio::test]
async fn test_list_children() -> Result<()> {
    let (fs, _) = new_fs();
    fs.create("/memories/b.md", "b").await?;
    fs.create("/memories/a.md", "a").await?;
    fs.create("/memories/dir/x.md", "x").await?;
    fs.create("/memories/dir/deeper/y.md", "y").await?;

    let children = fs.list_children("/memories").await?;
    let names: Vec<String> = children.iter().map(Child::display_name).collect();
    assert_eq!(names, vec!["a.md", "b.md", "dir/"]);

    let children = fs.list_children("/memories/dir").await?;
    assert_eq!(
        children,
        vec![
            Child {
                name: "deeper".to_string(),
                kind: PathKind::Directory
            },
            Child {
                name: "x.md".to_string(),
                kind: PathKind::File
            },
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_listing_with_small_scan_pages() -> Result<()> {
    let (fs, _) = new_fs_with(Config::default(), MemoryStore::new().with_page_size(1));
    for name in ["a", "b", "c"] {
        for leaf in ["1", "2", "3"] {
            fs.create(&format!("/memories/{name}/{leaf}.md"), leaf).await?;
        }
    }

    let names: Vec<String> = fs
        .list_children("/memories")
        .await?
        .iter()
        .map(Child::display_name)
        .collect();
    assert_eq!(names, vec!["a/", "b/", "c/"]);
    assert_eq!(fs.get_all_paths().await?.len(), 9);
    Ok(())
}

#[tokio::test]
async fn test_sibling_prefix_not_a_child() -> Result<()> {
    let (fs, _) = new_fs();
    fs.create("/memories/ab/x.md", "x").await?;

    assert_eq!(fs.classify("/memories/a").await?, PathKind::Absent);
    Ok(())
}

#[tokio::test]
async fn test_wildcard_characters_in_paths() -> Result<()> {
    let (fs, _) = new_fs();
    fs.create("/memories/a*/x.md", "star").await?;
    fs.create("/memories/ab/y.md", "plain").await?;

    let children = fs.list_children("/memories/a*").await?;
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].name, "x.md");
    Ok(())
}

#[tokio::test]
async fn test_invalid_paths() -> Result<()> {
    let (fs, _) = new_fs();
    assert!(matches!(
        fs.classify("/elsewhere/a").await,
        Err(Error::InvalidPath { .. })
    ));
    assert!(matches!(
        fs.create("/memories/a:b", "x").await,
        Err(Error::InvalidPath { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn test_tenants_are_isolated() -> Result<()> {
    let store = MemoryStore::new();
    let (alice, _) = new_fs_with(Config::default().with_tenant("alice"), store.clone());
    let (bob, _) = new_fs_with(Config::default().with_tenant("bob"), store.clone());
    let (untenanted, _) = new_fs_with(Config::default(), store.clone());

    alice.create("/memories/secret.md", "alice only").await?;

    assert_eq!(bob.classify("/memories/secret.md").await?, PathKind::Absent);
    assert_eq!(untenanted.get_all_paths().await?, Vec::<String>::new());
    assert_eq!(alice.get_all_paths().await?, vec!["/memories/secret.md"]);

    bob.clear_all().await?;
    assert!(store.exists("memory:alice:/memories/secret.md").await?);
    Ok(())
}

#[tokio::test]
async fn test_store_failure_propagates() -> Result<()> {
    let (fs, store) = new_fs();
    fs.create("/memories/a.md", "a").await?;

    store.set_offline(true);
    assert!(matches!(
        fs.view("/memories/a.md", None).await,
        Err(Error::StoreUnavailable(_))
    ));
    assert!(matches!(
        fs.list_children("/memories").await,
        Err(Error::StoreUnavailable(_))
    ));
    store.set_offline(false);
    assert_eq!(fs.classify("/memories/a.md").await?, PathKind::File);
    Ok(())
}

#[tokio::test]
async fn test_clone_does_not_own_store() -> Result<()> {
    let (fs, store) = new_fs();
    fs.create("/memories/a.md", "a").await?;

    let worker = fs.clone();
    assert_eq!(worker.ownership(), Ownership::Shared);
    worker.close().await?;
    assert!(!store.is_closed());
    assert_eq!(fs.classify("/memories/a.md").await?, PathKind::File);

    fs.close().await?;
    assert!(store.is_closed());
    Ok(())
}
