use anyhow::Result;

use memfs::FS;

/// One file path per line, sorted
pub async fn paths_command(fs: &FS) -> Result<String> {
    Ok(fs.get_all_paths().await?.join("\n"))
}

pub async fn tree_command(fs: &FS) -> Result<String> {
    let tree = fs.tree().await?;
    Ok(tree.trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use memfs::{Config, MemoryStore};

    #[tokio::test]
    async fn test_paths_and_tree() -> Result<()> {
        let fs = FS::new(MemoryStore::new(), Config::default())?;
        assert_eq!(paths_command(&fs).await?, "");
        assert_eq!(tree_command(&fs).await?, "/memories\n(empty)");

        fs.create("/memories/notes.md", "n").await?;
        fs.create("/memories/work/plan.md", "p").await?;
        assert_eq!(
            paths_command(&fs).await?,
            "/memories/notes.md\n/memories/work/plan.md"
        );
        assert_eq!(
            tree_command(&fs).await?,
            "/memories\n├── notes.md\n└─┬ work/\n  └── plan.md"
        );
        Ok(())
    }
}
