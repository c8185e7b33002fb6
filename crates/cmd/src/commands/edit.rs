use anyhow::Result;

use diagnostics::log_debug;
use memfs::FS;

/// Range given as optional `--start`/`--end`; either one enables ranging
pub fn view_range(start: Option<i64>, end: Option<i64>) -> Option<(i64, i64)> {
    match (start, end) {
        (None, None) => None,
        (start, end) => Some((start.unwrap_or(1), end.unwrap_or(-1))),
    }
}

pub async fn view_command(fs: &FS, path: &str, range: Option<(i64, i64)>) -> Result<String> {
    log_debug!("Viewing {path}", path: path);
    Ok(fs.view(path, range).await?)
}

pub async fn create_command(fs: &FS, path: &str, text: &str) -> Result<String> {
    Ok(fs.create(path, text).await?)
}

pub async fn str_replace_command(
    fs: &FS,
    path: &str,
    old_str: &str,
    new_str: &str,
) -> Result<String> {
    Ok(fs.str_replace(path, old_str, new_str).await?)
}

pub async fn insert_command(fs: &FS, path: &str, line: i64, text: &str) -> Result<String> {
    Ok(fs.insert(path, line, text).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use memfs::{Config, MemoryStore};

    #[test]
    fn test_view_range_flags() {
        assert_eq!(view_range(None, None), None);
        assert_eq!(view_range(Some(3), None), Some((3, -1)));
        assert_eq!(view_range(None, Some(2)), Some((1, 2)));
    }

    #[tokio::test]
    async fn test_edit_commands() -> Result<()> {
        let fs = FS::new(MemoryStore::new(), Config::default())?;
        create_command(&fs, "/memories/todo.md", "buy milk\ncall bob").await?;
        str_replace_command(&fs, "/memories/todo.md", "milk", "bread").await?;
        insert_command(&fs, "/memories/todo.md", 0, "# Todo").await?;

        let output = view_command(&fs, "/memories/todo.md", view_range(None, Some(2))).await?;
        assert_eq!(output, "   1: # Todo\n   2: buy bread");
        Ok(())
    }

    #[tokio::test]
    async fn test_core_error_message_preserved() -> Result<()> {
        let fs = FS::new(MemoryStore::new(), Config::default())?;
        let err = view_command(&fs, "/memories/nothing.md", None)
            .await
            .expect_err("missing file");
        assert_eq!(err.to_string(), "The path /memories/nothing.md does not exist");
        Ok(())
    }
}
