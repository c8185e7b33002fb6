use anyhow::Result;

use diagnostics::log_info;
use memfs::FS;

pub async fn delete_command(fs: &FS, path: &str) -> Result<String> {
    Ok(fs.delete(path).await?)
}

pub async fn rename_command(fs: &FS, old_path: &str, new_path: &str) -> Result<String> {
    Ok(fs.rename(old_path, new_path).await?)
}

/// Remove every file in the namespace
pub async fn clear_command(fs: &FS) -> Result<String> {
    let count = fs.get_all_paths().await?.len();
    fs.clear_all().await?;
    log_info!("Cleared {count} files", count: count);
    Ok(format!("Removed {count} files under {}", fs.root_path()))
}
