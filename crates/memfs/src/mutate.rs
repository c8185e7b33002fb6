use futures::{StreamExt, TryStreamExt, stream};

use crate::error::{Error, Result};
use crate::fs::FS;
use crate::path::PATH_SEPARATOR;
use crate::resolve::PathKind;
use diagnostics::{log_info, log_warn};

/// Existence checks in flight at once during a rename pre-flight
const PREFLIGHT_CONCURRENCY: usize = 16;

impl FS {
    /// Delete a file, or a directory together with everything below it
    pub async fn delete(&self, path: &str) -> Result<String> {
        let normalized = self.codec().normalize(path)?;
        if self.codec().is_root(&normalized) {
            return Err(Error::protected_path(&normalized));
        }

        match self.classify_normalized(&normalized).await? {
            PathKind::File => {
                let key = self.codec().key_for(&normalized);
                _ = self.store().delete(&[key]).await?;
                log_info!("Deleted file {path}", path: normalized.as_str());
            }
            PathKind::Directory => {
                let keys = self.descendant_keys(&normalized).await?;
                let removed = self.store().delete(&keys).await?;
                log_info!(
                    "Deleted directory {path} with {removed} files",
                    path: normalized.as_str(),
                    removed: removed
                );
            }
            PathKind::Absent => return Err(Error::not_found(&normalized)),
        }
        Ok(format!("Successfully deleted {normalized}"))
    }

    /// Move a file or a whole directory to a new path.
    ///
    /// Destination collisions are detected before anything is written. The
    /// copy-then-delete steps that follow are not atomic: an interruption
    /// leaves both copies of a file behind, never neither.
    pub async fn rename(&self, old_path: &str, new_path: &str) -> Result<String> {
        let old = self.codec().normalize(old_path)?;
        let new = self.codec().normalize(new_path)?;
        for path in [&old, &new] {
            if self.codec().is_root(path) {
                return Err(Error::protected_path(path));
            }
        }
        if old == new {
            return Err(Error::conflict(&new, "source and destination are the same"));
        }

        let old_key = self.codec().key_for(&old);
        match self.store().get(&old_key).await? {
            Some(content) => self.move_file(&old, &new, &content).await?,
            None => self.move_tree(&old, &new).await?,
        }
        Ok(format!("Successfully renamed {old} to {new}"))
    }

    /// Destination checks shared by both rename branches.
    ///
    /// A directory move may merge into an existing directory; per-file
    /// collisions are caught by the pre-flight pass instead.
    async fn check_destination(&self, new: &str, merge_into_directory: bool) -> Result<()> {
        match self.classify_normalized(new).await? {
            PathKind::File => return Err(Error::conflict(new, "destination already exists")),
            PathKind::Directory if !merge_into_directory => {
                return Err(Error::conflict(new, "a directory exists at the destination"));
            }
            _ => {}
        }
        if let Some(ancestor) = self.file_ancestor(new).await? {
            return Err(Error::conflict(new, format!("{ancestor} is a file")));
        }
        Ok(())
    }

    async fn move_file(&self, old: &str, new: &str, content: &str) -> Result<()> {
        self.check_destination(new, false).await?;

        let old_key = self.codec().key_for(old);
        let new_key = self.codec().key_for(new);
        self.write_key(&new_key, content).await?;
        if let Err(err) = self.store().delete(&[old_key]).await {
            log_warn!(
                "Copied {old} to {new} but could not remove the source",
                old: old,
                new: new
            );
            return Err(err);
        }
        log_info!("Renamed file {old} to {new}", old: old, new: new);
        Ok(())
    }

    async fn move_tree(&self, old: &str, new: &str) -> Result<()> {
        let sources = self.descendant_keys(old).await?;
        if sources.is_empty() {
            return Err(Error::not_found(old));
        }
        let inside = new
            .strip_prefix(old)
            .is_some_and(|rest| rest.starts_with(PATH_SEPARATOR));
        if inside {
            return Err(Error::conflict(new, "cannot move a directory inside itself"));
        }
        self.check_destination(new, true).await?;

        let old_key = self.codec().key_for(old);
        let new_key = self.codec().key_for(new);
        let moves: Vec<(String, String)> = sources
            .into_iter()
            .map(|source| {
                let dest = format!("{new_key}{}", &source[old_key.len()..]);
                (source, dest)
            })
            .collect();

        // Pre-flight: every destination must be free before anything moves
        let checks: Vec<(&String, bool)> = stream::iter(moves.iter())
            .map(|(_, dest)| async move { Ok::<_, Error>((dest, self.store().exists(dest).await?)) })
            .buffered(PREFLIGHT_CONCURRENCY)
            .try_collect()
            .await?;
        if let Some((dest, _)) = checks.iter().find(|(_, exists)| *exists) {
            return Err(Error::conflict(
                self.codec().decode(dest),
                "destination already exists",
            ));
        }

        let total = moves.len();
        for (done, (source, dest)) in moves.iter().enumerate() {
            if let Err(err) = self.move_key(source, dest).await {
                log_warn!(
                    "Rename of {old} to {new} interrupted after {done} of {total} files",
                    old: old,
                    new: new,
                    done: done,
                    total: total
                );
                return Err(err);
            }
        }
        log_info!(
            "Renamed directory {old} to {new} ({total} files)",
            old: old,
            new: new,
            total: total
        );
        Ok(())
    }

    async fn move_key(&self, source: &str, dest: &str) -> Result<()> {
        let Some(content) = self.store().get(source).await? else {
            log_warn!("{key} vanished during rename, skipping", key: source);
            return Ok(());
        };
        self.write_key(dest, &content).await?;
        _ = self.store().delete(&[source.to_string()]).await?;
        Ok(())
    }
}
