use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use diagnostics::{log_debug, log_info};
use memfs::{Config, FS, MemoryStore, SnapshotEntry};

/// Configuration layers supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub prefix: Option<String>,
    pub tenant: Option<String>,
    pub root: Option<String>,
    pub ttl_seconds: Option<u64>,
}

impl ConfigOverrides {
    /// Defaults, then the YAML file, then `MEMFS_*` variables, then flags
    pub fn resolve(&self) -> Result<Config> {
        let base = match &self.config_file {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        let mut config = base.with_env()?;

        if let Some(prefix) = &self.prefix {
            config.key_prefix = prefix.clone();
        }
        if let Some(tenant) = &self.tenant {
            config.tenant = Some(tenant.clone());
        }
        if let Some(root) = &self.root {
            config.root = root.clone();
        }
        if let Some(ttl) = self.ttl_seconds {
            config.ttl_seconds = Some(ttl);
        }
        config.validate()?;
        Ok(config)
    }
}

/// What every subcommand needs to reach the namespace
#[derive(Debug, Clone)]
pub struct MemfsContext {
    config: Config,
    snapshot: Option<PathBuf>,
}

impl MemfsContext {
    pub fn new(config: Config, snapshot: Option<PathBuf>) -> Self {
        Self { config, snapshot }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Store seeded from the snapshot file, or an empty one
    pub fn open_store(&self) -> Result<MemoryStore> {
        match &self.snapshot {
            Some(path) if path.exists() => load_snapshot(path),
            _ => Ok(MemoryStore::new()),
        }
    }

    /// Write the store back to the snapshot file, if one is configured
    pub async fn save_store(&self, store: &MemoryStore) -> Result<()> {
        match &self.snapshot {
            Some(path) => save_snapshot(path, store).await,
            None => Ok(()),
        }
    }

    /// Filesystem owning a store seeded from the snapshot, plus a handle on
    /// that store for [`MemfsContext::finish`]
    pub fn open(&self) -> Result<(FS, MemoryStore)> {
        let store = self.open_store()?;
        let fs = FS::new(store.clone(), self.config.clone())?;
        Ok((fs, store))
    }

    /// Close the filesystem and persist the store.
    ///
    /// Called whether or not the command succeeded: a partially applied
    /// rename is part of the store's state.
    pub async fn finish(&self, fs: FS, store: &MemoryStore) -> Result<()> {
        fs.close().await?;
        self.save_store(store).await
    }
}

pub fn load_snapshot(path: &Path) -> Result<MemoryStore> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    let entries: HashMap<String, SnapshotEntry> = serde_json::from_str(&text)
        .with_context(|| format!("snapshot {} is not a JSON object of entries", path.display()))?;
    log_debug!(
        "Loaded {count} keys from {path}",
        count: entries.len(),
        path: path.display().to_string()
    );
    Ok(MemoryStore::from_snapshot(entries))
}

pub async fn save_snapshot(path: &Path, store: &MemoryStore) -> Result<()> {
    let entries: BTreeMap<String, SnapshotEntry> = store.snapshot().await.into_iter().collect();
    let text = serde_json::to_string_pretty(&entries)?;
    std::fs::write(path, text)
        .with_context(|| format!("failed to write snapshot {}", path.display()))?;
    log_info!(
        "Saved {count} keys to {path}",
        count: entries.len(),
        path: path.display().to_string()
    );
    Ok(())
}

/// Body text given inline or read from a host file
pub fn read_text(text: Option<String>, from_file: Option<&Path>) -> Result<String> {
    match (text, from_file) {
        (_, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        (Some(text), None) => Ok(text),
        (None, None) => Ok(String::new()),
    }
}
