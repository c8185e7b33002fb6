use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::path::PathCodec;
use crate::store::{self, KeyValueStore};
use diagnostics::{log_debug, log_info};

/// Who is responsible for closing the store connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// Constructed for this filesystem; closed by [`FS::close`]
    Owned,
    /// Injected by the caller, who keeps it open
    Shared,
}

/// Hierarchical namespace emulated on a flat key-value store.
///
/// There is no in-process state beyond configuration: directories are
/// derived from key scans on every call, and multi-step operations are
/// plain read-modify-write sequences (last writer wins).
///
/// Clones share the store but never own it: only the original handle of an
/// owned store closes it.
pub struct FS {
    store: Arc<dyn KeyValueStore>,
    ownership: Ownership,
    codec: PathCodec,
    ttl_seconds: Option<u64>,
}

impl FS {
    /// Take ownership of `store`
    pub fn new<S: KeyValueStore + 'static>(store: S, config: Config) -> Result<Self> {
        Self::build(Arc::new(store), Ownership::Owned, config)
    }

    /// Use a store owned elsewhere; [`FS::close`] leaves it open
    pub fn with_shared_store(store: Arc<dyn KeyValueStore>, config: Config) -> Result<Self> {
        Self::build(store, Ownership::Shared, config)
    }

    fn build(store: Arc<dyn KeyValueStore>, ownership: Ownership, config: Config) -> Result<Self> {
        config.validate()?;
        let owned = ownership == Ownership::Owned;
        log_debug!(
            "Opened namespace {root}, owned store: {owned}",
            root: config.root.as_str(),
            owned: owned
        );
        Ok(Self {
            store,
            ownership,
            codec: PathCodec::new(&config),
            ttl_seconds: config.ttl_seconds,
        })
    }

    pub fn codec(&self) -> &PathCodec {
        &self.codec
    }

    pub fn root_path(&self) -> &str {
        self.codec.root()
    }

    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    pub fn ttl_seconds(&self) -> Option<u64> {
        self.ttl_seconds
    }

    pub(crate) fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    /// Write `content` at `key`, applying the configured TTL
    pub(crate) async fn write_key(&self, key: &str, content: &str) -> Result<()> {
        match self.ttl_seconds {
            Some(ttl) => self.store.set_with_expiry(key, content, ttl).await,
            None => self.store.set(key, content).await,
        }
    }

    /// Read content for display, sliding the TTL window forward
    pub(crate) async fn read_key_for_view(&self, key: &str) -> Result<Option<String>> {
        let content = self.store.get(key).await?;
        if let (Some(_), Some(ttl)) = (&content, self.ttl_seconds) {
            self.store.refresh_expiry(key, ttl).await?;
        }
        Ok(content)
    }

    /// Remove every key in this tenant's namespace
    pub async fn clear_all(&self) -> Result<()> {
        let keys: Vec<String> = store::scan_all(self.store(), &self.codec.namespace_pattern())
            .await?
            .into_iter()
            .collect();
        if keys.is_empty() {
            return Ok(());
        }
        let removed = self.store.delete(&keys).await?;
        log_info!(
            "Cleared namespace {namespace}: {removed} keys",
            namespace: self.codec.namespace(),
            removed: removed
        );
        Ok(())
    }

    /// Every file path in the namespace, sorted
    pub async fn get_all_paths(&self) -> Result<Vec<String>> {
        let keys = store::scan_all(self.store(), &self.codec.namespace_pattern()).await?;
        let mut paths: Vec<String> = keys
            .iter()
            .map(|key| self.codec.decode(key).to_string())
            .collect();
        paths.sort();
        Ok(paths)
    }

    /// Release the store if this filesystem owns it
    pub async fn close(self) -> Result<()> {
        match self.ownership {
            Ownership::Owned => {
                log_debug!("Closing owned store");
                self.store.close().await
            }
            Ownership::Shared => Ok(()),
        }
    }
}

impl Clone for FS {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            ownership: Ownership::Shared,
            codec: self.codec.clone(),
            ttl_seconds: self.ttl_seconds,
        }
    }
}

impl std::fmt::Debug for FS {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FS")
            .field("codec", &self.codec)
            .field("ownership", &self.ownership)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish_non_exhaustive()
    }
}
