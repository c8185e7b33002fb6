use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeSet;

/// One page of a cursor-driven key scan
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanPage {
    /// Cursor for the next call; `0` when the iteration is complete
    pub cursor: u64,
    pub keys: Vec<String>,
}

/// Flat key-value store the namespace is emulated on.
///
/// Every primitive may fail with [`crate::Error::StoreUnavailable`], which
/// callers propagate unchanged. Implementations are not expected to retry.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    async fn set_with_expiry(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()>;

    async fn exists(&self, key: &str) -> Result<bool>;

    /// Delete all of `keys`, returning how many existed
    async fn delete(&self, keys: &[String]) -> Result<usize>;

    /// Return a page of keys matching a glob `pattern`.
    ///
    /// A scan starts with cursor `0` and ends when the returned cursor is `0`.
    /// Pages may repeat keys; `count` is a hint, not a limit.
    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> Result<ScanPage>;

    async fn refresh_expiry(&self, key: &str, ttl_seconds: u64) -> Result<()>;

    /// Release the connection. Only called by the owner of the store.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Page size hint used for every scan issued by the namespace
pub const SCAN_COUNT: usize = 100;

/// Drive a scan to completion, deduplicating and ordering the keys
pub async fn scan_all(store: &dyn KeyValueStore, pattern: &str) -> Result<BTreeSet<String>> {
    let mut keys = BTreeSet::new();
    let mut cursor = 0;
    let mut pages = 0usize;
    loop {
        let page = store.scan(cursor, pattern, SCAN_COUNT).await?;
        pages += 1;
        keys.extend(page.keys);
        if page.cursor == 0 {
            break;
        }
        cursor = page.cursor;
    }
    diagnostics::log_debug!(
        "Scanned {pattern}: {count} keys in {pages} pages",
        pattern: pattern,
        count: keys.len(),
        pages: pages
    );
    Ok(keys)
}
