mod resolve;

use crate::{Config, FS, MemoryStore};

/// Filesystem over a fresh store, plus a handle on the same store for inspection
pub(crate) fn new_fs() -> (FS, MemoryStore) {
    new_fs_with(Config::default(), MemoryStore::new())
}

pub(crate) fn new_fs_with(config: Config, store: MemoryStore) -> (FS, MemoryStore) {
    let fs = FS::new(store.clone(), config).expect("valid config");
    (fs, store)
}
