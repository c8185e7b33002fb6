use std::collections::BTreeMap;

use crate::error::Result;
use crate::fs::FS;
use crate::path::PATH_SEPARATOR;
use crate::store;
use diagnostics::log_debug;

/// What a path denotes in the namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// A key exists at exactly this path
    File,
    /// No key at this path, but at least one key below it
    Directory,
    Absent,
}

impl PathKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PathKind::File => "file",
            PathKind::Directory => "directory",
            PathKind::Absent => "absent",
        }
    }
}

/// Immediate child of a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Child {
    pub name: String,
    pub kind: PathKind,
}

impl Child {
    /// Name as shown in listings: directories carry a trailing separator
    pub fn display_name(&self) -> String {
        match self.kind {
            PathKind::Directory => format!("{}{PATH_SEPARATOR}", self.name),
            _ => self.name.clone(),
        }
    }
}

impl FS {
    /// Classify an already-normalized path
    pub(crate) async fn classify_normalized(&self, normalized: &str) -> Result<PathKind> {
        let key = self.codec().key_for(normalized);
        let kind = if self.store().exists(&key).await? {
            PathKind::File
        } else if self.codec().is_root(normalized) || self.has_descendants(normalized).await? {
            PathKind::Directory
        } else {
            PathKind::Absent
        };
        log_debug!("Classified {path} as {kind}", path: normalized, kind: kind.as_str());
        Ok(kind)
    }

    pub async fn classify(&self, path: &str) -> Result<PathKind> {
        let normalized = self.codec().normalize(path)?;
        self.classify_normalized(&normalized).await
    }

    async fn has_descendants(&self, normalized: &str) -> Result<bool> {
        let pattern = self.codec().descendants_pattern(normalized);
        let mut cursor = 0;
        loop {
            let page = self.store().scan(cursor, &pattern, store::SCAN_COUNT).await?;
            if !page.keys.is_empty() {
                return Ok(true);
            }
            if page.cursor == 0 {
                return Ok(false);
            }
            cursor = page.cursor;
        }
    }

    /// First ancestor of `normalized` (below the root) that is stored as a file
    pub(crate) async fn file_ancestor(&self, normalized: &str) -> Result<Option<String>> {
        let root = self.codec().root();
        let mut ancestor = normalized;
        while let Some((parent, _)) = ancestor.rsplit_once(PATH_SEPARATOR) {
            if parent.len() <= root.len() {
                break;
            }
            if self.store().exists(&self.codec().key_for(parent)).await? {
                return Ok(Some(parent.to_string()));
            }
            ancestor = parent;
        }
        Ok(None)
    }

    /// Keys of every file strictly below `normalized`, deduplicated and ordered
    pub(crate) async fn descendant_keys(&self, normalized: &str) -> Result<Vec<String>> {
        let pattern = self.codec().descendants_pattern(normalized);
        Ok(store::scan_all(self.store(), &pattern)
            .await?
            .into_iter()
            .collect())
    }

    /// Immediate children of a directory, sorted by name.
    ///
    /// A child whose exact key appears in the scan is a file; a name seen
    /// only as the first segment of deeper keys is a directory.
    pub(crate) async fn list_children_normalized(&self, normalized: &str) -> Result<Vec<Child>> {
        let dir_key = self.codec().key_for(normalized);
        let child_start = dir_key.len() + PATH_SEPARATOR.len_utf8();

        let mut children: BTreeMap<String, PathKind> = BTreeMap::new();
        for key in self.descendant_keys(normalized).await? {
            let Some(rest) = key.get(child_start..) else {
                continue;
            };
            let (name, is_leaf) = match rest.split_once(PATH_SEPARATOR) {
                Some((name, _)) => (name, false),
                None => (rest, true),
            };
            if name.is_empty() {
                continue;
            }
            let kind = children
                .entry(name.to_string())
                .or_insert(PathKind::Directory);
            if is_leaf {
                *kind = PathKind::File;
            }
        }

        Ok(children
            .into_iter()
            .map(|(name, kind)| Child { name, kind })
            .collect())
    }

    pub async fn list_children(&self, path: &str) -> Result<Vec<Child>> {
        let normalized = self.codec().normalize(path)?;
        self.list_children_normalized(&normalized).await
    }
}
