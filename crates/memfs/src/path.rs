use crate::config::Config;
use crate::error::{Error, Result};
use crate::pattern;

/// Joins the key prefix, tenant and path; never valid inside a path
pub const SEPARATOR: char = ':';

/// Path segment separator
pub const PATH_SEPARATOR: char = '/';

/// Collapse repeated separators and drop one trailing separator.
///
/// Segments are opaque: `.` and `..` are kept as written.
pub fn normalize(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut last_was_sep = false;
    for ch in path.chars() {
        if ch == PATH_SEPARATOR {
            if !last_was_sep {
                out.push(ch);
            }
            last_was_sep = true;
        } else {
            out.push(ch);
            last_was_sep = false;
        }
    }
    if out.len() > 1 && out.ends_with(PATH_SEPARATOR) {
        _ = out.pop();
    }
    out
}

/// Extracts the final segment of a normalized path, if any
pub fn basename(path: &str) -> Option<&str> {
    path.rsplit(PATH_SEPARATOR).next().filter(|s| !s.is_empty())
}

/// Converts between caller paths and store keys.
///
/// A key is `prefix[:tenant]:path` where `path` is normalized and rooted at
/// the configured namespace root.
#[derive(Debug, Clone, PartialEq)]
pub struct PathCodec {
    root: String,
    namespace: String,
}

impl PathCodec {
    pub fn new(config: &Config) -> Self {
        let namespace = match &config.tenant {
            Some(tenant) => format!("{}{SEPARATOR}{tenant}", config.key_prefix),
            None => config.key_prefix.clone(),
        };
        Self {
            root: config.root.clone(),
            namespace,
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Key prefix shared by every key of this tenant, without the trailing separator
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn is_root(&self, normalized: &str) -> bool {
        normalized == self.root
    }

    /// Validate and normalize a caller path
    pub fn normalize(&self, path: &str) -> Result<String> {
        let normalized = normalize(path);
        if normalized.contains(SEPARATOR) {
            return Err(Error::invalid_path(
                path,
                format!("'{SEPARATOR}' is reserved and cannot appear in a path"),
            ));
        }
        let under_root = normalized == self.root
            || normalized
                .strip_prefix(self.root.as_str())
                .is_some_and(|rest| rest.starts_with(PATH_SEPARATOR));
        if !under_root {
            return Err(Error::invalid_path(
                path,
                format!("path must start with {}", self.root),
            ));
        }
        Ok(normalized)
    }

    pub fn encode(&self, path: &str) -> Result<String> {
        let normalized = self.normalize(path)?;
        Ok(self.key_for(&normalized))
    }

    /// Key for a path that already went through [`PathCodec::normalize`]
    pub fn key_for(&self, normalized: &str) -> String {
        format!("{}{SEPARATOR}{normalized}", self.namespace)
    }

    /// Inverse of [`PathCodec::key_for`] for keys this codec produced.
    pub fn decode<'a>(&self, key: &'a str) -> &'a str {
        key.get(self.namespace.len() + SEPARATOR.len_utf8()..)
            .unwrap_or_default()
    }

    /// Scan pattern matching every key strictly below `normalized`
    pub fn descendants_pattern(&self, normalized: &str) -> String {
        let mut pattern = pattern::escape(&self.key_for(normalized));
        pattern.push(PATH_SEPARATOR);
        pattern.push('*');
        pattern
    }

    /// Scan pattern matching every key of this tenant.
    ///
    /// Anchored at the root so a bare prefix never picks up tenant keys.
    pub fn namespace_pattern(&self) -> String {
        self.descendants_pattern(&self.root)
    }
}
