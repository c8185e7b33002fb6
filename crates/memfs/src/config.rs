use crate::error::{Error, Result};
use crate::path::SEPARATOR;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_KEY_PREFIX: &str = "memory";
pub const DEFAULT_ROOT: &str = "/memories";

pub const ENV_KEY_PREFIX: &str = "MEMFS_KEY_PREFIX";
pub const ENV_TENANT: &str = "MEMFS_TENANT";
pub const ENV_ROOT: &str = "MEMFS_ROOT";
pub const ENV_TTL_SECONDS: &str = "MEMFS_TTL_SECONDS";

/// Process-wide settings, fixed when an [`crate::FS`] is constructed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Label at the start of every key
    pub key_prefix: String,
    /// Appended to the prefix to isolate one agent session from another
    pub tenant: Option<String>,
    /// Namespace root every path must live under
    pub root: String,
    /// Sliding expiration applied on write and on content reads
    pub ttl_seconds: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            tenant: None,
            root: DEFAULT_ROOT.to_string(),
            ttl_seconds: None,
        }
    }
}

impl Config {
    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    pub fn with_ttl(mut self, ttl_seconds: u64) -> Self {
        self.ttl_seconds = Some(ttl_seconds);
        self
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: Config = serde_yaml_ng::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(&path).map_err(|e| {
            Error::config(format!(
                "failed to read {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Self::from_yaml_str(&text)
    }

    /// Overlay `MEMFS_*` environment variables onto this configuration
    pub fn with_env(self) -> Result<Self> {
        self.with_vars(|name| std::env::var(name).ok())
    }

    fn with_vars<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(prefix) = lookup(ENV_KEY_PREFIX) {
            self.key_prefix = prefix;
        }
        if let Some(tenant) = lookup(ENV_TENANT) {
            self.tenant = Some(tenant);
        }
        if let Some(root) = lookup(ENV_ROOT) {
            self.root = root;
        }
        if let Some(ttl) = lookup(ENV_TTL_SECONDS) {
            let ttl = ttl
                .trim()
                .parse::<u64>()
                .map_err(|e| Error::config(format!("{ENV_TTL_SECONDS}={ttl}: {e}")))?;
            self.ttl_seconds = Some(ttl);
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.key_prefix.is_empty() {
            return Err(Error::config("key_prefix cannot be empty"));
        }
        if self.key_prefix.contains(SEPARATOR) {
            return Err(Error::config(format!(
                "key_prefix cannot contain '{SEPARATOR}'"
            )));
        }
        if let Some(tenant) = &self.tenant {
            if tenant.is_empty() {
                return Err(Error::config("tenant cannot be empty"));
            }
            if tenant.contains(SEPARATOR) {
                return Err(Error::config(format!("tenant cannot contain '{SEPARATOR}'")));
            }
        }

        let root = &self.root;
        if !root.starts_with('/') || root == "/" {
            return Err(Error::config(format!(
                "root must be an absolute path below '/': {root}"
            )));
        }
        if root.ends_with('/') || root.contains("//") {
            return Err(Error::config(format!(
                "root cannot contain empty segments: {root}"
            )));
        }
        if root.contains(SEPARATOR) {
            return Err(Error::config(format!(
                "root cannot contain '{SEPARATOR}': {root}"
            )));
        }

        if self.ttl_seconds == Some(0) {
            return Err(Error::config("ttl_seconds must be greater than 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert_eq!(config.key_prefix, "memory");
        assert_eq!(config.root, "/memories");
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_yaml_partial() {
        let config = Config::from_yaml_str("tenant: agent-7\nttl_seconds: 3600\n").unwrap();
        assert_eq!(config.tenant.as_deref(), Some("agent-7"));
        assert_eq!(config.ttl_seconds, Some(3600));
        assert_eq!(config.root, DEFAULT_ROOT);
    }

    #[test]
    fn test_yaml_unknown_field() {
        let result = Config::from_yaml_str("prefix: oops\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "key_prefix: notes\nroot: /notes").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.key_prefix, "notes");
        assert_eq!(config.root, "/notes");
    }

    #[test]
    fn test_env_overlay() {
        let vars = HashMap::from([
            (ENV_TENANT, "session-1".to_string()),
            (ENV_TTL_SECONDS, "60".to_string()),
        ]);
        let config = Config::default()
            .with_vars(|name| vars.get(name).cloned())
            .unwrap();
        assert_eq!(config.tenant.as_deref(), Some("session-1"));
        assert_eq!(config.ttl_seconds, Some(60));

        let vars = HashMap::from([(ENV_TTL_SECONDS, "soon".to_string())]);
        let result = Config::default().with_vars(|name| vars.get(name).cloned());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects() {
        let bad = [
            Config {
                key_prefix: String::new(),
                ..Config::default()
            },
            Config {
                key_prefix: "a:b".into(),
                ..Config::default()
            },
            Config::default().with_tenant(""),
            Config::default().with_tenant("x:y"),
            Config {
                root: "memories".into(),
                ..Config::default()
            },
            Config {
                root: "/".into(),
                ..Config::default()
            },
            Config {
                root: "/memories/".into(),
                ..Config::default()
            },
            Config::default().with_ttl(0),
        ];
        for config in bad {
            assert!(config.validate().is_err(), "{config:?} should be rejected");
        }
    }
}
