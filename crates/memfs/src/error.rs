use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by namespace operations.
///
/// The display text of each variant is the message handed back to the agent,
/// so it is part of the public surface.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Invalid path {path}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("The path {0} does not exist")]
    NotFound(String),

    #[error("File {0} already exists")]
    AlreadyExists(String),

    #[error("Conflict at {path}: {reason}")]
    Conflict { path: String, reason: String },

    #[error(
        "No replacement was performed. Multiple occurrences ({count}) of old_str in {path}; it must be unique"
    )]
    AmbiguousReplace { path: String, count: usize },

    #[error("No replacement was performed, old_str did not appear verbatim in {0}")]
    NoMatch(String),

    #[error("Invalid insert_line {line}: must be within [0, {line_count}]")]
    InvalidRange { line: i64, line_count: usize },

    #[error("Operation not permitted on protected path {0}")]
    ProtectedPath(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Machine-readable classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidPath,
    NotFound,
    AlreadyExists,
    Conflict,
    AmbiguousReplace,
    NoMatch,
    InvalidRange,
    ProtectedPath,
    StoreUnavailable,
    InvalidArgument,
    InvalidCommand,
    Config,
}

impl Error {
    pub fn invalid_path<P: AsRef<str>, R: Into<String>>(path: P, reason: R) -> Self {
        Error::InvalidPath {
            path: path.as_ref().to_string(),
            reason: reason.into(),
        }
    }

    pub fn not_found<P: AsRef<str>>(path: P) -> Self {
        Error::NotFound(path.as_ref().to_string())
    }

    pub fn already_exists<P: AsRef<str>>(path: P) -> Self {
        Error::AlreadyExists(path.as_ref().to_string())
    }

    pub fn conflict<P: AsRef<str>, R: Into<String>>(path: P, reason: R) -> Self {
        Error::Conflict {
            path: path.as_ref().to_string(),
            reason: reason.into(),
        }
    }

    pub fn ambiguous_replace<P: AsRef<str>>(path: P, count: usize) -> Self {
        Error::AmbiguousReplace {
            path: path.as_ref().to_string(),
            count,
        }
    }

    pub fn no_match<P: AsRef<str>>(path: P) -> Self {
        Error::NoMatch(path.as_ref().to_string())
    }

    pub fn invalid_range(line: i64, line_count: usize) -> Self {
        Error::InvalidRange { line, line_count }
    }

    pub fn protected_path<P: AsRef<str>>(path: P) -> Self {
        Error::ProtectedPath(path.as_ref().to_string())
    }

    /// Wrap a failure reported by a store implementation
    pub fn store_unavailable<E: std::fmt::Display>(err: E) -> Self {
        Error::StoreUnavailable(err.to_string())
    }

    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Error::InvalidArgument(msg.into())
    }

    pub fn invalid_command<S: Into<String>>(msg: S) -> Self {
        Error::InvalidCommand(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidPath { .. } => ErrorKind::InvalidPath,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Error::Conflict { .. } => ErrorKind::Conflict,
            Error::AmbiguousReplace { .. } => ErrorKind::AmbiguousReplace,
            Error::NoMatch(_) => ErrorKind::NoMatch,
            Error::InvalidRange { .. } => ErrorKind::InvalidRange,
            Error::ProtectedPath(_) => ErrorKind::ProtectedPath,
            Error::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::InvalidCommand(_) => ErrorKind::InvalidCommand,
            Error::Config(_) => ErrorKind::Config,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::InvalidCommand(err.to_string())
    }
}

impl From<serde_yaml_ng::Error> for Error {
    fn from(err: serde_yaml_ng::Error) -> Error {
        Error::Config(err.to_string())
    }
}
