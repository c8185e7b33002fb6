use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind, Result};
use crate::fs::FS;

/// A tool call issued against the namespace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    View {
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        view_range: Option<(i64, i64)>,
    },
    Create {
        path: String,
        file_text: String,
    },
    StrReplace {
        path: String,
        old_str: String,
        new_str: String,
    },
    Insert {
        path: String,
        insert_line: i64,
        insert_text: String,
    },
    Delete {
        path: String,
    },
    Rename {
        old_path: String,
        new_path: String,
    },
}

impl Command {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::View { .. } => "view",
            Command::Create { .. } => "create",
            Command::StrReplace { .. } => "str_replace",
            Command::Insert { .. } => "insert",
            Command::Delete { .. } => "delete",
            Command::Rename { .. } => "rename",
        }
    }
}

/// Transport form of a command result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandOutcome {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
}

impl From<Result<String>> for CommandOutcome {
    fn from(result: Result<String>) -> Self {
        match result {
            Ok(output) => Self {
                ok: true,
                output: Some(output),
                error: None,
                kind: None,
            },
            Err(err) => Self::failure(&err),
        }
    }
}

impl CommandOutcome {
    pub fn failure(err: &Error) -> Self {
        Self {
            ok: false,
            output: None,
            error: Some(err.to_string()),
            kind: Some(err.kind()),
        }
    }
}

impl FS {
    pub async fn execute(&self, command: Command) -> Result<String> {
        diagnostics::log_debug!("Executing {command}", command: command.name());
        match command {
            Command::View { path, view_range } => self.view(&path, view_range).await,
            Command::Create { path, file_text } => self.create(&path, &file_text).await,
            Command::StrReplace {
                path,
                old_str,
                new_str,
            } => self.str_replace(&path, &old_str, &new_str).await,
            Command::Insert {
                path,
                insert_line,
                insert_text,
            } => self.insert(&path, insert_line, &insert_text).await,
            Command::Delete { path } => self.delete(&path).await,
            Command::Rename { old_path, new_path } => self.rename(&old_path, &new_path).await,
        }
    }

    /// Parse and run one JSON command, never failing at the transport level
    pub async fn execute_json(&self, text: &str) -> CommandOutcome {
        match Command::from_json(text) {
            Ok(command) => self.execute(command).await.into(),
            Err(err) => CommandOutcome::failure(&err),
        }
    }
}
