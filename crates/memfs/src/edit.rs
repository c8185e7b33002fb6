use crate::error::{Error, Result};
use crate::fs::FS;
use crate::resolve::{Child, PathKind};
use diagnostics::{log_debug, log_info};

/// Line separator used to split and rejoin file content
const NEWLINE: char = '\n';

/// Render `content` with 1-based line numbers, optionally limited to an
/// inclusive `[start, end]` range where `end == -1` means the last line.
pub fn format_numbered(content: &str, range: Option<(i64, i64)>) -> Result<String> {
    let lines: Vec<&str> = content.split(NEWLINE).collect();
    let (start, end) = match range {
        None => (0, lines.len()),
        Some((_, end)) if end < -1 => {
            return Err(Error::invalid_argument(format!(
                "view_range end must be -1 or a line number, got {end}"
            )));
        }
        Some((start, end)) => {
            let start = usize::try_from(start.max(1) - 1).unwrap_or(usize::MAX);
            let end = match end {
                -1 => lines.len(),
                end => usize::try_from(end).unwrap_or(usize::MAX).min(lines.len()),
            };
            (start, end)
        }
    };

    let mut out = String::new();
    for (idx, line) in lines
        .iter()
        .enumerate()
        .take(end)
        .skip(start)
    {
        if !out.is_empty() {
            out.push(NEWLINE);
        }
        out.push_str(&format!("{:>4}: {line}", idx + 1));
    }
    Ok(out)
}

/// Render a directory listing: a header followed by one bullet per child
pub fn format_listing(path: &str, children: &[Child]) -> String {
    let mut out = format!("Directory: {path}");
    if children.is_empty() {
        out.push_str("\n(empty)");
        return out;
    }
    for child in children {
        out.push_str("\n- ");
        out.push_str(&child.display_name());
    }
    out
}

impl FS {
    /// Show a file with line numbers, or list a directory
    pub async fn view(&self, path: &str, range: Option<(i64, i64)>) -> Result<String> {
        let normalized = self.codec().normalize(path)?;
        let key = self.codec().key_for(&normalized);

        if let Some(content) = self.read_key_for_view(&key).await? {
            log_debug!("Viewing file {path}", path: normalized.as_str());
            return format_numbered(&content, range);
        }

        match self.classify_normalized(&normalized).await? {
            PathKind::Absent => Err(Error::not_found(&normalized)),
            _ => {
                let children = self.list_children_normalized(&normalized).await?;
                Ok(format_listing(&normalized, &children))
            }
        }
    }

    /// Create a new file. Never overwrites.
    pub async fn create(&self, path: &str, text: &str) -> Result<String> {
        let normalized = self.codec().normalize(path)?;
        if self.codec().is_root(&normalized) {
            return Err(Error::protected_path(&normalized));
        }

        match self.classify_normalized(&normalized).await? {
            PathKind::File => return Err(Error::already_exists(&normalized)),
            PathKind::Directory => {
                return Err(Error::conflict(&normalized, "a directory exists at this path"));
            }
            PathKind::Absent => {}
        }
        if let Some(ancestor) = self.file_ancestor(&normalized).await? {
            return Err(Error::conflict(
                &normalized,
                format!("{ancestor} is a file"),
            ));
        }

        self.write_key(&self.codec().key_for(&normalized), text)
            .await?;
        log_info!("Created {path}", path: normalized.as_str());
        Ok(format!("File created successfully at {normalized}"))
    }

    /// Replace the single occurrence of `old_str` with `new_str`
    pub async fn str_replace(&self, path: &str, old_str: &str, new_str: &str) -> Result<String> {
        if old_str.is_empty() {
            return Err(Error::invalid_argument("old_str cannot be empty"));
        }
        let normalized = self.codec().normalize(path)?;
        let key = self.codec().key_for(&normalized);
        let content = self
            .store()
            .get(&key)
            .await?
            .ok_or_else(|| Error::not_found(&normalized))?;

        match content.matches(old_str).count() {
            0 => return Err(Error::no_match(&normalized)),
            1 => {}
            count => return Err(Error::ambiguous_replace(&normalized, count)),
        }

        let updated = content.replacen(old_str, new_str, 1);
        self.write_key(&key, &updated).await?;
        log_info!("Edited {path}", path: normalized.as_str());
        Ok(format!("The file {normalized} has been edited"))
    }

    /// Insert `text` as a new line before 0-based line `line`.
    ///
    /// `line` equal to the current line count appends after the last line.
    pub async fn insert(&self, path: &str, line: i64, text: &str) -> Result<String> {
        let normalized = self.codec().normalize(path)?;
        let key = self.codec().key_for(&normalized);
        let content = self
            .store()
            .get(&key)
            .await?
            .ok_or_else(|| Error::not_found(&normalized))?;

        let mut lines: Vec<&str> = content.split(NEWLINE).collect();
        let index = usize::try_from(line)
            .ok()
            .filter(|idx| *idx <= lines.len())
            .ok_or_else(|| Error::invalid_range(line, lines.len()))?;

        lines.insert(index, text.strip_suffix(NEWLINE).unwrap_or(text));
        let updated = lines.join("\n");
        self.write_key(&key, &updated).await?;
        log_info!("Inserted at line {line} in {path}", line: line, path: normalized.as_str());
        Ok(format!("Text inserted at line {line} in {normalized}"))
    }
}
