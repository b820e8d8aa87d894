//! Commit message history: loading, ranking, and append-only persistence.
//!
//! The log is plain text with one entry per line. It is never rewritten;
//! duplicates are collapsed only when producing suggestions.
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Past commit messages, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputHistory {
    entries: Vec<String>,
}

impl InputHistory {
    #[cfg(test)]
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    /// Read the history log. A missing file is an empty history; bytes that
    /// are not UTF-8 decode to replacement characters.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(err).with_context(|| format!("read history {}", path.display()))
            }
        };
        let entries = String::from_utf8_lossy(&bytes)
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect();
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn push(&mut self, entry: impl Into<String>) {
        self.entries.push(entry.into());
    }

    /// Entries starting with `prefix`, most recent first, each distinct
    /// entry listed once at its most recent position.
    pub fn suggestions(&self, prefix: &str) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut ranked = Vec::new();
        for entry in self.entries.iter().rev() {
            if !entry.starts_with(prefix) {
                continue;
            }
            if seen.insert(entry.as_str()) {
                ranked.push(entry.as_str());
            }
        }
        ranked
    }

    /// Remainder of the most recent entry that continues `prefix`.
    ///
    /// Blank prefixes get no hint, and an entry equal to the prefix offers
    /// nothing to continue with.
    pub fn hint(&self, prefix: &str) -> Option<&str> {
        if prefix.trim().is_empty() {
            return None;
        }
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.len() > prefix.len() && entry.starts_with(prefix))
            .map(|entry| &entry[prefix.len()..])
    }
}

/// Append one entry to the history log, creating it if absent.
pub fn append_entry(path: &Path, entry: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create history dir {}", parent.display()))?;
    }
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open {}", path.display()))?;
    file.write_all(entry.as_bytes())
        .with_context(|| format!("write {}", path.display()))?;
    file.write_all(b"\n")
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
