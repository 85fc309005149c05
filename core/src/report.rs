//! Aggregated validation failures keyed by dotted field path.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Messages recorded during one validation run, grouped by dotted path.
///
/// Several failures at the same path accumulate in the order they were
/// recorded. Paths iterate in sorted order.
///
/// # Examples
///
/// ```
/// use config_schema_core::ErrorReport;
///
/// let mut report = ErrorReport::new();
/// report.push("database.user", "was required");
/// report.push("database.user", "supposed to be a String but was Integer");
///
/// assert_eq!(report.len(), 1);
/// assert_eq!(report.message_count(), 2);
/// assert_eq!(report.get("database.user").unwrap()[0], "was required");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorReport {
    entries: BTreeMap<String, Vec<String>>,
}

impl ErrorReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `message` under `path`.
    pub fn push(&mut self, path: &str, message: impl Into<String>) {
        self.entries
            .entry(path.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct paths with at least one message.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Total number of messages across all paths.
    pub fn message_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn get(&self, path: &str) -> Option<&[String]> {
        self.entries.get(path).map(Vec::as_slice)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(path, messages)| (path.as_str(), messages.as_slice()))
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<String>> {
        self.entries
    }
}

/// One line per message: `path: message`.
impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (path, messages) in self.iter() {
            let path = if path.is_empty() { "(root)" } else { path };
            for message in messages {
                if !first {
                    writeln!(f)?;
                }
                first = false;
                write!(f, "{path}: {message}")?;
            }
        }
        Ok(())
    }
}
