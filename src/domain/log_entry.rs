use chrono::{DateTime, Utc};
use non_empty_string::NonEmptyString;
use uuid::Uuid;

use crate::domain::item::{ResolveError, resolve_prefix};

/// A free-text record of a reaction.
///
/// Log entries are kept for the user's own reference and are not analyzed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    id: Uuid,
    name: NonEmptyString,
    symptoms: NonEmptyString,
    date: DateTime<Utc>,
}

impl LogEntry {
    pub(crate) const fn from_parts(
        id: Uuid,
        name: NonEmptyString,
        symptoms: NonEmptyString,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            symptoms,
            date,
        }
    }

    /// The unique identifier of this entry.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// The product or meal the reaction followed.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// The symptoms observed.
    #[must_use]
    pub fn symptoms(&self) -> &str {
        self.symptoms.as_str()
    }

    /// When the entry was recorded.
    #[must_use]
    pub const fn date(&self) -> DateTime<Utc> {
        self.date
    }
}

/// The user's reaction log, in the order entries were recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogBook {
    entries: Vec<LogEntry>,
}

impl LogBook {
    /// Create an empty log.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Record a new entry, timestamped now.
    pub fn add(&mut self, name: NonEmptyString, symptoms: NonEmptyString) -> &LogEntry {
        let entry = LogEntry::from_parts(Uuid::new_v4(), name, symptoms, Utc::now());
        tracing::info!("Logged reaction to {}", entry.name());
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    pub(crate) fn restore(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    /// Remove the entry with the given id, if present.
    pub fn remove(&mut self, id: Uuid) -> Option<LogEntry> {
        let position = self.entries.iter().position(|entry| entry.id == id)?;
        Some(self.entries.remove(position))
    }

    /// Entries in the order they were recorded.
    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Entries with the most recent first.
    pub fn newest_first(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().rev()
    }

    /// The number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a (possibly abbreviated) id into the id of a log entry.
    ///
    /// # Errors
    ///
    /// Returns an error if no entry id starts with `prefix`, or if more than
    /// one does.
    pub fn resolve(&self, prefix: &str) -> Result<Uuid, ResolveError> {
        resolve_prefix(self.entries.iter().map(LogEntry::id), prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> NonEmptyString {
        NonEmptyString::new(s.to_string()).unwrap()
    }

    #[test]
    fn newest_entries_come_first() {
        let mut log = LogBook::new();
        log.add(text("Pizza"), text("Hives"));
        log.add(text("Curry"), text("Headache"));

        let names: Vec<_> = log.newest_first().map(LogEntry::name).collect();
        assert_eq!(names, ["Curry", "Pizza"]);
    }

    #[test]
    fn remove_by_resolved_prefix() {
        let mut log = LogBook::new();
        let id = log.add(text("Pizza"), text("Hives")).id();
        let prefix = &id.to_string()[..8];

        let resolved = log.resolve(prefix).unwrap();
        let removed = log.remove(resolved).unwrap();

        assert_eq!(removed.symptoms(), "Hives");
        assert!(log.is_empty());
    }
}
