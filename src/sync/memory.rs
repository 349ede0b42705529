//! In-memory [`RemoteWorklogPort`] for tests and offline experiments.

use std::collections::HashSet;

use super::port::{PortError, PortResult, RemoteWorklogPort};
use crate::model::{DateRange, Entry, WorklogId};

/// A worklog store that honours the port contract without a network.
///
/// Ids are assigned from a counter starting at 1. Issue keys can be marked
/// as rejected and the whole store can be taken offline to exercise failure
/// paths.
#[derive(Debug, Clone)]
pub struct InMemoryPort {
    worklogs: Vec<Entry>,
    next_id: u64,
    rejected_issues: HashSet<String>,
    offline: bool,
}

impl Default for InMemoryPort {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPort {
    #[must_use]
    pub fn new() -> Self {
        Self {
            worklogs: Vec::new(),
            next_id: 1,
            rejected_issues: HashSet::new(),
            offline: false,
        }
    }

    /// Store an entry under a fresh id, bypassing failure injection.
    pub fn insert(&mut self, entry: Entry) -> WorklogId {
        let id = WorklogId::from(self.next_id);
        self.next_id += 1;
        self.worklogs.push(entry.with_id(id.clone()));
        id
    }

    /// Every stored worklog, in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.worklogs
    }

    /// Creates and updates for `issue_key` fail with `RemoteValidation`.
    pub fn reject_issue(&mut self, issue_key: impl Into<String>) {
        self.rejected_issues.insert(issue_key.into());
    }

    /// While offline every call fails with `Transport`.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    fn check_online(&self) -> PortResult<()> {
        if self.offline {
            return Err(PortError::Transport("connection refused".to_string()));
        }
        Ok(())
    }

    fn check_issue(&self, entry: &Entry) -> PortResult<()> {
        if self.rejected_issues.contains(entry.issue_key()) {
            return Err(PortError::RemoteValidation(format!(
                "Issue {} does not exist",
                entry.issue_key()
            )));
        }
        Ok(())
    }

    fn position(&self, id: &WorklogId) -> PortResult<usize> {
        self.worklogs
            .iter()
            .position(|e| e.id() == Some(id))
            .ok_or_else(|| PortError::NotFound { id: id.to_string() })
    }
}

impl RemoteWorklogPort for InMemoryPort {
    fn fetch(&mut self, range: &DateRange) -> PortResult<Vec<Entry>> {
        self.check_online()?;
        let mut found: Vec<Entry> = self
            .worklogs
            .iter()
            .filter(|e| range.contains(e.date()))
            .cloned()
            .collect();
        found.sort_by_key(Entry::date);
        Ok(found)
    }

    fn create(&mut self, entry: &Entry) -> PortResult<WorklogId> {
        self.check_online()?;
        self.check_issue(entry)?;
        Ok(self.insert(entry.clone()))
    }

    fn update(&mut self, id: &WorklogId, entry: &Entry) -> PortResult<()> {
        self.check_online()?;
        let pos = self.position(id)?;
        self.check_issue(entry)?;
        self.worklogs[pos] = entry.clone().with_id(id.clone());
        Ok(())
    }

    fn delete(&mut self, id: &WorklogId) -> PortResult<()> {
        self.check_online()?;
        let pos = self.position(id)?;
        self.worklogs.remove(pos);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn entry(day: u32, issue: &str) -> Entry {
        Entry::new(
            None,
            NaiveDate::from_ymd_opt(2019, 7, day).unwrap(),
            Duration::minutes(30),
            issue,
            "",
        )
        .unwrap()
    }

    #[test]
    fn test_fetch_filters_by_range_and_sorts() {
        let mut port = InMemoryPort::new();
        port.insert(entry(20, "C-1"));
        port.insert(entry(18, "A-1"));
        port.insert(entry(25, "Z-1"));
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2019, 7, 18).unwrap(),
            NaiveDate::from_ymd_opt(2019, 7, 20).unwrap(),
        )
        .unwrap();
        let fetched = port.fetch(&range).unwrap();
        let issues: Vec<_> = fetched.iter().map(Entry::issue_key).collect();
        assert_eq!(issues, vec!["A-1", "C-1"]);
        assert!(fetched.iter().all(|e| e.id().is_some()));
    }

    #[test]
    fn test_ids_are_sequential() {
        let mut port = InMemoryPort::new();
        assert_eq!(port.insert(entry(18, "A-1")).as_str(), "1");
        assert_eq!(port.create(&entry(18, "A-2")).unwrap().as_str(), "2");
    }

    #[test]
    fn test_missing_ids_are_not_found() {
        let mut port = InMemoryPort::new();
        let ghost = WorklogId::from(42_u64);
        assert!(matches!(port.delete(&ghost), Err(PortError::NotFound { .. })));
        assert!(matches!(
            port.update(&ghost, &entry(18, "A-1")),
            Err(PortError::NotFound { .. })
        ));
    }

    #[test]
    fn test_offline_fails_every_call() {
        let mut port = InMemoryPort::new();
        port.set_offline(true);
        let range = DateRange::day(NaiveDate::from_ymd_opt(2019, 7, 18).unwrap());
        assert!(matches!(port.fetch(&range), Err(PortError::Transport(_))));
        assert!(matches!(port.create(&entry(18, "A-1")), Err(PortError::Transport(_))));
    }
}
