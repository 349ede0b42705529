//! The worklog entry model.
//!
//! An [`Entry`] is one logged unit of time against an issue. The optional
//! [`WorklogId`] says which remote worklog an entry is; `PartialEq` compares
//! only the content (date, duration, issue key, description). The reconciler
//! pairs entries by id and updates those whose content differs.

use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{Error, Result};
use crate::model::duration::format_duration;

/// Opaque identifier of a worklog on the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorklogId(String);

impl WorklogId {
    /// Create an id from its textual form.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the id is empty, starts with `#`, or
    /// contains whitespace or `|`. Such ids would not survive the text format:
    /// a row starting with `#` reads back as a comment.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(Error::validation("id", "must not be empty"));
        }
        if trimmed.starts_with('#') {
            return Err(Error::validation(
                "id",
                format!("{trimmed:?} must not start with '#'"),
            ));
        }
        if trimmed.contains(|c: char| c.is_whitespace() || c == '|') {
            return Err(Error::validation(
                "id",
                format!("{trimmed:?} must not contain whitespace or '|'"),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorklogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for WorklogId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// One worklog line. Only constructible through [`Entry::new`].
#[derive(Debug, Clone)]
pub struct Entry {
    id: Option<WorklogId>,
    date: NaiveDate,
    duration: Duration,
    issue_key: String,
    description: String,
    source_line: Option<usize>,
}

impl Entry {
    /// Construct a validated entry.
    ///
    /// `issue_key` and `description` are trimmed. The issue key must be
    /// non-empty and single-line without `|`; the duration must not be
    /// negative.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the offending field.
    pub fn new(
        id: Option<WorklogId>,
        date: NaiveDate,
        duration: Duration,
        issue_key: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self> {
        if duration < Duration::zero() {
            return Err(Error::validation(
                "duration",
                format!("{} is negative", format_duration(duration)),
            ));
        }

        let issue_key = issue_key.into().trim().to_string();
        if issue_key.is_empty() {
            return Err(Error::validation("issue_key", "must not be empty"));
        }
        if issue_key.contains(['|', '\n', '\r']) {
            return Err(Error::validation(
                "issue_key",
                format!("{issue_key:?} must not contain '|' or line breaks"),
            ));
        }

        Ok(Self {
            id,
            date,
            duration,
            issue_key,
            description: description.into().trim().to_string(),
            source_line: None,
        })
    }

    #[must_use]
    pub fn id(&self) -> Option<&WorklogId> {
        self.id.as_ref()
    }

    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    #[must_use]
    pub fn issue_key(&self) -> &str {
        &self.issue_key
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// 1-based line of the edited text this entry was decoded from, if any.
    #[must_use]
    pub fn source_line(&self) -> Option<usize> {
        self.source_line
    }

    /// The same content under a (new) remote id.
    #[must_use]
    pub fn with_id(mut self, id: WorklogId) -> Self {
        self.id = Some(id);
        self
    }

    /// The same content with no id, i.e. as a not-yet-created worklog.
    #[must_use]
    pub fn without_id(mut self) -> Self {
        self.id = None;
        self
    }

    #[must_use]
    pub(crate) fn at_line(mut self, line: usize) -> Self {
        self.source_line = Some(line);
        self
    }

    /// Field names whose content differs from `other`, in display order.
    #[must_use]
    pub fn changed_fields(&self, other: &Self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.date != other.date {
            fields.push("date");
        }
        if self.duration != other.duration {
            fields.push("duration");
        }
        if self.issue_key != other.issue_key {
            fields.push("issue");
        }
        if self.description != other.description {
            fields.push("description");
        }
        fields
    }
}

/// Content equality: `id` and `source_line` are not compared.
impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.date == other.date
            && self.duration == other.duration
            && self.issue_key == other.issue_key
            && self.description == other.description
    }
}

impl Eq for Entry {}

impl Serialize for Entry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Entry", 6)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("date", &self.date)?;
        state.serialize_field("duration", &format_duration(self.duration))?;
        state.serialize_field("duration_seconds", &self.duration.num_seconds())?;
        state.serialize_field("issue", &self.issue_key)?;
        state.serialize_field("description", &self.description)?;
        state.end()
    }
}

/// Sum of durations of the entries on `date`.
#[must_use]
pub fn day_total<'a>(entries: impl IntoIterator<Item = &'a Entry>, date: NaiveDate) -> Duration {
    entries
        .into_iter()
        .filter(|e| e.date == date)
        .fold(Duration::zero(), |acc, e| acc + e.duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2019, 7, 18).unwrap()
    }

    fn entry(id: Option<&str>, minutes: i64, issue: &str, desc: &str) -> Entry {
        Entry::new(
            id.map(|i| WorklogId::new(i).unwrap()),
            date(),
            Duration::minutes(minutes),
            issue,
            desc,
        )
        .unwrap()
    }

    #[test]
    fn test_equality_ignores_id() {
        let a = entry(Some("1"), 30, "GAUS-538", "work");
        let b = entry(None, 30, "GAUS-538", "work");
        assert_eq!(a, b);
    }

    #[test]
    fn test_equality_compares_content() {
        let a = entry(Some("1"), 30, "GAUS-538", "work");
        let b = entry(Some("1"), 60, "GAUS-538", "work");
        assert_ne!(a, b);
        assert_eq!(b.changed_fields(&a), vec!["duration"]);
    }

    #[test]
    fn test_empty_issue_key_rejected() {
        let err = Entry::new(None, date(), Duration::minutes(1), "  ", "x").unwrap_err();
        assert!(matches!(err, Error::Validation { field: "issue_key", .. }));
    }

    #[test]
    fn test_issue_key_with_pipe_rejected() {
        let err = Entry::new(None, date(), Duration::minutes(1), "A|B", "").unwrap_err();
        assert!(matches!(err, Error::Validation { field: "issue_key", .. }));
    }

    #[test]
    fn test_negative_duration_rejected() {
        let err = Entry::new(None, date(), Duration::minutes(-5), "GAUS-1", "").unwrap_err();
        assert!(matches!(err, Error::Validation { field: "duration", .. }));
        assert!(err.to_string().contains("duration"));
    }

    #[test]
    fn test_fields_are_trimmed() {
        let e = entry(None, 1, "  GAUS-1 ", "  some work  ");
        assert_eq!(e.issue_key(), "GAUS-1");
        assert_eq!(e.description(), "some work");
    }

    #[test]
    fn test_worklog_id_validation() {
        assert!(WorklogId::new("").is_err());
        assert!(WorklogId::new("1 2").is_err());
        assert_eq!(WorklogId::new(" 42 ").unwrap().as_str(), "42");
        assert_eq!(WorklogId::from(7_u64).to_string(), "7");
    }

    #[test]
    fn test_worklog_id_starting_with_hash_rejected() {
        let err = WorklogId::new("#7").unwrap_err();
        assert!(matches!(err, Error::Validation { field: "id", .. }));
        assert!(WorklogId::new(" #7").is_err());
        assert_eq!(WorklogId::new("A#7").unwrap().as_str(), "A#7");
    }

    #[test]
    fn test_day_total() {
        let other_day = Entry::new(
            None,
            date().succ_opt().unwrap(),
            Duration::hours(5),
            "X-1",
            "",
        )
        .unwrap();
        let entries = vec![
            entry(Some("1"), 30, "A-1", ""),
            entry(Some("2"), 45, "A-2", ""),
            other_day,
        ];
        assert_eq!(day_total(&entries, date()), Duration::minutes(75));
    }

    #[test]
    fn test_serialize_entry() {
        let json = serde_json::to_value(entry(Some("5"), 90, "GAUS-1", "w")).unwrap();
        assert_eq!(json["id"], "5");
        assert_eq!(json["date"], "2019-07-18");
        assert_eq!(json["duration"], "1:30:00");
        assert_eq!(json["duration_seconds"], 5400);
        assert_eq!(json["issue"], "GAUS-1");
    }
}
