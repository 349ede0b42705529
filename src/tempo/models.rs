//! Wire types for the Tempo worklog REST API.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::model::{Entry, WorklogId};
use crate::sync::PortError;

/// One page of `GET /worklogs/user/{id}`.
#[derive(Debug, Deserialize)]
pub(crate) struct WorklogPage {
    #[serde(default)]
    pub metadata: PageMetadata,
    #[serde(default)]
    pub results: Vec<TempoWorklog>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageMetadata {
    /// Absolute URL of the next page; absent on the last one.
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TempoWorklog {
    pub tempo_worklog_id: u64,
    pub issue: IssueRef,
    pub start_date: NaiveDate,
    pub time_spent_seconds: i64,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IssueRef {
    pub key: String,
}

impl TempoWorklog {
    pub fn into_entry(self) -> Result<Entry, PortError> {
        let id = WorklogId::from(self.tempo_worklog_id);
        let duration = Duration::try_seconds(self.time_spent_seconds).ok_or_else(|| {
            PortError::Transport(format!("worklog {id}: time spent out of range"))
        })?;
        Entry::new(
            Some(id.clone()),
            self.start_date,
            duration,
            self.issue.key,
            self.description.unwrap_or_default(),
        )
        .map_err(|e| PortError::Transport(format!("worklog {id}: {e}")))
    }
}

/// Body of `POST /worklogs` and `PUT /worklogs/{id}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WorklogPayload<'a> {
    pub author_account_id: &'a str,
    pub billable_seconds: Option<i64>,
    pub description: &'a str,
    pub issue_key: &'a str,
    pub remaining_estimate_seconds: Option<i64>,
    pub start_date: NaiveDate,
    pub start_time: &'static str,
    pub time_spent_seconds: i64,
}

impl<'a> WorklogPayload<'a> {
    pub fn new(author_account_id: &'a str, entry: &'a Entry) -> Self {
        Self {
            author_account_id,
            billable_seconds: None,
            description: entry.description(),
            issue_key: entry.issue_key(),
            remaining_estimate_seconds: None,
            start_date: entry.date(),
            start_time: "00:00:00",
            time_spent_seconds: entry.duration().num_seconds(),
        }
    }
}

/// Response of a create; only the id is used.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreatedWorklog {
    pub tempo_worklog_id: u64,
}

/// Error body Tempo sends with 4xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub errors: Vec<ErrorMessage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorMessage {
    pub message: String,
}

impl ErrorBody {
    /// The joined messages, or the raw body if it is not Tempo's error shape.
    pub fn describe(body: &str) -> String {
        match serde_json::from_str::<Self>(body) {
            Ok(parsed) if !parsed.errors.is_empty() => parsed
                .errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; "),
            _ => body.trim().to_string(),
        }
    }
}
