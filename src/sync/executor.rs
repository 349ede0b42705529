//! Best-effort execution of a change plan against a remote port.

use serde::Serialize;
use tracing::{info, warn};

use super::plan::{Change, ChangePlan};
use super::port::{PortError, RemoteWorklogPort};
use crate::model::{Entry, WorklogId};

/// What a successful operation did on the remote side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Created { id: WorklogId },
    Updated,
    Deleted,
    /// The delete target was already gone, which is the desired end state.
    AlreadyAbsent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Applied {
    pub change: Change,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failed {
    pub change: Change,
    #[serde(serialize_with = "serialize_error")]
    pub error: PortError,
}

fn serialize_error<S: serde::Serializer>(
    error: &PortError,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// Per-operation report of an [`apply`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyResult {
    pub succeeded: Vec<Applied>,
    pub failed: Vec<Failed>,
}

impl ApplyResult {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// `after` with the ids of the worklogs this run created filled in.
    ///
    /// A new entry is matched to its create by content and source line.
    /// Entries whose create failed keep an empty id, so diffing the result
    /// against a fresh fetch plans only what did not happen.
    #[must_use]
    pub fn resolve_created(&self, after: &[Entry]) -> Vec<Entry> {
        let mut created: Vec<(&Entry, &WorklogId)> = self
            .succeeded
            .iter()
            .filter_map(|applied| match (&applied.change, &applied.outcome) {
                (Change::Create { entry }, Outcome::Created { id }) => Some((entry, id)),
                _ => None,
            })
            .collect();

        after
            .iter()
            .map(|entry| {
                if entry.id().is_none() {
                    let pos = created.iter().position(|(made, _)| {
                        *made == entry && made.source_line() == entry.source_line()
                    });
                    if let Some(pos) = pos {
                        let (_, id) = created.remove(pos);
                        return entry.clone().with_id(id.clone());
                    }
                }
                entry.clone()
            })
            .collect()
    }
}

/// Execute every change in plan order, one remote call each.
///
/// A failing operation is recorded and the run continues with the next one.
/// Nothing is retried. A delete answered with `NotFound` counts as
/// [`Outcome::AlreadyAbsent`].
pub fn apply<P>(plan: ChangePlan, port: &mut P) -> ApplyResult
where
    P: RemoteWorklogPort + ?Sized,
{
    let mut result = ApplyResult::default();

    for change in plan {
        let outcome = match &change {
            Change::Delete { id, .. } => match port.delete(id) {
                Ok(()) => Ok(Outcome::Deleted),
                Err(PortError::NotFound { .. }) => Ok(Outcome::AlreadyAbsent),
                Err(e) => Err(e),
            },
            Change::Update { id, entry, .. } => port.update(id, entry).map(|()| Outcome::Updated),
            Change::Create { entry } => port.create(entry).map(|id| Outcome::Created { id }),
        };

        match outcome {
            Ok(outcome) => {
                info!(op = %change.kind(), id = ?change.id(), ?outcome, "Applied");
                result.succeeded.push(Applied { change, outcome });
            }
            Err(error) => {
                warn!(op = %change.kind(), id = ?change.id(), error = %error, "Operation failed");
                result.failed.push(Failed { change, error });
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DateRange, Entry};
    use crate::sync::memory::InMemoryPort;
    use crate::sync::plan::ChangeKind;
    use crate::sync::reconcile::diff;
    use chrono::{Duration, NaiveDate};

    fn d() -> NaiveDate {
        NaiveDate::from_ymd_opt(2019, 7, 18).unwrap()
    }

    fn entry(minutes: i64, issue: &str) -> Entry {
        Entry::new(None, d(), Duration::minutes(minutes), issue, "work").unwrap()
    }

    fn seeded() -> InMemoryPort {
        let mut port = InMemoryPort::new();
        port.insert(entry(30, "GAUS-538"));
        port.insert(entry(60, "GAUS-570"));
        port
    }

    #[test]
    fn test_apply_reaches_after_state() {
        let mut port = seeded();
        let before = port.fetch(&DateRange::day(d())).unwrap();
        let mut after = vec![before[0].clone()];
        after[0] = entry(45, "GAUS-538").with_id(before[0].id().unwrap().clone());
        after.push(entry(15, "NEW-1"));

        let result = apply(diff(&before, &after).unwrap(), &mut port);
        assert!(result.is_success());
        assert_eq!(result.total(), 3);
        assert!(matches!(result.succeeded[2].outcome, Outcome::Created { .. }));

        let now = port.fetch(&DateRange::day(d())).unwrap();
        assert_eq!(now.len(), 2);
        assert!(now.contains(&entry(45, "GAUS-538")));
        assert!(now.contains(&entry(15, "NEW-1")));
    }

    #[test]
    fn test_failure_does_not_stop_the_run() {
        let mut port = seeded();
        let before = port.fetch(&DateRange::day(d())).unwrap();
        let after = vec![entry(5, "BAD-1"), entry(6, "OK-1")];
        port.reject_issue("BAD-1");

        let result = apply(diff(&before, &after).unwrap(), &mut port);
        assert!(!result.is_success());
        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.failed[0].change.kind(), ChangeKind::Create);
        assert!(matches!(result.failed[0].error, PortError::RemoteValidation(_)));
        assert_eq!(result.succeeded.len(), 3);
    }

    #[test]
    fn test_delete_of_missing_worklog_counts_as_success() {
        let mut port = seeded();
        let before = port.fetch(&DateRange::day(d())).unwrap();
        let gone = before[0].id().unwrap().clone();
        port.delete(&gone).unwrap();

        let result = apply(diff(&before, &before[1..]).unwrap(), &mut port);
        assert!(result.is_success());
        assert_eq!(result.succeeded[0].outcome, Outcome::AlreadyAbsent);
    }

    #[test]
    fn test_update_of_missing_worklog_fails() {
        let mut port = seeded();
        let before = port.fetch(&DateRange::day(d())).unwrap();
        let id = before[0].id().unwrap().clone();
        port.delete(&id).unwrap();
        let after = vec![entry(90, "GAUS-538").with_id(id), before[1].clone()];

        let result = apply(diff(&before, &after).unwrap(), &mut port);
        assert_eq!(result.failed.len(), 1);
        assert!(matches!(result.failed[0].error, PortError::NotFound { .. }));
    }

    #[test]
    fn test_resolve_created_fills_only_successful_creates() {
        let mut port = InMemoryPort::new();
        port.reject_issue("BAD-1");
        let after = vec![entry(10, "OK-1").at_line(3), entry(20, "BAD-1").at_line(4)];

        let result = apply(diff(&[], &after).unwrap(), &mut port);
        let resolved = result.resolve_created(&after);

        assert_eq!(resolved[0].id(), Some(&WorklogId::from(1_u64)));
        assert_eq!(resolved[1].id(), None);

        let fresh = port.fetch(&DateRange::day(d())).unwrap();
        let retry = diff(&fresh, &resolved).unwrap();
        assert_eq!(retry.len(), 1);
        assert_eq!(retry.iter().next().unwrap().entry().issue_key(), "BAD-1");
    }

    #[test]
    fn test_resolve_created_pairs_identical_lines_by_source_line() {
        let mut port = InMemoryPort::new();
        let after = vec![entry(10, "A-1").at_line(2), entry(10, "A-1").at_line(5)];

        let result = apply(diff(&[], &after).unwrap(), &mut port);
        let resolved = result.resolve_created(&after);

        assert_eq!(resolved[0].id(), Some(&WorklogId::from(1_u64)));
        assert_eq!(resolved[1].id(), Some(&WorklogId::from(2_u64)));
        assert_eq!(resolved[1].source_line(), Some(5));
    }

    #[test]
    fn test_result_serializes_outcome() {
        let mut port = InMemoryPort::new();
        let plan = diff(&[], &[entry(5, "A-1")]).unwrap();
        let json = serde_json::to_value(apply(plan, &mut port)).unwrap();
        assert_eq!(json["succeeded"][0]["outcome"], "created");
        assert_eq!(json["succeeded"][0]["change"]["op"], "create");
        assert!(json["failed"].as_array().unwrap().is_empty());
    }
}
