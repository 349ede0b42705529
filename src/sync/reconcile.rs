//! Reconciliation of a fetched snapshot against an edited one.
//!
//! [`diff`] is pure: no I/O, no prompts. Callers that want to guard a full
//! clear check [`ChangePlan::clears_all`] themselves.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::plan::{Change, ChangePlan};
use crate::error::{Error, Result};
use crate::model::{Entry, WorklogId};

/// Compute the operations that turn `before` into `after`.
///
/// Entries are paired by id. A paired entry whose content changed becomes an
/// update; an id missing from `after` becomes a delete; every entry without id
/// in `after` becomes a create, duplicates included. The plan lists deletes in
/// `before` order, then updates and creates in `after` order.
///
/// # Errors
///
/// - [`Error::MissingId`] if a `before` entry has no id.
/// - [`Error::DuplicateFetchedId`] if an id occurs twice in `before`.
/// - [`Error::DuplicateId`] if an id occurs twice in `after`.
/// - [`Error::UnknownId`] if an `after` id is not in `before`. The line is
///   the entry's source line, or 0 when it was not decoded from text.
pub fn diff(before: &[Entry], after: &[Entry]) -> Result<ChangePlan> {
    let mut by_id: HashMap<&WorklogId, &Entry> = HashMap::with_capacity(before.len());
    for entry in before {
        let Some(id) = entry.id() else {
            return Err(Error::MissingId {
                issue_key: entry.issue_key().to_string(),
            });
        };
        if by_id.insert(id, entry).is_some() {
            return Err(Error::DuplicateFetchedId { id: id.to_string() });
        }
    }

    let mut seen: HashSet<&WorklogId> = HashSet::with_capacity(after.len());
    let mut updates = Vec::new();
    let mut creates = Vec::new();

    for entry in after {
        let Some(id) = entry.id() else {
            creates.push(Change::Create {
                entry: entry.clone(),
            });
            continue;
        };
        if !seen.insert(id) {
            return Err(Error::DuplicateId { id: id.to_string() });
        }
        let Some(previous) = by_id.get(id) else {
            return Err(Error::UnknownId {
                id: id.to_string(),
                line: entry.source_line().unwrap_or(0),
            });
        };
        if *previous != entry {
            updates.push(Change::Update {
                id: id.clone(),
                previous: (*previous).clone(),
                entry: entry.clone(),
            });
        }
    }

    let deletes: Vec<Change> = before
        .iter()
        .filter_map(|entry| {
            let id = entry.id()?;
            (!seen.contains(id)).then(|| Change::Delete {
                id: id.clone(),
                previous: entry.clone(),
            })
        })
        .collect();

    let plan = ChangePlan::from_parts(deletes, updates, creates);
    let stats = plan.stats();
    debug!(
        deleted = stats.deleted,
        updated = stats.updated,
        created = stats.created,
        "Computed change plan"
    );
    Ok(plan)
}
