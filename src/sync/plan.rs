//! Change plans produced by the reconciler.

use std::fmt;

use serde::Serialize;

use crate::model::{format_duration, Entry, WorklogId};

/// One remote operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Change {
    /// Remove a worklog that is no longer in the edited text.
    Delete { id: WorklogId, previous: Entry },
    /// Overwrite a worklog whose content was edited.
    Update {
        id: WorklogId,
        previous: Entry,
        entry: Entry,
    },
    /// Create a worklog for a line without id.
    Create { entry: Entry },
}

/// Operation kind, used for summaries and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Delete,
    Update,
    Create,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delete => write!(f, "delete"),
            Self::Update => write!(f, "update"),
            Self::Create => write!(f, "create"),
        }
    }
}

impl Change {
    #[must_use]
    pub const fn kind(&self) -> ChangeKind {
        match self {
            Self::Delete { .. } => ChangeKind::Delete,
            Self::Update { .. } => ChangeKind::Update,
            Self::Create { .. } => ChangeKind::Create,
        }
    }

    /// Remote id the operation targets; `None` for creates.
    #[must_use]
    pub fn id(&self) -> Option<&WorklogId> {
        match self {
            Self::Delete { id, .. } | Self::Update { id, .. } => Some(id),
            Self::Create { .. } => None,
        }
    }

    /// The entry as it will look afterwards (the removed one for deletes).
    #[must_use]
    pub fn entry(&self) -> &Entry {
        match self {
            Self::Delete { previous, .. } => previous,
            Self::Update { entry, .. } | Self::Create { entry } => entry,
        }
    }
}

fn summary(entry: &Entry) -> String {
    let mut s = format!(
        "{} {} {}",
        entry.date(),
        format_duration(entry.duration()),
        entry.issue_key()
    );
    if !entry.description().is_empty() {
        s.push_str(&format!(" {:?}", entry.description()));
    }
    s
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delete { id, previous } => write!(f, "delete {id}: {}", summary(previous)),
            Self::Create { entry } => write!(f, "create: {}", summary(entry)),
            Self::Update {
                id,
                previous,
                entry,
            } => {
                write!(f, "update {id}:")?;
                for field in entry.changed_fields(previous) {
                    match field {
                        "date" => write!(f, " date {} -> {}", previous.date(), entry.date())?,
                        "duration" => write!(
                            f,
                            " duration {} -> {}",
                            format_duration(previous.duration()),
                            format_duration(entry.duration())
                        )?,
                        "issue" => {
                            write!(f, " issue {} -> {}", previous.issue_key(), entry.issue_key())?;
                        }
                        _ => write!(
                            f,
                            " description {:?} -> {:?}",
                            previous.description(),
                            entry.description()
                        )?,
                    }
                }
                Ok(())
            }
        }
    }
}

/// Counts per operation kind.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanStats {
    pub deleted: usize,
    pub updated: usize,
    pub created: usize,
}

impl PlanStats {
    #[must_use]
    pub fn total(&self) -> usize {
        self.deleted + self.updated + self.created
    }
}

/// Ordered operations: all deletes, then updates, then creates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ChangePlan {
    changes: Vec<Change>,
}

impl ChangePlan {
    /// Assemble a plan in delete, update, create order.
    #[must_use]
    pub fn from_parts(deletes: Vec<Change>, updates: Vec<Change>, creates: Vec<Change>) -> Self {
        let mut changes = deletes;
        changes.extend(updates);
        changes.extend(creates);
        Self { changes }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Change> {
        self.changes.iter()
    }

    #[must_use]
    pub fn stats(&self) -> PlanStats {
        let mut stats = PlanStats::default();
        for change in &self.changes {
            match change.kind() {
                ChangeKind::Delete => stats.deleted += 1,
                ChangeKind::Update => stats.updated += 1,
                ChangeKind::Create => stats.created += 1,
            }
        }
        stats
    }

    /// True when the plan only deletes, and deletes every one of `before`.
    #[must_use]
    pub fn clears_all(&self, before: &[Entry]) -> bool {
        let stats = self.stats();
        !before.is_empty() && stats.deleted == before.len() && stats.total() == stats.deleted
    }
}

impl IntoIterator for ChangePlan {
    type Item = Change;
    type IntoIter = std::vec::IntoIter<Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.into_iter()
    }
}

impl<'a> IntoIterator for &'a ChangePlan {
    type Item = &'a Change;
    type IntoIter = std::slice::Iter<'a, Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}
