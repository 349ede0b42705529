//! The remote-service boundary.
//!
//! Everything the reconciliation core needs from the time-tracking service
//! goes through [`RemoteWorklogPort`]. The HTTP client in [`crate::tempo`] and
//! the in-memory fake in [`super::InMemoryPort`] both implement it.

use crate::model::{DateRange, Entry, WorklogId};

/// Failures reported by a port implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    /// Network, authentication, or unexpected server failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The worklog does not exist (anymore) on the remote side.
    #[error("worklog {id} not found")]
    NotFound { id: String },

    /// The remote service refused the worklog, e.g. an unknown issue key.
    #[error("rejected by remote: {0}")]
    RemoteValidation(String),
}

/// Result type for port calls.
pub type PortResult<T> = std::result::Result<T, PortError>;

/// Create/read/update/delete access to the user's worklogs.
///
/// Calls are blocking and issued one at a time by the executor.
pub trait RemoteWorklogPort {
    /// All worklogs in `range`; every returned entry carries an id.
    fn fetch(&mut self, range: &DateRange) -> PortResult<Vec<Entry>>;

    /// Create a worklog and return the id assigned by the remote side.
    fn create(&mut self, entry: &Entry) -> PortResult<WorklogId>;

    /// Overwrite the content of an existing worklog.
    fn update(&mut self, id: &WorklogId, entry: &Entry) -> PortResult<()>;

    fn delete(&mut self, id: &WorklogId) -> PortResult<()>;
}
