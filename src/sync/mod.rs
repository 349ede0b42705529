//! Reconciliation and synchronization with the remote worklog store.
//!
//! - **Port**: the [`RemoteWorklogPort`] boundary with its [`PortError`]s
//! - **Reconcile**: Before/After snapshots → ordered [`ChangePlan`]
//! - **Execute**: plan → remote calls, best-effort, one [`ApplyResult`]
//! - **Memory**: [`InMemoryPort`], a fake store honouring the port contract
//!
//! # Example
//!
//! ```ignore
//! use tempovi::sync::{apply, diff, InMemoryPort, RemoteWorklogPort};
//!
//! let before = port.fetch(&range)?;
//! let after = codec::decode(&edited, Layout::Blocks)?;
//! let plan = diff(&before, &after)?;
//! let result = apply(plan, &mut port);
//! ```

mod executor;
mod file;
mod memory;
mod plan;
mod port;
mod reconcile;

pub use executor::{apply, Applied, ApplyResult, Failed, Outcome};
pub use file::{atomic_write, read_buffer};
pub use memory::InMemoryPort;
pub use plan::{Change, ChangeKind, ChangePlan, PlanStats};
pub use port::{PortError, PortResult, RemoteWorklogPort};
pub use reconcile::diff;
