//! Domain model for worklog editing.
//!
//! - [`Entry`] / [`WorklogId`]: one worklog and its remote identity
//! - [`DateRange`]: the inclusive span of days being edited
//! - [`duration`]: `H:MM:SS` rendering and parsing

pub mod duration;
pub mod entry;
pub mod range;

pub use duration::{format_duration, parse_duration};
pub use entry::{day_total, Entry, WorklogId};
pub use range::DateRange;
