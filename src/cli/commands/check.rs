//! Check command: validate an edited file without touching the remote side.

use std::path::Path;

use serde::Serialize;

use super::{day_totals, print_totals, DayTotal};
use crate::codec::{self, Layout};
use crate::error::Result;
use crate::model::format_duration;
use crate::sync::read_buffer;

#[derive(Serialize)]
struct CheckOutput {
    valid: bool,
    entries: usize,
    new_entries: usize,
    days: Vec<DayTotal>,
    total: String,
}

/// Execute check command.
pub fn execute(file: &Path, layout: Layout, json: bool, quiet: bool) -> Result<()> {
    let text = read_buffer(file)?;
    let entries = codec::decode(&text, layout)?;

    let mut dates: Vec<_> = entries.iter().map(|e| e.date()).collect();
    dates.sort_unstable();
    dates.dedup();

    let days = day_totals(&entries, dates);
    let new_entries = entries.iter().filter(|e| e.id().is_none()).count();

    if json {
        let total = entries
            .iter()
            .fold(chrono::Duration::zero(), |acc, e| acc + e.duration());
        let output = CheckOutput {
            valid: true,
            entries: entries.len(),
            new_entries,
            days,
            total: format_duration(total),
        };
        println!("{}", serde_json::to_string(&output)?);
    } else if !quiet {
        println!(
            "{}: {} worklogs, {} new",
            file.display(),
            entries.len(),
            new_entries
        );
        if !days.is_empty() {
            println!();
            print_totals(&days);
        }
    }

    Ok(())
}
