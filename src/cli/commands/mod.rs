//! Command implementations.
//!
//! Shared pieces of the sync commands live here: output options, plan and
//! totals rendering, prompts, and the submit step used by `edit` and `apply`.

pub mod apply;
pub mod check;
pub mod completions;
pub mod dump;
pub mod edit;

use std::io::{self, BufRead, Write};
use std::path::Path;

use chrono::{Duration, NaiveDate};
use colored::Colorize;
use serde::Serialize;
use tracing::{info, warn};

use crate::codec::{self, Layout};
use crate::error::{Error, Result};
use crate::model::{day_total, format_duration, DateRange, Entry};
use crate::sync::{
    self, atomic_write, ApplyResult, Change, ChangeKind, ChangePlan, PlanStats, RemoteWorklogPort,
};

/// Output-related global flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct Globals {
    pub json: bool,
    pub dry_run: bool,
    pub yes: bool,
    pub quiet: bool,
}

/// An edited file on disk and the entries it decoded to.
///
/// After applying, the file is rewritten with the ids of created worklogs so
/// that submitting it again does not repeat those creates.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SavedBuffer<'a> {
    pub path: &'a Path,
    pub after: &'a [Entry],
    pub layout: Layout,
}

impl SavedBuffer<'_> {
    fn record(&self, result: &ApplyResult, range: &DateRange) -> Result<()> {
        let resolved = result.resolve_created(self.after);
        atomic_write(self.path, &codec::encode(&resolved, range, self.layout))?;
        info!(path = %self.path.display(), "Saved edited buffer with created ids");
        Ok(())
    }
}

/// Per-day total for reports.
#[derive(Debug, Serialize)]
pub(crate) struct DayTotal {
    date: NaiveDate,
    entries: usize,
    total: String,
    total_seconds: i64,
    #[serde(skip)]
    duration: Duration,
}

/// Totals for every day of `dates`, in order.
pub(crate) fn day_totals(
    entries: &[Entry],
    dates: impl IntoIterator<Item = NaiveDate>,
) -> Vec<DayTotal> {
    dates
        .into_iter()
        .map(|date| {
            let total = day_total(entries, date);
            DayTotal {
                date,
                entries: entries.iter().filter(|e| e.date() == date).count(),
                total: format_duration(total),
                total_seconds: total.num_seconds(),
                duration: total,
            }
        })
        .collect()
}

pub(crate) fn print_totals(totals: &[DayTotal]) {
    let mut sum = Duration::zero();
    for day in totals {
        sum += day.duration;
        let entries = format!("({} worklogs)", day.entries);
        println!("{}  {:>9}  {}", day.date, day.total, entries.dimmed());
    }
    println!(
        "{}  {}",
        format!("{:<10}", "Total").bold(),
        format!("{:>9}", format_duration(sum)).bold()
    );
}

fn print_change(change: &Change) {
    let line = change.to_string();
    match change.kind() {
        ChangeKind::Delete => println!("  {} {}", "-".red(), line.red()),
        ChangeKind::Update => println!("  {} {}", "~".yellow(), line.yellow()),
        ChangeKind::Create => println!("  {} {}", "+".green(), line.green()),
    }
}

pub(crate) fn print_plan(plan: &ChangePlan) {
    let stats = plan.stats();
    println!(
        "{} ({} delete, {} update, {} create)",
        "Changes".bold(),
        stats.deleted,
        stats.updated,
        stats.created
    );
    for change in plan {
        print_change(change);
    }
}

/// Ask a yes/no question on stderr; anything but `y`/`yes` is no.
///
/// # Errors
///
/// Returns an I/O error if stdin cannot be read.
pub(crate) fn confirm(input: &mut impl BufRead, question: &str) -> Result<bool> {
    eprint!("{question} [y/N] ");
    io::stderr().flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

#[derive(Serialize)]
struct SubmitOutput<'a> {
    dry_run: bool,
    stats: PlanStats,
    plan: &'a ChangePlan,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'a ApplyResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    totals: Option<Vec<DayTotal>>,
}

/// Show, confirm, apply, and report a plan.
///
/// `before` is the snapshot the plan was computed from. A full clear needs
/// confirmation on `input` unless `--yes` was given. After applying, `saved`
/// is rewritten with the new ids, then the range is fetched again and its
/// totals are printed.
///
/// # Errors
///
/// Returns [`Error::ApplyFailed`] if any operation failed.
pub(crate) fn submit(
    plan: ChangePlan,
    before: &[Entry],
    range: &DateRange,
    port: &mut dyn RemoteWorklogPort,
    globals: Globals,
    input: &mut impl BufRead,
    saved: Option<SavedBuffer<'_>>,
) -> Result<()> {
    let stats = plan.stats();

    if plan.is_empty() {
        if globals.json {
            let output = SubmitOutput {
                dry_run: globals.dry_run,
                stats,
                plan: &plan,
                result: None,
                totals: None,
            };
            println!("{}", serde_json::to_string(&output)?);
        } else if !globals.quiet {
            println!("No changes.");
        }
        return Ok(());
    }

    if globals.dry_run {
        if globals.json {
            let output = SubmitOutput {
                dry_run: true,
                stats,
                plan: &plan,
                result: None,
                totals: None,
            };
            println!("{}", serde_json::to_string(&output)?);
        } else {
            print_plan(&plan);
            println!("{}", "Dry run: nothing was applied.".dimmed());
        }
        return Ok(());
    }

    if !globals.json && !globals.quiet {
        print_plan(&plan);
    }

    if plan.clears_all(before) && !globals.yes {
        let question = format!("Delete all {} worklogs in {range}?", before.len());
        if !confirm(input, &question)? {
            if !globals.quiet {
                println!("Aborted, nothing was changed.");
            }
            return Ok(());
        }
    }

    let shown = plan.clone();
    let result = sync::apply(plan, &mut *port);

    if let Some(saved) = saved {
        if let Err(e) = saved.record(&result, range) {
            warn!(error = %e, path = %saved.path.display(), "Could not update the saved buffer");
        }
    }

    let totals = match port.fetch(range) {
        Ok(fresh) => Some(day_totals(&fresh, range.days())),
        Err(e) => {
            warn!(error = %e, "Could not re-fetch worklogs after apply");
            None
        }
    };

    if globals.json {
        let output = SubmitOutput {
            dry_run: false,
            stats,
            plan: &shown,
            result: Some(&result),
            totals,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else if !globals.quiet {
        println!(
            "Applied {} of {} changes.",
            result.succeeded.len(),
            result.total()
        );
        for failed in &result.failed {
            eprintln!("  {} {}: {}", "!".red().bold(), failed.change, failed.error);
        }
        if let Some(totals) = totals {
            println!();
            print_totals(&totals);
        }
    }

    if result.is_success() {
        Ok(())
    } else {
        Err(Error::ApplyFailed {
            failed: result.failed.len(),
            total: result.total(),
        })
    }
}
