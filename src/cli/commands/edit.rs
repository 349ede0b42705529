//! Edit command: fetch, edit in an external editor, reconcile, sync.

use std::io::{self, BufRead, Write};
use std::path::Path;

use colored::Colorize;
use tracing::{debug, info};

use super::{submit, Globals, SavedBuffer};
use crate::cli::EditArgs;
use crate::codec::{self, Layout};
use crate::config::Settings;
use crate::editor::EditSession;
use crate::error::{Error, Result};
use crate::model::{DateRange, Entry};
use crate::sync::{atomic_write, diff, ChangePlan, RemoteWorklogPort};
use crate::tempo::TempoClient;

const RETRY_PROMPT: &str = "Press enter to edit the file again, ^C to exit";

/// Execute the edit command against Tempo.
pub fn execute(args: &EditArgs, settings: &Settings, globals: Globals) -> Result<()> {
    let range = args.range.resolve(crate::cli::today())?;
    let mut client = TempoClient::new(settings.tempo()?)?;
    let session = EditSession::new(&settings.editor)?;
    let stdin = io::stdin();

    run(
        &range,
        &mut client,
        &session,
        args.output.as_deref(),
        settings.layout,
        globals,
        &mut stdin.lock(),
    )
}

/// The full flow against any port and editor session.
pub(crate) fn run(
    range: &DateRange,
    port: &mut dyn RemoteWorklogPort,
    session: &EditSession,
    output: Option<&Path>,
    layout: Layout,
    globals: Globals,
    input: &mut impl BufRead,
) -> Result<()> {
    let before = port.fetch(range)?;
    info!(count = before.len(), %range, "Fetched worklogs");

    let text = codec::encode(&before, range, layout);
    let mut edited = session.edit(&text)?;

    let (after, plan) = loop {
        if let Some(path) = output {
            atomic_write(path, &edited)?;
            debug!(path = %path.display(), "Saved edited buffer");
        }

        match reconcile(&before, &edited, layout) {
            Ok(reconciled) => break reconciled,
            Err(e) if e.is_fixable_in_editor() => {
                report_fixable(&e);
                if !wait_for_retry(input)? {
                    return Err(e);
                }
                edited = session.reopen()?;
            }
            Err(e) => return Err(e),
        }
    };

    let saved = output.map(|path| SavedBuffer {
        path,
        after: &after,
        layout,
    });
    submit(plan, &before, range, port, globals, input, saved)
}

/// Decode the edited text and diff it against `before`.
///
/// # Errors
///
/// Returns the format or consistency error that stops reconciliation.
pub(crate) fn reconcile(
    before: &[Entry],
    text: &str,
    layout: Layout,
) -> Result<(Vec<Entry>, ChangePlan)> {
    let after = codec::decode(text, layout)?;
    let plan = diff(before, &after)?;
    Ok((after, plan))
}

fn report_fixable(err: &Error) {
    eprintln!("{} {err}", "Error:".red().bold());
    if let Some(hint) = err.hint() {
        eprintln!("  {} {hint}", "Hint:".yellow());
    }
}

/// `false` once stdin is closed.
fn wait_for_retry(input: &mut impl BufRead) -> Result<bool> {
    eprint!("{RETRY_PROMPT}");
    io::stderr().flush()?;
    let mut line = String::new();
    Ok(input.read_line(&mut line)? > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::InMemoryPort;
    use chrono::{Duration, NaiveDate};
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn d() -> NaiveDate {
        NaiveDate::from_ymd_opt(2019, 7, 18).unwrap()
    }

    fn seeded() -> InMemoryPort {
        let mut port = InMemoryPort::new();
        port.insert(Entry::new(None, d(), Duration::minutes(30), "GAUS-538", "work").unwrap());
        port
    }

    fn quiet() -> Globals {
        Globals {
            quiet: true,
            ..Globals::default()
        }
    }

    /// An editor that replaces the buffer with the content of `source`.
    #[cfg(unix)]
    fn replacing_editor(dir: &TempDir, source: &str) -> EditSession {
        let replacement = dir.path().join("replacement.txt");
        fs::write(&replacement, source).unwrap();
        EditSession::new(&format!("cp {}", replacement.display())).unwrap()
    }

    #[test]
    fn test_reconcile_unchanged_text_is_empty() {
        let mut port = seeded();
        let range = DateRange::day(d());
        let before = port.fetch(&range).unwrap();
        let text = codec::encode(&before, &range, Layout::Blocks);
        let (after, plan) = reconcile(&before, &text, Layout::Blocks).unwrap();
        assert_eq!(after.len(), 1);
        assert!(plan.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_run_applies_edits_and_saves_output() {
        let dir = TempDir::new().unwrap();
        let session = replacing_editor(
            &dir,
            "# 2019-07-18\n1 | 1:00:00 | GAUS-538 | work\n  | 1:00:00 | GAUS-570 | work\n",
        );
        let output = dir.path().join("saved.txt");
        let mut port = seeded();

        run(
            &DateRange::day(d()),
            &mut port,
            &session,
            Some(&output),
            Layout::Blocks,
            quiet(),
            &mut Cursor::new(""),
        )
        .unwrap();

        assert_eq!(port.entries().len(), 2);
        assert_eq!(port.entries()[0].duration(), Duration::hours(1));
        assert_eq!(port.entries()[1].issue_key(), "GAUS-570");
        assert!(fs::read_to_string(&output).unwrap().contains("GAUS-570"));
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_output_carries_created_ids_after_partial_failure() {
        let dir = TempDir::new().unwrap();
        let session = replacing_editor(
            &dir,
            "# 2019-07-18\n1 | 0:30:00 | GAUS-538 | work\n | 0:10:00 | OK-1 | a\n | 0:20:00 | BAD-1 | b\n",
        );
        let output = dir.path().join("saved.txt");
        let range = DateRange::day(d());
        let mut port = seeded();
        port.reject_issue("BAD-1");

        let err = run(
            &range,
            &mut port,
            &session,
            Some(&output),
            Layout::Blocks,
            quiet(),
            &mut Cursor::new(""),
        )
        .unwrap_err();
        assert!(matches!(err, Error::ApplyFailed { failed: 1, total: 2 }));

        let saved = fs::read_to_string(&output).unwrap();
        let entries = codec::decode(&saved, Layout::Blocks).unwrap();
        let ok = entries.iter().find(|e| e.issue_key() == "OK-1").unwrap();
        let bad = entries.iter().find(|e| e.issue_key() == "BAD-1").unwrap();
        assert_eq!(ok.id().map(ToString::to_string), Some("2".to_string()));
        assert_eq!(bad.id(), None);

        // Re-submitting the saved buffer plans only the failed create.
        let fresh = port.fetch(&range).unwrap();
        let (_, plan) = reconcile(&fresh, &saved, Layout::Blocks).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.iter().next().unwrap().entry().issue_key(), "BAD-1");

        let err = super::super::apply::run(
            &range,
            &mut port,
            &saved,
            &output,
            Layout::Blocks,
            quiet(),
            &mut Cursor::new(""),
        )
        .unwrap_err();
        assert!(matches!(err, Error::ApplyFailed { failed: 1, total: 1 }));
        let ids: Vec<String> = port
            .entries()
            .iter()
            .filter_map(|e| e.id().map(ToString::to_string))
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_unfixed_format_error_is_returned_when_stdin_closes() {
        let dir = TempDir::new().unwrap();
        let session = replacing_editor(&dir, "# 2019-07-18\n1 | soon | GAUS-538 | work\n");
        let mut port = seeded();

        let err = run(
            &DateRange::day(d()),
            &mut port,
            &session,
            None,
            Layout::Blocks,
            quiet(),
            &mut Cursor::new(""),
        )
        .unwrap_err();

        assert!(matches!(err, Error::Format { line: 2, .. }));
        assert_eq!(port.entries()[0].duration(), Duration::minutes(30));
    }

    #[cfg(unix)]
    #[test]
    fn test_retry_reopens_the_same_buffer() {
        let dir = TempDir::new().unwrap();
        // Appends an unknown id on every round, so each retry fails again.
        let script = dir.path().join("append.sh");
        fs::write(&script, "echo '99 | 0:10:00 | X-1 |' >> \"$1\"\n").unwrap();
        let session = EditSession::new(&format!("sh {}", script.display())).unwrap();
        let mut port = seeded();

        let err = run(
            &DateRange::day(d()),
            &mut port,
            &session,
            None,
            Layout::Blocks,
            quiet(),
            &mut Cursor::new("\n"),
        )
        .unwrap_err();

        assert!(matches!(err, Error::UnknownId { .. }));
        let buffer = fs::read_to_string(session.path()).unwrap();
        assert_eq!(buffer.matches("99 | 0:10:00").count(), 2);
    }

    #[test]
    fn test_fetch_failure_aborts_before_editing() {
        let session = EditSession::new("tempovi-no-such-editor-binary").unwrap();
        let mut port = seeded();
        port.set_offline(true);

        let err = run(
            &DateRange::day(d()),
            &mut port,
            &session,
            None,
            Layout::Blocks,
            quiet(),
            &mut Cursor::new(""),
        )
        .unwrap_err();

        assert!(matches!(err, Error::Transport(_)));
    }
}
