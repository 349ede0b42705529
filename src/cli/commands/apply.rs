//! Apply command: sync an edited file without opening an editor.
//!
//! This is the re-submission path after a failed or interrupted `edit`: the
//! file is diffed against the remote state as it is now, then rewritten with
//! the ids of the worklogs this run created.

use std::io::{self, BufRead};
use std::path::Path;

use tracing::info;

use super::edit::reconcile;
use super::{submit, Globals, SavedBuffer};
use crate::cli::ApplyArgs;
use crate::codec::Layout;
use crate::config::Settings;
use crate::error::Result;
use crate::model::DateRange;
use crate::sync::{read_buffer, RemoteWorklogPort};
use crate::tempo::TempoClient;

/// Execute the apply command against Tempo.
pub fn execute(args: &ApplyArgs, settings: &Settings, globals: Globals) -> Result<()> {
    let range = args.range.resolve(crate::cli::today())?;
    let text = read_buffer(&args.file)?;
    let mut client = TempoClient::new(settings.tempo()?)?;
    let stdin = io::stdin();

    run(
        &range,
        &mut client,
        &text,
        &args.file,
        settings.layout,
        globals,
        &mut stdin.lock(),
    )
}

pub(crate) fn run(
    range: &DateRange,
    port: &mut dyn RemoteWorklogPort,
    text: &str,
    source: &Path,
    layout: Layout,
    globals: Globals,
    input: &mut impl BufRead,
) -> Result<()> {
    let before = port.fetch(range)?;
    info!(count = before.len(), %range, file = %source.display(), "Applying edited file");
    let (after, plan) = reconcile(&before, text, layout)?;
    let saved = SavedBuffer {
        path: source,
        after: &after,
        layout,
    };
    submit(plan, &before, range, port, globals, input, Some(saved))
}
