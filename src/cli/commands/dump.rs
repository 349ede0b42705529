//! Dump command implementation.

use serde::Serialize;
use tracing::info;

use crate::cli::DumpArgs;
use crate::codec::{self, Layout};
use crate::config::Settings;
use crate::error::Result;
use crate::model::{DateRange, Entry};
use crate::sync::{atomic_write, RemoteWorklogPort};
use crate::tempo::TempoClient;

#[derive(Serialize)]
struct DumpOutput<'a> {
    range: DateRange,
    count: usize,
    worklogs: &'a [Entry],
}

/// Execute dump command.
pub fn execute(args: &DumpArgs, settings: &Settings, json: bool) -> Result<()> {
    let range = args.range.resolve(crate::cli::today())?;
    let mut client = TempoClient::new(settings.tempo()?)?;
    let rendered = render(&range, &mut client, settings.layout, json)?;

    match &args.output {
        Some(path) => {
            atomic_write(path, &rendered)?;
            info!(path = %path.display(), "Wrote worklogs");
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

/// Fetch `range` and render it as editable text, or as JSON.
fn render(
    range: &DateRange,
    port: &mut dyn RemoteWorklogPort,
    layout: Layout,
    json: bool,
) -> Result<String> {
    let worklogs = port.fetch(range)?;

    if json {
        let output = DumpOutput {
            range: *range,
            count: worklogs.len(),
            worklogs: &worklogs,
        };
        return Ok(format!("{}\n", serde_json::to_string(&output)?));
    }
    Ok(codec::encode(&worklogs, range, layout))
}
