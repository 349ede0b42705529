//! CLI definitions using clap.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::codec::Layout;
use crate::error::Result;
use crate::model::DateRange;

pub mod commands;

/// Edit Tempo worklogs as plain text in your editor
#[derive(Parser, Debug)]
#[command(name = "tempovi", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Arguments for the default `edit` command; ignored with a subcommand
    #[command(flatten)]
    pub edit: EditArgs,

    /// Config file (default: <config dir>/tempovi/config.json)
    #[arg(long, global = true, env = "TEMPOVI_CONFIG")]
    pub config: Option<PathBuf>,

    /// Tempo API account ID
    #[arg(long, global = true, env = "TEMPO_USER_ID")]
    pub user_id: Option<String>,

    /// Tempo API authentication token
    #[arg(long, global = true, env = "TEMPO_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Editor command, e.g. "vim" or "code --wait"
    #[arg(long, global = true, env = "EDITOR")]
    pub editor: Option<String>,

    /// Tempo API base URL
    #[arg(long, global = true, env = "TEMPOVI_BASE_URL", hide = true)]
    pub base_url: Option<String>,

    /// Text layout of the edited document
    #[arg(long, value_enum, global = true)]
    pub layout: Option<LayoutArg>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Show the change plan without applying it
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Do not ask before deleting every worklog in the range
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open the worklogs in an editor and sync the changes (default)
    Edit(EditArgs),

    /// Print the worklogs of a range in the editable format
    Dump(DumpArgs),

    /// Parse an edited file offline and show per-day totals
    Check {
        /// File to check
        file: PathBuf,
    },

    /// Sync a previously edited file against the current remote state
    Apply(ApplyArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct EditArgs {
    #[command(flatten)]
    pub range: RangeArgs,

    /// Keep a copy of the edited text here, saved after every edit and
    /// updated with the ids of created worklogs after syncing
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct DumpArgs {
    #[command(flatten)]
    pub range: RangeArgs,

    /// Write to this file instead of stdout
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub range: RangeArgs,

    /// Edited file to sync; rewritten with the ids of created worklogs
    pub file: PathBuf,
}

/// Date range selection shared by the remote commands.
#[derive(Args, Debug, Clone, Default)]
pub struct RangeArgs {
    /// Start date of the range (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// End date of the range (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Single date to edit (YYYY-MM-DD)
    #[arg(short = 'd', long = "date", visible_alias = "day")]
    pub date: Option<NaiveDate>,

    /// The entire current month
    #[arg(short = 'M', long)]
    pub month: bool,
}

impl RangeArgs {
    /// Resolve the flags against `today`.
    ///
    /// `--start`/`--end` win (a missing side is today), then `--date`, then
    /// `--month`; with no flag the range is today.
    ///
    /// # Errors
    ///
    /// Returns an invalid-argument error if the end is before the start.
    pub fn resolve(&self, today: NaiveDate) -> Result<DateRange> {
        if self.start.is_some() || self.end.is_some() {
            return DateRange::new(self.start.unwrap_or(today), self.end.unwrap_or(today));
        }
        if let Some(date) = self.date {
            return Ok(DateRange::day(date));
        }
        if self.month {
            return Ok(DateRange::month_of(today));
        }
        Ok(DateRange::day(today))
    }
}

/// Text layouts selectable on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutArg {
    /// One block per day under a date header
    Blocks,
    /// One table with the date on every line
    Flat,
}

impl From<LayoutArg> for Layout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Blocks => Self::Blocks,
            LayoutArg::Flat => Self::Flat,
        }
    }
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

impl From<Shell> for clap_complete::Shell {
    fn from(shell: Shell) -> Self {
        match shell {
            Shell::Bash => Self::Bash,
            Shell::Zsh => Self::Zsh,
            Shell::Fish => Self::Fish,
            Shell::PowerShell => Self::PowerShell,
            Shell::Elvish => Self::Elvish,
        }
    }
}

/// The current local date.
#[must_use]
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
