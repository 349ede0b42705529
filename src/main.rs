//! tempovi CLI entry point.

use clap::Parser;
use std::process::ExitCode;
use tempovi::cli::commands::{self, Globals};
use tempovi::cli::{Cli, Commands};
use tempovi::config::{default_config_path, load_config, Config, Overrides, Settings};
use tempovi::error::Error;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Set up tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                eprintln!("{}", e.to_structured_json());
            } else if !cli.quiet {
                if let Some(hint) = e.hint() {
                    eprintln!("Error: {e}\n  Hint: {hint}");
                } else {
                    eprintln!("Error: {e}");
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug,hyper=info,reqwest=info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

/// Resolve settings from flags, the config file, and defaults.
fn settings(cli: &Cli) -> Result<Settings, Error> {
    let file = match &cli.config {
        Some(path) => load_config(path)?,
        None => match default_config_path() {
            Ok(path) => load_config(&path)?,
            Err(_) => Config::default(),
        },
    };

    let overrides = Overrides {
        user_id: cli.user_id.clone(),
        api_key: cli.api_key.clone(),
        editor: cli.editor.clone(),
        base_url: cli.base_url.clone(),
        layout: cli.layout.map(Into::into),
    };

    Ok(Settings::resolve(overrides, file))
}

fn run(cli: &Cli) -> Result<(), Error> {
    let globals = Globals {
        json: cli.json,
        dry_run: cli.dry_run,
        yes: cli.yes,
        quiet: cli.quiet,
    };

    match &cli.command {
        // Shell completions need no configuration
        Some(Commands::Completions { shell }) => commands::completions::execute(shell),

        Some(Commands::Check { file }) => {
            let settings = settings(cli)?;
            commands::check::execute(file, settings.layout, cli.json, cli.quiet)
        }
        Some(Commands::Dump(args)) => commands::dump::execute(args, &settings(cli)?, cli.json),
        Some(Commands::Apply(args)) => commands::apply::execute(args, &settings(cli)?, globals),
        Some(Commands::Edit(args)) => commands::edit::execute(args, &settings(cli)?, globals),
        None => commands::edit::execute(&cli.edit, &settings(cli)?, globals),
    }
}
