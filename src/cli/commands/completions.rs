//! `tempovi completions`: print a shell completion script.

use crate::cli::{Cli, Shell};
use crate::error::Result;
use clap::CommandFactory;
use std::io::{self, Write};

const BIN_NAME: &str = "tempovi";

/// Print completions for `shell` to stdout.
pub fn execute(shell: &Shell) -> Result<()> {
    render(*shell, &mut io::stdout().lock());
    Ok(())
}

fn render(shell: Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    clap_complete::generate(clap_complete::Shell::from(shell), &mut cmd, BIN_NAME, out);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bash_script_names_subcommands() {
        let mut out = Vec::new();
        render(Shell::Bash, &mut out);
        let script = String::from_utf8(out).unwrap();
        assert!(script.contains(BIN_NAME));
        assert!(script.contains("dump"));
        assert!(script.contains("apply"));
    }

    #[test]
    fn test_every_shell_renders() {
        for shell in [Shell::Zsh, Shell::Fish, Shell::PowerShell, Shell::Elvish] {
            let mut out = Vec::new();
            render(shell, &mut out);
            assert!(!out.is_empty());
        }
    }
}
