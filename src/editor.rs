//! External editor session.
//!
//! The buffer lives in a private temporary directory that is removed when the
//! session is dropped, whatever way the run ends.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;
use tracing::debug;

use crate::error::{Error, Result};

const BUFFER_NAME: &str = "report.txt";

/// A scoped temp buffer plus the editor command that edits it.
pub struct EditSession {
    _dir: TempDir,
    path: PathBuf,
    program: String,
    args: Vec<String>,
}

impl EditSession {
    /// Prepare a session for `editor`, e.g. `vim` or `code --wait`.
    ///
    /// The command is split on whitespace; the buffer path is appended as the
    /// last argument.
    ///
    /// # Errors
    ///
    /// Returns an editor error for an empty command, or an I/O error if the
    /// temporary directory cannot be created.
    pub fn new(editor: &str) -> Result<Self> {
        let mut words = editor.split_whitespace().map(str::to_string);
        let program = words
            .next()
            .ok_or_else(|| Error::Editor("editor command is empty".into()))?;
        let dir = tempfile::Builder::new().prefix("tempovi-").tempdir()?;
        let path = dir.path().join(BUFFER_NAME);
        Ok(Self {
            _dir: dir,
            path,
            program,
            args: words.collect(),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the buffer, open the editor, and return what was saved.
    ///
    /// # Errors
    ///
    /// See [`EditSession::reopen`].
    pub fn edit(&self, text: &str) -> Result<String> {
        fs::write(&self.path, text)?;
        self.reopen()
    }

    /// Open the editor on the buffer as it is, and return what was saved.
    ///
    /// # Errors
    ///
    /// Returns an editor error if the editor cannot be started, exits with a
    /// non-zero status, or leaves an unreadable buffer.
    pub fn reopen(&self) -> Result<String> {
        debug!(program = %self.program, path = %self.path.display(), "Launching editor");
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(&self.path)
            .status()
            .map_err(|e| Error::Editor(format!("failed to start {:?}: {e}", self.program)))?;

        if !status.success() {
            return Err(Error::Editor(format!(
                "{} exited with {status}",
                self.program
            )));
        }

        fs::read_to_string(&self.path)
            .map_err(|e| Error::Editor(format!("cannot read edited file: {e}")))
    }
}
