//! Persisting the edited buffer.
//!
//! When an output path is given the buffer is saved after every edit round,
//! so a crash or a failed apply never loses the user's text.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;

/// Write content to a file atomically.
///
/// The content goes to a sibling `.tmp` file, is synced to disk, and is then
/// renamed over `path`. If any step fails the previous file stays intact.
///
/// # Errors
///
/// Returns an error if any file operation fails.
pub fn atomic_write(path: &Path, content: &str) -> Result<()> {
    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    {
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(content.as_bytes())?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
    }

    fs::rename(&temp_path, path)?;
    Ok(())
}

/// Read a previously saved buffer.
///
/// # Errors
///
/// Returns an error if the file cannot be read as UTF-8 text.
pub fn read_buffer(path: &Path) -> Result<String> {
    Ok(fs::read_to_string(path)?)
}
