//! Error types for tempovi.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (3=not_found, 4=format, 5=consistency, etc.)
//! - Retryability flags (can the user fix the text and try again?)
//! - Context-aware recovery hints
//! - Structured JSON output for `--json` consumers

use thiserror::Error;

use crate::sync::PortError;

/// Result type alias for tempovi operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
///
/// Each code maps to a SCREAMING_SNAKE string and a category-based
/// exit code. Scripts match on the string or on the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Not Found (exit 3)
    WorklogNotFound,

    // Validation (exit 4)
    InvalidEntry,
    InvalidFormat,
    InvalidArgument,

    // Consistency (exit 5)
    UnknownId,
    DuplicateId,
    MissingId,

    // Remote (exit 6)
    TransportError,
    RemoteRejected,
    ApplyFailed,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Editor (exit 9)
    EditorError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::WorklogNotFound => "WORKLOG_NOT_FOUND",
            Self::InvalidEntry => "INVALID_ENTRY",
            Self::InvalidFormat => "INVALID_FORMAT",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::UnknownId => "UNKNOWN_ID",
            Self::DuplicateId => "DUPLICATE_ID",
            Self::MissingId => "MISSING_ID",
            Self::TransportError => "TRANSPORT_ERROR",
            Self::RemoteRejected => "REMOTE_REJECTED",
            Self::ApplyFailed => "APPLY_FAILED",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::EditorError => "EDITOR_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code (1-9).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::WorklogNotFound => 3,
            Self::InvalidEntry | Self::InvalidFormat | Self::InvalidArgument => 4,
            Self::UnknownId | Self::DuplicateId | Self::MissingId => 5,
            Self::TransportError | Self::RemoteRejected | Self::ApplyFailed => 6,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
            Self::EditorError => 9,
        }
    }

    /// Whether the user can fix the input and simply run again.
    ///
    /// True for everything caused by the edited text. A re-run is also safe
    /// after a partial apply, because the next run diffs against fresh state.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::InvalidEntry
                | Self::InvalidFormat
                | Self::InvalidArgument
                | Self::UnknownId
                | Self::DuplicateId
                | Self::MissingId
                | Self::TransportError
                | Self::ApplyFailed
        )
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in tempovi operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A worklog field failed validation at construction time.
    #[error("Invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    /// The edited text could not be parsed.
    #[error("Line {line}: {message}: {text:?}")]
    Format {
        /// 1-based line number.
        line: usize,
        /// The raw line as the user wrote it.
        text: String,
        message: String,
    },

    #[error("Worklog id {id} on line {line} does not exist in the fetched range")]
    UnknownId { id: String, line: usize },

    #[error("Worklog id {id} appears more than once")]
    DuplicateId { id: String },

    /// The remote service returned the same id twice; editing cannot fix it.
    #[error("Fetched worklogs contain id {id} more than once")]
    DuplicateFetchedId { id: String },

    #[error("Fetched worklog for {issue_key} has no id")]
    MissingId { issue_key: String },

    #[error("Worklog not found: {id}")]
    NotFound { id: String },

    #[error("Remote service error: {0}")]
    Transport(String),

    #[error("Remote service rejected the worklog: {0}")]
    RemoteValidation(String),

    #[error("{failed} of {total} operations failed")]
    ApplyFailed { failed: usize, total: usize },

    #[error("Editor error: {0}")]
    Editor(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for a field validation failure.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Shorthand for a parse failure on a given line.
    pub fn format(line: usize, text: &str, message: impl Into<String>) -> Self {
        Self::Format {
            line,
            text: text.to_string(),
            message: message.into(),
        }
    }

    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Validation { .. } => ErrorCode::InvalidEntry,
            Self::Format { .. } => ErrorCode::InvalidFormat,
            Self::UnknownId { .. } => ErrorCode::UnknownId,
            Self::DuplicateId { .. } | Self::DuplicateFetchedId { .. } => ErrorCode::DuplicateId,
            Self::MissingId { .. } => ErrorCode::MissingId,
            Self::NotFound { .. } => ErrorCode::WorklogNotFound,
            Self::Transport(_) => ErrorCode::TransportError,
            Self::RemoteValidation(_) => ErrorCode::RemoteRejected,
            Self::ApplyFailed { .. } => ErrorCode::ApplyFailed,
            Self::Editor(_) => ErrorCode::EditorError,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// True for errors the user fixes by editing the text again.
    #[must_use]
    pub const fn is_fixable_in_editor(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::Format { .. }
                | Self::UnknownId { .. }
                | Self::DuplicateId { .. }
        )
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::Format { message, .. } if message.contains("duration") => Some(
                "Durations are written as H:MM:SS, e.g. 0:30:00 or 12:05:00".to_string(),
            ),
            Self::Format { message, .. } if message.contains("day header") => Some(
                "Every worklog line must sit below a `# YYYY-MM-DD` day header".to_string(),
            ),
            Self::Format { message, .. } if message.contains("fields") => Some(
                "Each line needs one value per column of the `# id | duration | ...` header"
                    .to_string(),
            ),
            Self::Format { .. } | Self::Validation { .. } => None,

            Self::UnknownId { .. } => Some(
                "Ids come from the remote service. Leave the id column empty to add a new worklog."
                    .to_string(),
            ),
            Self::DuplicateId { id } => Some(format!(
                "Keep id {id} on one line only. Copy the line with an empty id to log the same work twice."
            )),

            Self::Config(msg) if msg.contains("api_key") || msg.contains("user_id") => Some(
                "Pass --user-id/--api-key, set TEMPO_USER_ID/TEMPO_API_KEY, \
                 or add them to the config file"
                    .to_string(),
            ),

            Self::Editor(_) => Some(
                "Set the editor with --editor, $EDITOR, or `editor` in the config file".to_string(),
            ),

            Self::ApplyFailed { .. } => Some(
                "Run tempovi again, or re-submit the saved file with `tempovi apply FILE`: \
                 it now carries the ids of created worklogs, so applied changes are not repeated"
                    .to_string(),
            ),

            Self::Transport(msg) if msg.contains("401") || msg.contains("403") => {
                Some("Check that the API token is valid and not expired".to_string())
            }

            Self::Config(_)
            | Self::DuplicateFetchedId { .. }
            | Self::MissingId { .. }
            | Self::NotFound { .. }
            | Self::Transport(_)
            | Self::RemoteValidation(_)
            | Self::InvalidArgument(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    ///
    /// Includes error code, message, retryability, exit code, and
    /// optional recovery hint.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}

impl From<PortError> for Error {
    fn from(err: PortError) -> Self {
        match err {
            PortError::Transport(msg) => Self::Transport(msg),
            PortError::NotFound { id } => Self::NotFound { id },
            PortError::RemoteValidation(msg) => Self::RemoteValidation(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_mentions_line_and_text() {
        let err = Error::format(3, "| 0:30:00 | |", "issue key is empty");
        let msg = err.to_string();
        assert!(msg.contains("Line 3"));
        assert!(msg.contains("| 0:30:00 | |"));
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_consistency_errors_share_exit_code() {
        let unknown = Error::UnknownId {
            id: "42".into(),
            line: 7,
        };
        let dup = Error::DuplicateId { id: "42".into() };
        assert_eq!(unknown.exit_code(), 5);
        assert_eq!(dup.exit_code(), 5);
        assert!(unknown.is_fixable_in_editor());
        assert!(unknown.hint().is_some());
        assert!(dup.is_fixable_in_editor());
    }

    #[test]
    fn test_duplicate_fetched_id_is_not_fixable_in_editor() {
        let err = Error::DuplicateFetchedId { id: "42".into() };
        assert_eq!(err.exit_code(), 5);
        assert_eq!(err.error_code(), ErrorCode::DuplicateId);
        assert!(!err.is_fixable_in_editor());
        assert!(err.hint().is_none());
    }

    #[test]
    fn test_port_error_conversion() {
        let err: Error = PortError::NotFound { id: "9".into() }.into();
        assert!(matches!(err, Error::NotFound { ref id } if id == "9"));
        assert!(!err.is_fixable_in_editor());
    }

    #[test]
    fn test_structured_json_includes_hint() {
        let err = Error::format(1, "x", "invalid duration \"1:2\"");
        let json = err.to_structured_json();
        assert_eq!(json["error"]["code"], "INVALID_FORMAT");
        assert_eq!(json["error"]["exit_code"], 4);
        assert_eq!(json["error"]["retryable"], true);
        assert!(json["error"]["hint"].as_str().unwrap().contains("H:MM:SS"));
    }

    #[test]
    fn test_apply_failed_is_retryable() {
        let err = Error::ApplyFailed { failed: 1, total: 3 };
        assert_eq!(err.to_string(), "1 of 3 operations failed");
        assert!(err.error_code().is_retryable());
        assert_eq!(err.exit_code(), 6);
    }
}
