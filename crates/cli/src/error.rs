//! Structured CLI errors with meaningful exit codes.
//!
//! Exit code scheme:
//! - 0:  success
//! - 2:  clap arg parse error (automatic, before our code runs)
//! - 10: extraction error (rejected native buffer, oversized capture)
//! - 11: I/O error (reading a snapshot or dump)
//! - 12: input error (malformed snapshot, unknown thread)
//! - 13: serialization error

use gles_extras_core::ExtrasError;
use std::fmt;

/// Errors produced by CLI operations, each mapped to a distinct exit code.
#[derive(Debug)]
pub enum CliError {
    /// The core rejected the input.
    Extraction(ExtrasError),
    /// A file could not be read.
    Io(String),
    /// The user supplied something unusable.
    Input(String),
    /// JSON output failed.
    Serialization(String),
}

impl CliError {
    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Extraction(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Extraction(e) => write!(f, "{e}"),
            CliError::Io(msg) => write!(f, "{msg}"),
            CliError::Input(msg) => write!(f, "{msg}"),
            CliError::Serialization(msg) => write!(f, "{msg}"),
        }
    }
}

impl From<ExtrasError> for CliError {
    fn from(e: ExtrasError) -> Self {
        match e {
            ExtrasError::InvalidSnapshot(msg) => CliError::Input(msg),
            other => CliError::Extraction(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}
