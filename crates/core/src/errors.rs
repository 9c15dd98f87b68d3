//! Error types for the duet core library.
//!
//! Loading and lookup each have their own error type derived with
//! `thiserror`, and a top-level [`CoreError`] enum unifies them for callers
//! that want a single error type.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Unified error type for the entire core library.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from loading the authors file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Authors file not found.
    #[error("authors file not found: {0}")]
    FileNotFound(String),

    /// The file is not well-formed YAML or does not match the schema.
    #[error("could not parse {path}: {detail}")]
    ParseFailure {
        path: String,
        detail: String,
    },

    /// Generic I/O error reading the authors file.
    #[error("authors file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Lookup errors
// ---------------------------------------------------------------------------

/// Errors from resolving initials to a [`Pair`](crate::identity::Pair).
#[derive(Debug, Error)]
pub enum LookupError {
    /// The initials are not present in the `authors` map.
    #[error("unknown initials {0}")]
    UnknownInitials(String),

    /// The external email lookup command could not be started.
    #[error("could not run email lookup '{command}': {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The external email lookup command exited with a non-zero status.
    #[error("email lookup '{command}' failed (exit {exit_code}): {stderr}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    /// The configured `email_template` could not be parsed or rendered.
    #[error("email template error: {0}")]
    Template(#[from] TemplateError),
}

impl LookupError {
    /// Whether this error came from executing a resolution strategy rather
    /// than from a missing author.
    pub fn is_resolution_failure(&self) -> bool {
        !matches!(self, Self::UnknownInitials(_))
    }
}

// ---------------------------------------------------------------------------
// Template errors
// ---------------------------------------------------------------------------

/// Errors from the email template engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    /// The template source is malformed.
    #[error("parse error at byte {offset}: {detail}")]
    Parse {
        offset: usize,
        detail: String,
    },

    /// The template parsed but could not be evaluated.
    #[error("render error: {0}")]
    Render(String),
}
