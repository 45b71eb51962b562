//! Error types for the smoke-test harness
//!
//! Each stage of a smoke run fails with its own error type so callers (and
//! tests) can tell a missing artifact apart from a rejected load or a query
//! against a function that was never registered.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to locate a loadable artifact on disk.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("unsupported platform {os}-{arch}, supported platforms are macos, linux and windows on x86_64 or aarch64")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("directory {0} is not a valid platform directory, the format must be $OS-$CPU")]
    InvalidPlatformDir(String),

    #[error("invalid operating system '{0}', must be one of 'macos', 'linux', or 'windows'")]
    InvalidOs(String),

    #[error("invalid CPU name '{0}', must be one of 'x86_64' or 'aarch64'")]
    InvalidCpu(String),

    #[error("loadable extension not found, searched: {}", display_paths(.searched))]
    NotFound { searched: Vec<PathBuf> },

    #[error("entrypoint name must not be empty")]
    EmptyEntrypoint,
}

/// Failure to load an extension into a database handle.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot load extension, file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("cannot load extension {}: loading is not enabled on this handle (not authorized)", .path.display())]
    NotAuthorized { path: PathBuf },

    #[error("cannot load extension {}: {message}", .path.display())]
    Invalid { path: PathBuf, message: String },

    #[error("failed to toggle extension loading: {0}")]
    Gate(#[source] rusqlite::Error),
}

/// Failure to evaluate a scalar query.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("no such function: {name}")]
    UnknownFunction { name: String },

    #[error("query returned no rows: {sql}")]
    NoRows { sql: String },

    #[error("query returned text that is not valid UTF-8: {source}")]
    InvalidText {
        bytes: Vec<u8>,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("query failed: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Failure of a complete smoke run.
#[derive(Debug, Error)]
pub enum SmokeError {
    #[error("failed to open database: {0}")]
    Open(#[source] rusqlite::Error),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("version function returned an empty or non-text value: {0}")]
    EmptyResult(String),

    #[error("version mismatch: expected '{expected}', extension reported '{actual}'")]
    VersionMismatch { expected: String, actual: String },

    #[error("expected failure but the query succeeded with '{0}'")]
    UnexpectedSuccess(String),

    #[error("expected {expected} but got: {actual}")]
    UnexpectedFailure { expected: String, actual: String },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
