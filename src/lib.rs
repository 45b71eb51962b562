#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! sqlite-smoke - smoke tests for SQLite loadable extensions
//!
//! sqlite-smoke opens an in-memory SQLite database, loads a pre-compiled
//! extension into it, calls a function the extension registers, and checks
//! the result. It can be used as both a command-line application and a
//! library.
//!
//! # Feature Flags
//!
//! | Feature | Description | Key Dependencies |
//! |---------|-------------|------------------|
//! | `display` | Table formatting for reports | `tabled` |
//! | `cli` | The `sqlite-smoke` binary | All above + `clap`, `tracing-subscriber` |
//!
//! # Architecture
//!
//! - **[`database`]**: connection wrapper and scalar query evaluation
//! - **[`extension`]**: artifact resolution, scoped loading, smoke runs
//! - **[`config`]**: configuration file and environment handling
//! - **[`error`]**: error types for each stage of a run
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sqlite_smoke::extension::{ArtifactLocator, SmokeTest};
//!
//! // look for ./dist/hello0.so, ./dist/linux-x86_64/hello0.so, ...
//! let locator = ArtifactLocator::package("./dist", "hello0");
//!
//! // SELECT hello_version() must return 1.0.0
//! let report = SmokeTest::new(locator).with_expected("1.0.0").run()?;
//! println!("{}", report.value);
//! ```
//!
//! Failure probes check that a broken setup fails loudly:
//!
//! ```rust,ignore
//! let smoke = SmokeTest::new(ArtifactLocator::explicit("./hello0.so"));
//!
//! // without loading, SELECT hello_version() is an unknown function
//! smoke.probe_unloaded()?;
//!
//! // with extension loading disabled, the load is not authorized
//! smoke.probe_gate()?;
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod extension;
pub mod output;

pub use config::SmokeConfig;

pub use database::{DatabaseConn, ScalarValue};

pub use error::{ArtifactError, LoadError, QueryError, SmokeError};

pub use extension::{
    ArtifactLocator, CheckResult, ExtensionLoader, LoadGate, LoadableArtifact, Platform,
    SmokeReport, SmokeTest,
};

pub use output::OutputFormat;
