//! Extension module
//!
//! Everything between "a directory of pre-compiled binaries" and "a function
//! registered on a database handle":
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `platform` | `$OS-$CPU` naming and loadable suffixes |
//! | `artifact` | Resolving the artifact path, deriving the init symbol |
//! | `loader` | Loading a module behind a scoped enable/disable gate |
//! | `smoke` | The end-to-end smoke run and its failure probes |
//!
//! # Usage
//!
//! ```rust,ignore
//! use sqlite_smoke::database::DatabaseConn;
//! use sqlite_smoke::extension::{ArtifactLocator, ExtensionLoader};
//!
//! let db = DatabaseConn::open_in_memory()?;
//! let artifact = ArtifactLocator::package("./dist", "hello0").resolve()?;
//! ExtensionLoader::new().load(&db, &artifact)?;
//! println!("{}", db.query_scalar("SELECT hello_version()")?);
//! ```

pub mod artifact;
pub mod loader;
pub mod platform;
pub mod smoke;

pub use artifact::{ArtifactLocator, ArtifactSource, LoadableArtifact};
pub use loader::{ExtensionLoader, LoadGate};
pub use platform::{Cpu, Os, Platform};
pub use smoke::{CheckResult, ReportField, SmokeReport, SmokeTest};
