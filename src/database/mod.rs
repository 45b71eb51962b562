//! Database module
//!
//! Connection handling and scalar query evaluation for smoke runs.
//!
//! ```text
//! database/
//! ├── connection  # SQLite DatabaseConn wrapper, scalar queries
//! └── value       # ScalarValue, first row / first column of a result
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use sqlite_smoke::database::DatabaseConn;
//!
//! let db = DatabaseConn::open_in_memory()?;
//! let version = db.query_scalar("SELECT sqlite_version()")?;
//! println!("{}", version);
//! ```

pub mod connection;
pub mod value;

pub use connection::{DatabaseConn, MEMORY_PATH};
pub use value::ScalarValue;
