//! Extension loader
//!
//! SQLite refuses to load native modules unless loading was switched on for
//! the handle first; [`DatabaseConn`] opens every handle with it off. [`LoadGate::Scoped`] switches it on through
//! [`rusqlite::LoadExtensionGuard`], which switches it off again when the
//! guard drops, whether the load succeeded, failed, or unwound.

use crate::database::connection::sqlite_message;
use crate::database::DatabaseConn;
use crate::error::LoadError;
use crate::extension::artifact::LoadableArtifact;
use rusqlite::LoadExtensionGuard;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// How extension loading is enabled around a load call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadGate {
    /// Enable loading for the duration of the call only
    #[default]
    Scoped,
    /// Never enable loading; the engine is expected to refuse
    Closed,
}

/// Loads native extension modules into a database handle
#[derive(Debug, Clone, Default)]
pub struct ExtensionLoader {
    gate: LoadGate,
}

impl ExtensionLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gate(gate: LoadGate) -> Self {
        Self { gate }
    }

    pub fn gate(&self) -> LoadGate {
        self.gate
    }

    /// Load `artifact` into `db`, registering its functions on that handle
    pub fn load(&self, db: &DatabaseConn, artifact: &LoadableArtifact) -> Result<(), LoadError> {
        let path = artifact.path.as_path();
        if !path.exists() {
            return Err(LoadError::NotFound(path.to_path_buf()));
        }

        info!(
            "loading extension {} (entry point {})",
            path.display(),
            artifact.init_symbol()
        );

        let entry_point = artifact.entry_point.as_deref();
        let result = match self.gate {
            LoadGate::Scoped => {
                // SAFETY: loading runs arbitrary native code from `path`; the
                // caller chose this artifact and the guard limits the enabled
                // window to this single call.
                let _guard =
                    unsafe { LoadExtensionGuard::new(&db.conn) }.map_err(LoadError::Gate)?;
                debug!("extension loading enabled");
                unsafe { db.conn.load_extension(path, entry_point) }
            }
            LoadGate::Closed => {
                debug!("loading without enabling the extension gate");
                // SAFETY: as above; loading is disabled so SQLite rejects the
                // call before opening the module.
                unsafe { db.conn.load_extension(path, entry_point) }
            }
        };

        result.map_err(|e| {
            let err = classify_load_error(path, e);
            debug!("{}", err);
            err
        })
    }
}

fn classify_load_error(path: &Path, err: rusqlite::Error) -> LoadError {
    let message = sqlite_message(&err)
        .map(str::to_string)
        .unwrap_or_else(|| err.to_string());
    if message.contains("not authorized") {
        LoadError::NotAuthorized {
            path: path.to_path_buf(),
        }
    } else {
        LoadError::Invalid {
            path: path.to_path_buf(),
            message,
        }
    }
}
