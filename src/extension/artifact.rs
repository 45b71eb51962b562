//! Loadable artifact resolution
//!
//! Resolves the filesystem path of a compiled extension the same way the
//! language packaging helpers do (`getLoadablePath()` in npm packages,
//! `loadable_path` in gems and wheels): an entrypoint base name plus the
//! platform's loadable suffix, looked up in the package directory and its
//! per-platform sub-directories. Platform packages are tried under both the
//! `$OS-$CPU` spelling and npm's (`<package>-darwin-arm64`, `<package>-linux-x64`).

use crate::error::ArtifactError;
use crate::extension::platform::Platform;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where to look for a loadable artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactSource {
    /// A path given directly by the user
    Explicit(PathBuf),
    /// A distribution directory holding `<entrypoint>.<suffix>` files
    Package {
        dir: PathBuf,
        entrypoint: String,
        package: Option<String>,
    },
}

/// Resolves an [`ArtifactSource`] into a [`LoadableArtifact`]
#[derive(Debug, Clone)]
pub struct ArtifactLocator {
    source: ArtifactSource,
    platform: Option<Platform>,
    entry_point: Option<String>,
}

/// A loadable extension module found on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadableArtifact {
    pub path: PathBuf,
    /// Explicit init symbol; SQLite derives one from the file name when unset
    pub entry_point: Option<String>,
}

impl ArtifactLocator {
    /// Use a path as-is
    pub fn explicit<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            source: ArtifactSource::Explicit(path.into()),
            platform: None,
            entry_point: None,
        }
    }

    /// Look up `<entrypoint>.<suffix>` inside a distribution directory
    pub fn package<P: Into<PathBuf>, S: Into<String>>(dir: P, entrypoint: S) -> Self {
        Self {
            source: ArtifactSource::Package {
                dir: dir.into(),
                entrypoint: entrypoint.into(),
                package: None,
            },
            platform: None,
            entry_point: None,
        }
    }

    /// Set the package name used for `<package>-<os>-<cpu>` directories
    pub fn with_package_name<S: Into<String>>(mut self, name: S) -> Self {
        if let ArtifactSource::Package { package, .. } = &mut self.source {
            *package = Some(name.into());
        }
        self
    }

    /// Resolve for a specific platform instead of the running one
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Use an explicit init symbol, e.g. `sqlite3_hello_init`
    pub fn with_entry_point<S: Into<String>>(mut self, entry_point: S) -> Self {
        self.entry_point = Some(entry_point.into());
        self
    }

    pub fn source(&self) -> &ArtifactSource {
        &self.source
    }

    /// Candidate paths, in lookup order
    pub fn candidates(&self) -> Result<Vec<PathBuf>, ArtifactError> {
        let platform = match self.platform {
            Some(p) => p,
            None => Platform::current()?,
        };
        let suffix = platform.loadable_suffix();

        match &self.source {
            ArtifactSource::Explicit(path) => {
                let mut candidates = vec![path.clone()];
                // SQLite retries with the platform suffix appended
                if path.extension().is_none() {
                    let mut with_suffix = path.clone().into_os_string();
                    with_suffix.push(format!(".{}", suffix));
                    candidates.push(PathBuf::from(with_suffix));
                }
                Ok(candidates)
            }
            ArtifactSource::Package {
                dir,
                entrypoint,
                package,
            } => {
                if entrypoint.trim().is_empty() {
                    return Err(ArtifactError::EmptyEntrypoint);
                }
                let file_name = format!("{}.{}", entrypoint, suffix);
                let mut candidates = vec![
                    dir.join(&file_name),
                    dir.join(platform.dir_name()).join(&file_name),
                ];
                if let Some(package) = package {
                    candidates.push(
                        dir.join(format!("{}-{}", package, platform.dir_name()))
                            .join(&file_name),
                    );
                    candidates.push(
                        dir.join(format!("{}-{}", package, platform.npm_name()))
                            .join(&file_name),
                    );
                }
                Ok(candidates)
            }
        }
    }

    /// Find the first candidate that exists on disk
    pub fn resolve(&self) -> Result<LoadableArtifact, ArtifactError> {
        let candidates = self.candidates()?;
        for candidate in &candidates {
            debug!("looking for loadable extension at {}", candidate.display());
            if candidate.is_file() {
                return Ok(LoadableArtifact {
                    path: candidate.clone(),
                    entry_point: self.entry_point.clone(),
                });
            }
        }
        Err(ArtifactError::NotFound {
            searched: candidates,
        })
    }
}

impl LoadableArtifact {
    /// Base name SQLite derives from the file name: directory and `lib`
    /// prefix stripped, cut at the first `.`, ASCII letters only, lowercased.
    ///
    /// `/dist/linux-x86_64/libhello0.so` becomes `hello`.
    pub fn extension_name(&self) -> String {
        derive_extension_name(&self.path)
    }

    /// Init symbol SQLite will call, either the explicit entry point or
    /// `sqlite3_<name>_init`
    pub fn init_symbol(&self) -> String {
        match &self.entry_point {
            Some(entry) => entry.clone(),
            None => format!("sqlite3_{}_init", self.extension_name()),
        }
    }

    /// Name of the conventional zero-argument version function
    pub fn version_function(&self) -> String {
        let name = match &self.entry_point {
            Some(entry) => entry
                .strip_prefix("sqlite3_")
                .and_then(|s| s.strip_suffix("_init"))
                .map(|s| s.to_string())
                .unwrap_or_else(|| self.extension_name()),
            None => self.extension_name(),
        };
        format!("{}_version", name)
    }
}

fn derive_extension_name(path: &Path) -> String {
    let file = path
        .to_string_lossy()
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .to_string();
    let stem = match file.get(..3) {
        Some(prefix) if prefix.eq_ignore_ascii_case("lib") => &file[3..],
        _ => file.as_str(),
    };
    stem.chars()
        .take_while(|c| *c != '.')
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
