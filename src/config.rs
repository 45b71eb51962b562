use crate::extension::{ArtifactLocator, SmokeTest};
use anyhow::{anyhow, Result};
use config::Config;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

/// Effective settings for a smoke run
///
/// Values come from the TOML configuration file, overridden by
/// `SQLITE_SMOKE_*` environment variables, overridden in turn by
/// command-line flags (see [`SmokeConfig::merge`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SmokeConfig {
    /// Explicit path to a loadable extension
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,

    /// Distribution directory holding per-platform artifacts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_dir: Option<String>,

    /// Package name, for `<package>-<os>-<cpu>` directories
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,

    /// Artifact base name inside the package directory, e.g. `hello0`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entrypoint: Option<String>,

    /// Explicit init symbol, e.g. `sqlite3_hello_init`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<String>,

    /// SQL to evaluate after loading
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    /// Version the query must return
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expect: Option<String>,
}

const EMPTY_CONFIG: &str = r#"### sqlite-smoke configuration file

### path to a loadable extension
# extension = "./dist/linux-x86_64/hello0.so"

### or: a distribution directory and the artifact base name
# package_dir = "./dist"
# package = "sqlite-hello"
# entrypoint = "hello0"

### init symbol, derived from the file name when unset
# entry_point = "sqlite3_hello_init"

### query to run and the value it must return
# query = "SELECT hello_version()"
# expect = "1.0.0"
"#;

const CONFIG_KEYS: &[&str] = &[
    "extension",
    "package_dir",
    "package",
    "entrypoint",
    "entry_point",
    "query",
    "expect",
];

impl SmokeConfig {
    /// Function to create and initialize a new configuration
    pub fn new(path: &Option<String>) -> Result<SmokeConfig> {
        let mut builder = Config::builder();

        match path {
            Some(p) => {
                let path = Path::new(p.as_str());
                if path.exists() {
                    let path_str = path
                        .to_str()
                        .ok_or_else(|| anyhow!("Could not convert path to string"))?;
                    builder = builder.add_source(config::File::with_name(path_str));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG)
                        .map_err(|e| anyhow!("Unable to create config file: {}", e))?;
                }
            }
            None => {
                let p = Self::config_file_path()?;
                if Path::new(p.as_str()).exists() {
                    builder = builder.add_source(config::File::with_name(p.as_str()));
                }
            }
        }

        // Add in settings from the environment (with a prefix of SQLITE_SMOKE)
        // E.g., `SQLITE_SMOKE_EXPECT=1.0.0 sqlite-smoke run` would set the expected version
        builder = builder.add_source(config::Environment::with_prefix("SQLITE_SMOKE"));

        let settings = builder
            .build()
            .map_err(|e| anyhow!("Failed to build configuration: {}", e))?;

        let config = settings
            .try_deserialize::<HashMap<String, String>>()
            .map_err(|e| anyhow!("Failed to deserialize configuration: {}", e))?;

        Ok(Self::from_map(&config))
    }

    fn from_map(map: &HashMap<String, String>) -> SmokeConfig {
        let get = |key: &str| {
            map.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        SmokeConfig {
            extension: get("extension"),
            package_dir: get("package_dir"),
            package: get("package"),
            entrypoint: get("entrypoint"),
            entry_point: get("entry_point"),
            query: get("query"),
            expect: get("expect"),
        }
    }

    /// Overlay values that are set in `other`
    pub fn merge(mut self, other: SmokeConfig) -> SmokeConfig {
        fn pick(base: &mut Option<String>, over: Option<String>) {
            if over.is_some() {
                *base = over;
            }
        }
        // an explicit path on top replaces a package lookup from below, and vice versa
        if other.extension.is_some() {
            self.package_dir = None;
        } else if other.package_dir.is_some() {
            self.extension = None;
        }
        pick(&mut self.extension, other.extension);
        pick(&mut self.package_dir, other.package_dir);
        pick(&mut self.package, other.package);
        pick(&mut self.entrypoint, other.entrypoint);
        pick(&mut self.entry_point, other.entry_point);
        pick(&mut self.query, other.query);
        pick(&mut self.expect, other.expect);
        self
    }

    /// Build the artifact locator these settings describe
    pub fn locator(&self) -> Result<ArtifactLocator> {
        let locator = match (&self.extension, &self.package_dir) {
            (Some(path), _) => ArtifactLocator::explicit(path),
            (None, Some(dir)) => {
                let entrypoint = self.entrypoint.as_ref().ok_or_else(|| {
                    anyhow!("`entrypoint` is required when `package_dir` is set")
                })?;
                let mut locator = ArtifactLocator::package(dir, entrypoint);
                if let Some(package) = &self.package {
                    locator = locator.with_package_name(package);
                }
                locator
            }
            (None, None) => {
                return Err(anyhow!(
                    "no extension configured, set `extension` or `package_dir` and `entrypoint`"
                ))
            }
        };
        Ok(match &self.entry_point {
            Some(entry) => locator.with_entry_point(entry),
            None => locator,
        })
    }

    /// Build the smoke run these settings describe
    pub fn smoke_test(&self) -> Result<SmokeTest> {
        let mut smoke = SmokeTest::new(self.locator()?);
        if let Some(query) = &self.query {
            smoke = smoke.with_query(query);
        }
        if let Some(expect) = &self.expect {
            smoke = smoke.with_expected(expect);
        }
        Ok(smoke)
    }

    /// Get the config file path
    pub fn config_file_path() -> Result<String> {
        let home_dir = dirs::home_dir()
            .ok_or_else(|| anyhow!("Could not find home directory"))?
            .to_str()
            .ok_or_else(|| anyhow!("Could not convert home directory path to string"))?
            .to_owned();
        Ok(format!("{}/.sqlite-smoke/sqlite-smoke.toml", home_dir))
    }

    /// Display configuration summary
    pub fn summary(&self) -> String {
        let value = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
        CONFIG_KEYS
            .iter()
            .zip([
                &self.extension,
                &self.package_dir,
                &self.package,
                &self.entrypoint,
                &self.entry_point,
                &self.query,
                &self.expect,
            ])
            .map(|(key, v)| format!("{:<14}{}", format!("{}:", key), value(v)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
