//! Smoke runs against a loadable extension
//!
//! A smoke run opens an in-memory database, loads the extension through a
//! scoped gate, evaluates one scalar query (by default the extension's
//! `<name>_version()` function) and optionally compares the result against
//! an expected version. The probes check the two ways a broken setup must
//! fail loudly: calling the function without loading the extension, and
//! loading with the gate closed.

use crate::database::{DatabaseConn, ScalarValue};
use crate::error::{LoadError, QueryError, SmokeError};
use crate::extension::artifact::{ArtifactLocator, LoadableArtifact};
use crate::extension::loader::{ExtensionLoader, LoadGate};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

// =============================================================================
// Types
// =============================================================================

/// Outcome of a successful smoke run
#[derive(Debug, Clone, Serialize)]
pub struct SmokeReport {
    pub artifact: String,
    pub entry_point: String,
    pub query: String,
    pub value: ScalarValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    pub sqlite_version: String,
    pub checked_at: DateTime<Utc>,
}

/// One field of a report, for table output
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "display", derive(tabled::Tabled))]
pub struct ReportField {
    pub field: &'static str,
    pub value: String,
}

impl SmokeReport {
    pub fn fields(&self) -> Vec<ReportField> {
        let mut fields = vec![
            ReportField {
                field: "artifact",
                value: self.artifact.clone(),
            },
            ReportField {
                field: "entry_point",
                value: self.entry_point.clone(),
            },
            ReportField {
                field: "query",
                value: self.query.clone(),
            },
            ReportField {
                field: "value",
                value: self.value.to_string(),
            },
        ];
        if let Some(expected) = &self.expected {
            fields.push(ReportField {
                field: "expected",
                value: expected.clone(),
            });
        }
        fields.push(ReportField {
            field: "sqlite_version",
            value: self.sqlite_version.clone(),
        });
        fields.push(ReportField {
            field: "checked_at",
            value: self.checked_at.to_rfc3339(),
        });
        fields
    }
}

/// Result of one check in a [`SmokeTest::check_all`] battery
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "display", derive(tabled::Tabled))]
pub struct CheckResult {
    pub check: &'static str,
    pub passed: bool,
    pub detail: String,
}

// =============================================================================
// Smoke test
// =============================================================================

/// A configured smoke run
///
/// # Example
///
/// ```rust,ignore
/// use sqlite_smoke::extension::{ArtifactLocator, SmokeTest};
///
/// let smoke = SmokeTest::new(ArtifactLocator::package("./dist", "hello0"))
///     .with_expected("1.0.0");
/// let report = smoke.run()?;
/// println!("{}", report.value);
/// ```
#[derive(Debug, Clone)]
pub struct SmokeTest {
    locator: ArtifactLocator,
    gate: LoadGate,
    query: Option<String>,
    expected: Option<String>,
}

impl SmokeTest {
    pub fn new(locator: ArtifactLocator) -> Self {
        Self {
            locator,
            gate: LoadGate::Scoped,
            query: None,
            expected: None,
        }
    }

    /// Evaluate `sql` instead of the default `SELECT <name>_version()`
    pub fn with_query<S: Into<String>>(mut self, sql: S) -> Self {
        self.query = Some(sql.into());
        self
    }

    /// Require the query to return this version string
    pub fn with_expected<S: Into<String>>(mut self, expected: S) -> Self {
        self.expected = Some(expected.into());
        self
    }

    pub fn with_gate(mut self, gate: LoadGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn locator(&self) -> &ArtifactLocator {
        &self.locator
    }

    /// The query a run evaluates for `artifact`
    pub fn query_for(&self, artifact: &LoadableArtifact) -> String {
        match &self.query {
            Some(q) => q.clone(),
            None => format!("SELECT {}()", artifact.version_function()),
        }
    }

    /// Open, load, query, and verify
    pub fn run(&self) -> Result<SmokeReport, SmokeError> {
        let db = DatabaseConn::open_in_memory().map_err(SmokeError::Open)?;
        let artifact = self.locator.resolve()?;

        ExtensionLoader::with_gate(self.gate).load(&db, &artifact)?;

        let query = self.query_for(&artifact);
        let value = db.query_scalar(&query)?;
        info!("{} returned {}", query, value);

        if self.expected.is_some() || self.query.is_none() {
            let actual = match value.as_text().map(str::trim) {
                Some(text) if !text.is_empty() => text,
                _ => {
                    return Err(SmokeError::EmptyResult(format!(
                        "{} ({})",
                        value,
                        value.type_name()
                    )))
                }
            };
            if let Some(expected) = &self.expected {
                if !versions_match(expected, actual) {
                    return Err(SmokeError::VersionMismatch {
                        expected: expected.clone(),
                        actual: actual.to_string(),
                    });
                }
            }
        }

        Ok(SmokeReport {
            artifact: artifact.path.display().to_string(),
            entry_point: artifact.init_symbol(),
            query,
            value,
            expected: self.expected.clone(),
            sqlite_version: db.sqlite_version()?,
            checked_at: Utc::now(),
        })
    }

    /// Evaluate the query on a handle without the extension; it must fail
    /// with an unknown function error rather than return a value.
    pub fn probe_unloaded(&self) -> Result<String, SmokeError> {
        let query = match &self.query {
            Some(q) => q.clone(),
            None => self.query_for(&self.locator.resolve()?),
        };
        let db = DatabaseConn::open_in_memory().map_err(SmokeError::Open)?;
        match db.query_scalar(&query) {
            Err(QueryError::UnknownFunction { name }) => {
                Ok(format!("no such function: {}", name))
            }
            Ok(value) => Err(SmokeError::UnexpectedSuccess(value.to_string())),
            Err(other) => Err(SmokeError::UnexpectedFailure {
                expected: "an unknown function error".to_string(),
                actual: other.to_string(),
            }),
        }
    }

    /// Attempt the load with the gate closed; the engine must refuse it.
    pub fn probe_gate(&self) -> Result<String, SmokeError> {
        let artifact = self.locator.resolve()?;
        let db = DatabaseConn::open_in_memory().map_err(SmokeError::Open)?;
        match ExtensionLoader::with_gate(LoadGate::Closed).load(&db, &artifact) {
            Err(LoadError::NotAuthorized { .. }) => {
                Ok("load refused: not authorized".to_string())
            }
            Ok(()) => Err(SmokeError::UnexpectedSuccess(format!(
                "{} loaded with extension loading disabled",
                artifact.path.display()
            ))),
            Err(other) => Err(SmokeError::UnexpectedFailure {
                expected: "a not authorized error".to_string(),
                actual: other.to_string(),
            }),
        }
    }

    /// Run the gate probe, the unloaded probe and the smoke run itself
    pub fn check_all(&self) -> Vec<CheckResult> {
        let outcome = |check: &'static str, result: Result<String, SmokeError>| match result {
            Ok(detail) => CheckResult {
                check,
                passed: true,
                detail,
            },
            Err(e) => CheckResult {
                check,
                passed: false,
                detail: e.to_string(),
            },
        };

        vec![
            outcome("gate-closed", self.probe_gate()),
            outcome("unloaded", self.probe_unloaded()),
            outcome("load", self.run().map(|r| r.value.to_string())),
        ]
    }
}

/// Compare versions ignoring surrounding whitespace and a leading `v`
fn versions_match(expected: &str, actual: &str) -> bool {
    let normalize = |s: &str| {
        let s = s.trim();
        s.strip_prefix('v').unwrap_or(s).to_string()
    };
    normalize(expected) == normalize(actual)
}
