//! Database connection management
//!
//! This module provides the connection wrapper every smoke run goes through.

use crate::database::value::ScalarValue;
use crate::error::QueryError;
use rusqlite::Connection;
use tracing::debug;

/// Path understood by SQLite as a transient, memory-resident store
pub const MEMORY_PATH: &str = ":memory:";

/// Core database connection wrapper
///
/// `DatabaseConn` provides a thin wrapper around a SQLite connection. The
/// handle is owned exclusively by its creator and closed on drop.
pub struct DatabaseConn {
    pub conn: Connection,
}

impl DatabaseConn {
    /// Open a database at the specified path
    ///
    /// If the path is `None` or `":memory:"`, an in-memory database is created.
    /// Extension loading starts disabled on every handle, whatever the
    /// engine was compiled with.
    pub fn open(path: Option<&str>) -> rusqlite::Result<Self> {
        let conn = match path {
            Some(p) if p != MEMORY_PATH => {
                debug!("opening database at {}", p);
                Connection::open(p)?
            }
            _ => {
                debug!("opening in-memory database");
                Connection::open_in_memory()?
            }
        };
        conn.load_extension_disable()?;
        Ok(DatabaseConn { conn })
    }

    /// Create an in-memory database
    pub fn open_in_memory() -> rusqlite::Result<Self> {
        Self::open(None)
    }

    /// Evaluate a parameterless SQL statement and return the first column of
    /// the first row.
    ///
    /// An unregistered function is reported as [`QueryError::UnknownFunction`],
    /// and a statement that produces no rows as [`QueryError::NoRows`].
    pub fn query_scalar(&self, sql: &str) -> Result<ScalarValue, QueryError> {
        debug!("executing scalar query: {}", sql);
        let mut stmt = self.conn.prepare(sql).map_err(classify_query_error)?;
        let mut rows = stmt.query([]).map_err(classify_query_error)?;
        let row = rows
            .next()
            .map_err(classify_query_error)?
            .ok_or_else(|| QueryError::NoRows {
                sql: sql.to_string(),
            })?;
        let value = ScalarValue::try_from(row.get_ref(0)?)?;
        Ok(value)
    }

    /// Version string of the linked SQLite engine
    pub fn sqlite_version(&self) -> Result<String, QueryError> {
        let version: String = self
            .conn
            .query_row("SELECT sqlite_version()", [], |row| row.get(0))?;
        Ok(version)
    }

    /// Check whether a SQL function with the given name is registered.
    ///
    /// Compiles `SELECT name()` without running it; only an unknown function
    /// counts as missing; an arity mismatch still means the name exists.
    pub fn function_exists(&self, name: &str) -> Result<bool, QueryError> {
        if !is_identifier(name) {
            return Ok(false);
        }
        match self.conn.prepare(&format!("SELECT {}()", name)) {
            Ok(_) => Ok(true),
            Err(e) => match classify_query_error(e) {
                QueryError::UnknownFunction { .. } => Ok(false),
                QueryError::Sqlite(e)
                    if sqlite_message(&e)
                        .is_some_and(|msg| msg.starts_with("wrong number of arguments")) =>
                {
                    Ok(true)
                }
                other => Err(other),
            },
        }
    }
}

/// Engine message carried by an error, whether raised while preparing
/// (`SqlInputError`) or while stepping (`SqliteFailure`)
pub(crate) fn sqlite_message(err: &rusqlite::Error) -> Option<&str> {
    match err {
        rusqlite::Error::SqlInputError { msg, .. } => Some(msg.as_str()),
        rusqlite::Error::SqliteFailure(_, Some(msg)) => Some(msg.as_str()),
        _ => None,
    }
}

/// Map SQLite's "no such function" failure onto a dedicated variant
pub(crate) fn classify_query_error(err: rusqlite::Error) -> QueryError {
    if let Some(name) = sqlite_message(&err).and_then(|msg| msg.strip_prefix("no such function:"))
    {
        return QueryError::UnknownFunction {
            name: name.trim().to_string(),
        };
    }
    QueryError::Sqlite(err)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = DatabaseConn::open_in_memory();
        assert!(db.is_ok());

        let db = DatabaseConn::open(Some(MEMORY_PATH));
        assert!(db.is_ok());
    }

    #[test]
    fn test_query_scalar_builtin() {
        let db = DatabaseConn::open_in_memory().unwrap();
        assert_eq!(
            db.query_scalar("SELECT 1 + 1").unwrap(),
            ScalarValue::Integer(2)
        );
        assert_eq!(
            db.query_scalar("SELECT 'yo!'").unwrap(),
            ScalarValue::Text("yo!".to_string())
        );
        assert!(db.query_scalar("SELECT NULL").unwrap().is_null());
    }

    #[test]
    fn test_query_scalar_first_row_first_column() {
        let db = DatabaseConn::open_in_memory().unwrap();
        let value = db
            .query_scalar("SELECT 'a', 'b' UNION ALL SELECT 'c', 'd'")
            .unwrap();
        assert_eq!(value, ScalarValue::Text("a".to_string()));
    }

    #[test]
    fn test_unknown_function() {
        let db = DatabaseConn::open_in_memory().unwrap();
        match db.query_scalar("SELECT hello_version()") {
            Err(QueryError::UnknownFunction { name }) => assert_eq!(name, "hello_version"),
            other => panic!("expected unknown function error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_function_at_prepare_and_step() {
        let prepare_err = rusqlite::Error::SqlInputError {
            error: rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
            msg: "no such function: sample_version".to_string(),
            sql: "SELECT sample_version()".to_string(),
            offset: 7,
        };
        assert!(matches!(
            classify_query_error(prepare_err),
            QueryError::UnknownFunction { name } if name == "sample_version"
        ));

        let step_err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
            Some("no such function: sample".to_string()),
        );
        assert!(matches!(
            classify_query_error(step_err),
            QueryError::UnknownFunction { name } if name == "sample"
        ));
    }

    #[test]
    fn test_extension_loading_starts_disabled() {
        let db = DatabaseConn::open_in_memory().unwrap();
        let err = db
            .query_scalar("SELECT load_extension('/nonexistent/sample0')")
            .unwrap_err();
        assert!(err.to_string().contains("not authorized"), "{}", err);
    }

    #[test]
    fn test_invalid_sql() {
        let db = DatabaseConn::open_in_memory().unwrap();
        let result = db.query_scalar("SELEKT 1");
        assert!(matches!(result, Err(QueryError::Sqlite(_))));
    }

    #[test]
    fn test_no_rows() {
        let db = DatabaseConn::open_in_memory().unwrap();
        let result = db.query_scalar("SELECT 1 WHERE 0");
        assert!(matches!(result, Err(QueryError::NoRows { .. })));
    }

    #[test]
    fn test_sqlite_version() {
        let db = DatabaseConn::open_in_memory().unwrap();
        let version = db.sqlite_version().unwrap();
        assert!(version.starts_with('3'));
    }

    #[test]
    fn test_function_exists() {
        let db = DatabaseConn::open_in_memory().unwrap();
        assert!(db.function_exists("sqlite_version").unwrap());
        // lower() takes one argument, but the name is still registered
        assert!(db.function_exists("lower").unwrap());
        assert!(!db.function_exists("hello_version").unwrap());
        assert!(!db.function_exists("drop table x; --").unwrap());
    }
}
