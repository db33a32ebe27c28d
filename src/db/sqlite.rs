//! Built-in SQLite driver backed by `rusqlite`.
//!
//! Registered under the name `sqlite`, accepting URLs of the form
//! `sqlite:<path>`, `sqlite://<path>`, and `sqlite::memory:`. SQLite has no
//! server-side autocommit switch, so manual-commit mode is emulated: keep an
//! explicit transaction open at all times and restart it after every commit
//! or rollback.

use std::collections::VecDeque;
use std::time::Duration;

use rusqlite::types::ValueRef;
use tracing::debug;

use crate::config::Config;
use crate::db::driver::{Connection, Driver, Rows, StatementOutcome};
use crate::db::types::{Row, Value};
use crate::error::{DbError, DbResult};

/// Optional configuration key: busy handler timeout in milliseconds.
pub const BUSY_TIMEOUT_KEY: &str = "sqlite.busy_timeout_ms";

/// Extract the filesystem path from a sqlite connection URL.
/// Returns None when the URL does not carry the `sqlite:` scheme.
fn sqlite_path(url: &str) -> Option<String> {
    let rest = url.strip_prefix("sqlite:")?;
    let rest = rest.strip_prefix("//").unwrap_or(rest);
    Some(rest.to_string())
}

fn is_memory_path(path: &str) -> bool {
    path.is_empty() || path == ":memory:"
}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(code, message) => DbError::database(
                message.unwrap_or_else(|| code.to_string()),
                Some(code.extended_code.to_string()),
                "Check the SQL statement and referenced objects",
            ),
            other => DbError::database(other.to_string(), None, "Check the SQL statement"),
        }
    }
}

/// Driver prototype for SQLite databases.
pub struct SqliteDriver;

impl Driver for SqliteDriver {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn accepts_url(&self, url: &str) -> bool {
        url.starts_with("sqlite:")
    }

    fn connect(&self, url: &str, config: &Config) -> DbResult<Box<dyn Connection>> {
        let path = sqlite_path(url).ok_or_else(|| {
            DbError::connect(
                "not a sqlite connection URL",
                "Use sqlite:<path> or sqlite::memory:",
            )
        })?;
        debug!(in_memory = is_memory_path(&path), "opening sqlite database");
        let conn = if is_memory_path(&path) {
            rusqlite::Connection::open_in_memory()
        } else {
            rusqlite::Connection::open(&path)
        }
        .map_err(|err| {
            DbError::connect(err.to_string(), "Check the database path and permissions")
        })?;
        if let Some(raw) = config.get(BUSY_TIMEOUT_KEY) {
            let ms: u64 = raw.parse().map_err(|_| {
                DbError::configuration(format!("invalid {} value: {}", BUSY_TIMEOUT_KEY, raw))
            })?;
            conn.busy_timeout(Duration::from_millis(ms))
                .map_err(|err| DbError::connect(err.to_string(), "Check sqlite driver options"))?;
        }
        Ok(Box::new(SqliteConnection {
            inner: Some(conn),
            manual_commit: false,
        }))
    }
}

/// Result cursor. SQLite is an embedded engine, so rows are materialized
/// up front and the underlying statement is finalized before the cursor is
/// handed out.
struct SqliteRows {
    columns: Vec<String>,
    rows: VecDeque<Row>,
}

impl Rows for SqliteRows {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn next(&mut self) -> DbResult<Option<Row>> {
        Ok(self.rows.pop_front())
    }
}

fn value_from_ref(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::Integer(v),
        ValueRef::Real(v) => Value::Real(v),
        ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
    }
}

struct SqliteConnection {
    inner: Option<rusqlite::Connection>,
    manual_commit: bool,
}

impl SqliteConnection {
    fn conn(&self) -> DbResult<&rusqlite::Connection> {
        self.inner
            .as_ref()
            .ok_or_else(|| DbError::internal("sqlite connection already closed"))
    }

    /// Manual-commit mode keeps a transaction open at all times. A statement
    /// like a user-issued COMMIT can end it behind our back, so restart it
    /// whenever the engine reports autocommit while we are in manual mode.
    fn restart_transaction_if_needed(&self) -> DbResult<()> {
        let conn = self.conn()?;
        if self.manual_commit && conn.is_autocommit() {
            conn.execute_batch("BEGIN")?;
        }
        Ok(())
    }
}

impl Connection for SqliteConnection {
    fn execute(&mut self, sql: &str) -> DbResult<StatementOutcome<'_>> {
        self.restart_transaction_if_needed()?;
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        if stmt.column_count() > 0 {
            let columns: Vec<String> = stmt
                .column_names()
                .into_iter()
                .map(|name| name.to_string())
                .collect();
            let mut buffered = VecDeque::new();
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                let mut values = Vec::with_capacity(columns.len());
                for idx in 0..columns.len() {
                    values.push(value_from_ref(row.get_ref(idx)?));
                }
                buffered.push_back(Row::new(values));
            }
            Ok(StatementOutcome::Rows(Box::new(SqliteRows {
                columns,
                rows: buffered,
            })))
        } else {
            // changes() is connection-global in sqlite; statements that do not
            // touch rows (DDL) report the previous DML's count.
            let affected = stmt.execute([])?;
            Ok(StatementOutcome::Affected(Some(affected as u64)))
        }
    }

    fn set_autocommit(&mut self, enabled: bool) -> DbResult<()> {
        let conn = self.conn()?;
        if enabled {
            if !conn.is_autocommit() {
                conn.execute_batch("COMMIT")?;
            }
            self.manual_commit = false;
        } else {
            if conn.is_autocommit() {
                conn.execute_batch("BEGIN")?;
            }
            self.manual_commit = true;
        }
        Ok(())
    }

    fn is_autocommit(&self) -> bool {
        !self.manual_commit
    }

    fn commit(&mut self) -> DbResult<()> {
        let conn = self.conn()?;
        if !conn.is_autocommit() {
            conn.execute_batch("COMMIT")?;
        }
        if self.manual_commit {
            conn.execute_batch("BEGIN")?;
        }
        Ok(())
    }

    fn rollback(&mut self) -> DbResult<()> {
        let conn = self.conn()?;
        if !conn.is_autocommit() {
            conn.execute_batch("ROLLBACK")?;
        }
        if self.manual_commit {
            conn.execute_batch("BEGIN")?;
        }
        Ok(())
    }

    fn close(&mut self) -> DbResult<()> {
        if let Some(conn) = self.inner.take() {
            conn.close().map_err(|(_, err)| DbError::from(err))?;
        }
        Ok(())
    }
}
