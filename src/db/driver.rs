//! The driver seam: traits a database driver implements to plug into the
//! access layer.
//!
//! A [`Driver`] is a registered prototype that recognizes connection URLs and
//! opens connections. A [`Connection`] executes opaque SQL text and reports
//! each statement's outcome as either a row cursor or an affected-row count.
//! Everything above this seam is engine-agnostic.

use crate::config::Config;
use crate::db::types::Row;
use crate::error::DbResult;

/// Outcome of executing one SQL statement: exactly one of a row set or an
/// affected-row count, never both.
pub enum StatementOutcome<'stmt> {
    /// The statement produced rows. The cursor borrows the statement context
    /// and is released when dropped.
    Rows(Box<dyn Rows + 'stmt>),
    /// The statement affected rows. `None` means the driver cannot report
    /// a count for this statement kind.
    Affected(Option<u64>),
}

impl std::fmt::Debug for StatementOutcome<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatementOutcome::Rows(_) => f.write_str("StatementOutcome::Rows"),
            StatementOutcome::Affected(count) => {
                write!(f, "StatementOutcome::Affected({:?})", count)
            }
        }
    }
}

/// Cursor over a result set.
///
/// Rows are fetched one at a time; `next` returns `Ok(None)` after the last
/// row. Consumers are expected to drain the cursor before returning control,
/// since the underlying statement context is released when the cursor drops.
pub trait Rows {
    /// Column names, in result order.
    fn columns(&self) -> &[String];

    /// Fetch the next row.
    fn next(&mut self) -> DbResult<Option<Row>>;
}

/// A live database connection.
///
/// Exclusively owned by one `ConnectionManager`; no thread bounds. Statement
/// execution borrows the connection mutably, so at most one statement context
/// exists at a time and it cannot outlive the connection.
pub trait Connection {
    /// Execute one SQL statement of any kind and classify its outcome.
    fn execute(&mut self, sql: &str) -> DbResult<StatementOutcome<'_>>;

    /// Switch between autocommit and manual transaction mode. Disabling
    /// autocommit starts a unit of work that lasts until `commit` or
    /// `rollback`.
    fn set_autocommit(&mut self, enabled: bool) -> DbResult<()>;

    /// Whether the connection is in autocommit mode.
    fn is_autocommit(&self) -> bool;

    /// Commit the current unit of work.
    fn commit(&mut self) -> DbResult<()>;

    /// Roll back the current unit of work.
    fn rollback(&mut self) -> DbResult<()>;

    /// Release the connection. Called at most once by the owning manager;
    /// implementations may fail, the manager logs and swallows it.
    fn close(&mut self) -> DbResult<()>;
}

/// A registered driver prototype.
///
/// Drivers are shared by the negotiation facility and must be thread-safe;
/// the connections they hand out are not.
pub trait Driver: Send + Sync {
    /// Registry name for this driver, e.g. `"sqlite"`.
    fn name(&self) -> &str;

    /// Whether this driver recognizes the given connection URL.
    fn accepts_url(&self, url: &str) -> bool;

    /// Open a connection to the given URL. Extra configuration keys are
    /// passed through verbatim; drivers pick out the ones they understand.
    fn connect(&self, url: &str, config: &Config) -> DbResult<Box<dyn Connection>>;
}
