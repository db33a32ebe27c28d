//! Statement execution and result dispatch.
//!
//! [`StatementExecutor`] is the public facade of the layer: it runs opaque
//! SQL text on the lazily managed connection, classifies each statement's
//! outcome, and routes it to the [`ResultHandler`] the embedding application
//! supplied at construction. Exactly one handler method fires per executed
//! statement, and the statement context is released on every exit path,
//! including handler failures.

use tracing::debug;

use crate::db::connection::ConnectionManager;
use crate::db::driver::{Rows, StatementOutcome};
use crate::error::DbResult;

/// The two result-handling behaviors an application plugs in.
///
/// `on_rows` receives a live cursor and must drain it before returning; the
/// cursor (and its statement context) is released as soon as the call ends.
/// `on_rows_affected` receives the changed-row count, or `None` when the
/// driver cannot report one. Either method may fail; the error propagates
/// out of [`StatementExecutor::run`] after the context is released.
pub trait ResultHandler {
    fn on_rows(&mut self, rows: &mut dyn Rows) -> DbResult<()>;
    fn on_rows_affected(&mut self, count: Option<u64>) -> DbResult<()>;
}

pub struct StatementExecutor<H: ResultHandler> {
    connections: ConnectionManager,
    handler: H,
}

impl<H: ResultHandler> StatementExecutor<H> {
    pub fn new(connections: ConnectionManager, handler: H) -> Self {
        Self {
            connections,
            handler,
        }
    }

    /// Execute one SQL statement and dispatch its outcome.
    ///
    /// Connects first if needed; connect and configuration failures propagate
    /// before any statement runs. Execution failures propagate without
    /// dispatching either handler. A failed run leaves the connection open
    /// unless the failure was the connect itself.
    pub fn run(&mut self, sql: &str) -> DbResult<()> {
        debug!(sql = %sql, "executing statement");
        let conn = self.connections.ensure_connected()?;
        match conn.execute(sql)? {
            StatementOutcome::Rows(mut rows) => {
                debug!("statement produced rows");
                self.handler.on_rows(rows.as_mut())?;
            }
            StatementOutcome::Affected(count) => {
                debug!(rows_affected = ?count, "statement affected rows");
                self.handler.on_rows_affected(count)?;
            }
        }
        Ok(())
    }

    /// Commit the current unit of work. No-op when not connected.
    pub fn commit(&mut self) -> DbResult<()> {
        self.connections.commit()
    }

    /// Roll back the current unit of work. No-op when not connected.
    pub fn rollback(&mut self) -> DbResult<()> {
        self.connections.rollback()
    }

    /// Release the connection. Never raises; safe to call twice.
    pub fn close(&mut self) {
        self.connections.close()
    }

    /// Whether a connection is currently open.
    pub fn is_connected(&self) -> bool {
        self.connections.is_connected()
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }
}
