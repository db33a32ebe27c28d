//! Single-connection lifecycle management.
//!
//! [`ConnectionManager`] owns at most one live connection and establishes it
//! lazily on first use. The lifecycle is Absent -> Connecting -> Open ->
//! Closed; Absent and Closed are both represented as "no connection held"
//! (a closed manager may connect again), and Connecting exists only inside
//! `ensure_connected`, where any failure falls back to Absent before the
//! error is raised. Open connections always have autocommit disabled, so
//! every unit of work ends with an explicit commit or rollback.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::db::driver::Connection;
use crate::db::manager::{DriverManager, url_scheme};
use crate::error::{DbError, DbResult};

pub struct ConnectionManager {
    drivers: Arc<DriverManager>,
    config: Config,
    conn: Option<Box<dyn Connection>>,
}

impl ConnectionManager {
    pub fn new(drivers: Arc<DriverManager>, config: Config) -> Self {
        Self {
            drivers,
            config,
            conn: None,
        }
    }

    /// Whether a connection is currently open.
    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// The configuration this manager connects with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Return the open connection, establishing it first if absent.
    ///
    /// A missing connection URL is a configuration error; it surfaces here,
    /// at first use, not at load time. On any failure no connection is
    /// retained, so a later call starts over from scratch.
    pub fn ensure_connected(&mut self) -> DbResult<&mut dyn Connection> {
        if self.conn.is_none() {
            let url = self.config.db_url()?;
            let scheme = url_scheme(url);
            debug!(scheme = %scheme, "connecting");
            let mut conn = self.drivers.connect(url, &self.config)?;
            conn.set_autocommit(false)?;
            info!(scheme = %scheme, "database connection established");
            self.conn = Some(conn);
        }
        match self.conn.as_deref_mut() {
            Some(conn) => Ok(conn),
            None => Err(DbError::internal("connection absent after connect")),
        }
    }

    /// Commit the current unit of work. No-op when no connection is open.
    pub fn commit(&mut self) -> DbResult<()> {
        match self.conn.as_deref_mut() {
            Some(conn) => {
                conn.commit()?;
                debug!("transaction committed");
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Roll back the current unit of work. No-op when no connection is open.
    pub fn rollback(&mut self) -> DbResult<()> {
        match self.conn.as_deref_mut() {
            Some(conn) => {
                conn.rollback()?;
                debug!("transaction rolled back");
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Release the connection, best-effort. Never raises: a failing close is
    /// logged and swallowed, and the manager returns to the no-connection
    /// state either way, so calling this twice is harmless. Work not
    /// committed beforehand is left to the engine's disconnect behavior
    /// (sqlite rolls an open transaction back).
    pub fn close(&mut self) {
        if let Some(mut conn) = self.conn.take() {
            match conn.close() {
                Ok(()) => debug!("database connection closed"),
                Err(err) => warn!(error = %err, "error closing database connection"),
            }
        }
    }
}
