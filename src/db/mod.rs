//! Database abstraction layer.
//!
//! This module provides the generic access machinery:
//! - Driver traits and the statement outcome model
//! - Connection negotiation (URL -> driver -> connection)
//! - Driver catalog and list-file registration
//! - Single-connection lifecycle management
//! - Statement execution and result dispatch
//! - Database-agnostic value types
//! - The built-in SQLite driver (feature `sqlite`)

pub mod connection;
pub mod driver;
pub mod executor;
pub mod manager;
pub mod registry;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod types;

pub use connection::ConnectionManager;
pub use driver::{Connection, Driver, Rows, StatementOutcome};
pub use executor::{ResultHandler, StatementExecutor};
pub use manager::DriverManager;
pub use registry::{DriverRegistry, load_driver_names};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDriver;
pub use types::{Row, Value};
