//! sqlbridge - a minimal generic SQL access layer.
//!
//! Registers database drivers from a plain-text list, loads connection
//! settings from a properties file, lazily opens a single connection with
//! autocommit disabled, and executes opaque SQL statements, dispatching each
//! outcome (row set or affected-row count) to handlers the application
//! supplies. Applications embed the layer by implementing [`ResultHandler`]
//! and driving a [`StatementExecutor`].

pub mod config;
pub mod console;
pub mod db;
pub mod error;

pub use config::Config;
pub use db::{
    Connection, ConnectionManager, Driver, DriverManager, DriverRegistry, ResultHandler, Row,
    Rows, StatementExecutor, StatementOutcome, Value, load_driver_names,
};
pub use error::{DbError, DbResult};
