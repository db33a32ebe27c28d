//! sqlbridge - command-line SQL runner.
//!
//! Loads connection settings from a properties file, registers the drivers
//! named in the driver list, then runs the given SQL statements through a
//! single lazily opened connection: query results and affected-row counts go
//! to stdout, the batch is committed when every statement succeeds and rolled
//! back when one fails.

use clap::Parser;
use sqlbridge::config::{Cli, Config, DEFAULT_CONFIG_FILE};
use sqlbridge::console::ConsoleHandler;
use sqlbridge::db::{
    ConnectionManager, DriverManager, DriverRegistry, ResultHandler, StatementExecutor,
};
use sqlbridge::error::DbResult;
use std::io::{self, BufRead};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
fn init_tracing(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        subscriber.with(fmt::layer().json()).init();
    } else {
        subscriber
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .init();
    }
}

/// SQL statements from the command line, or one per nonblank stdin line.
fn gather_statements(cli: &Cli) -> io::Result<Vec<String>> {
    if !cli.statements.is_empty() {
        return Ok(cli.statements.clone());
    }
    let stdin = io::stdin();
    let mut statements = Vec::new();
    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            statements.push(trimmed.to_string());
        }
    }
    Ok(statements)
}

/// Run every statement, committing after the last one. A failure rolls the
/// unit of work back (best-effort) and propagates.
fn run_all<H: ResultHandler>(
    executor: &mut StatementExecutor<H>,
    statements: &[String],
) -> DbResult<()> {
    for sql in statements {
        if let Err(err) = executor.run(sql) {
            if let Err(rollback_err) = executor.rollback() {
                warn!(error = %rollback_err, "rollback after failed statement also failed");
            }
            return Err(err);
        }
    }
    executor.commit()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse configuration from command line and environment
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(&cli);

    let config = match Config::load(&cli.config_file) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {}", err);
            eprintln!();
            eprintln!("sqlbridge reads connection settings from a properties file.");
            eprintln!("Create one (default: {}) containing at least:", DEFAULT_CONFIG_FILE);
            eprintln!("  dburl=sqlite:data.db");
            std::process::exit(1);
        }
    };

    // Register the drivers named in the list file. Registration is advisory:
    // a bad entry is logged and skipped, and connecting later reports whether
    // any registered driver accepts the configured URL.
    let drivers = Arc::new(DriverManager::new());
    let registry = DriverRegistry::builtin();
    let registered = registry.register_from_file(&drivers, &cli.driver_file);
    info!(
        registered,
        available = ?drivers.registered_names(),
        "driver registration complete"
    );

    let statements = gather_statements(&cli)?;
    if statements.is_empty() {
        eprintln!("Error: no SQL statements given.");
        eprintln!();
        eprintln!("Usage: sqlbridge [OPTIONS] [SQL]...");
        eprintln!("       echo 'SELECT 1' | sqlbridge");
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  sqlbridge \"SELECT * FROM users\"");
        eprintln!("  sqlbridge -c prod.properties -f json \"SELECT COUNT(*) FROM orders\"");
        std::process::exit(1);
    }

    info!(
        statements = statements.len(),
        "Starting sqlbridge v{}",
        env!("CARGO_PKG_VERSION")
    );

    let handler = ConsoleHandler::stdout(cli.format);
    let connections = ConnectionManager::new(drivers, config);
    let mut executor = StatementExecutor::new(connections, handler);

    let result = run_all(&mut executor, &statements);
    executor.close();

    if let Err(err) = result {
        error!(error = %err, suggestion = ?err.suggestion(), "statement batch failed");
        return Err(err.into());
    }

    info!("batch complete");
    Ok(())
}
