//! Configuration handling for sqlbridge.
//!
//! Two layers live here: [`Config`], the key/value store loaded once from a
//! properties file and consulted by the connection machinery, and [`Cli`],
//! the command-line surface of the bundled binary (arguments plus environment
//! variables).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;

use crate::console::OutputFormat;
use crate::error::{DbError, DbResult};

/// Default properties file name.
pub const DEFAULT_CONFIG_FILE: &str = "sql.properties";
/// Default driver list file name.
pub const DEFAULT_DRIVER_FILE: &str = "dbdrivers.txt";
/// Properties key holding the connection URL.
pub const DB_URL_KEY: &str = "dburl";

/// Process-wide settings, read-only after load.
///
/// The store itself is generic string key/value; the only key the layer
/// interprets is [`DB_URL_KEY`]. Everything else is passed through verbatim
/// to the driver that wins connection negotiation. The connection URL may
/// carry credentials and is treated as sensitive: it is never logged and
/// never embedded in error messages.
#[derive(Debug, Clone, Default)]
pub struct Config {
    properties: BTreeMap<String, String>,
}

impl Config {
    /// Load the properties resource at `path`. A missing or unreadable file
    /// is an error; a missing `dburl` key is not, it surfaces later at
    /// connect time via [`Config::db_url`].
    pub fn load(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|err| DbError::resource(path.display().to_string(), err))?;
        Ok(Self::parse(&text))
    }

    /// Parse properties text: one `key=value` (or `key: value`) pair per
    /// line, `#` and `!` comment lines, surrounding whitespace trimmed. A
    /// line without a separator is a key with an empty value. Later
    /// duplicates win.
    pub fn parse(text: &str) -> Self {
        let mut properties = BTreeMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            match line.find(['=', ':']) {
                Some(pos) => {
                    let key = line[..pos].trim();
                    let value = line[pos + 1..].trim();
                    if !key.is_empty() {
                        properties.insert(key.to_string(), value.to_string());
                    }
                }
                None => {
                    properties.insert(line.to_string(), String::new());
                }
            }
        }
        Self { properties }
    }

    /// Build a config from literal pairs (useful for tests and embedding).
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            properties: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Look up a setting.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// The connection URL, or a configuration error when the `dburl` key is
    /// absent. This is the deferred surfacing point for a bad setup.
    pub fn db_url(&self) -> DbResult<&str> {
        self.get(DB_URL_KEY).ok_or_else(|| {
            DbError::configuration(format!("missing required '{}' property", DB_URL_KEY))
        })
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// Command-line configuration for the sqlbridge binary.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sqlbridge",
    about = "Run SQL statements through a configured database driver",
    version,
    author
)]
pub struct Cli {
    /// SQL statements to execute, in order.
    /// Reads newline-separated statements from stdin when none are given.
    #[arg(value_name = "SQL")]
    pub statements: Vec<String>,

    /// Properties file with connection settings (must define 'dburl')
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        default_value = DEFAULT_CONFIG_FILE,
        env = "SQLBRIDGE_CONFIG"
    )]
    pub config_file: PathBuf,

    /// Driver list file, one driver name per line
    #[arg(
        long = "drivers",
        value_name = "FILE",
        default_value = DEFAULT_DRIVER_FILE,
        env = "SQLBRIDGE_DRIVERS"
    )]
    pub driver_file: PathBuf,

    /// Output format for results
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "table",
        env = "SQLBRIDGE_FORMAT"
    )]
    pub format: OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", env = "SQLBRIDGE_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "SQLBRIDGE_JSON_LOGS")]
    pub json_logs: bool,
}
