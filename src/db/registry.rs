//! Driver catalog and list-file registration.
//!
//! The driver list resource names which drivers to register at startup, one
//! per line. Names resolve against a [`DriverRegistry`]: a catalog of the
//! compiled-in drivers plus any the embedding application adds. Registration
//! is best-effort by contract: a bad entry is logged and skipped, never fatal,
//! so one misconfigured driver cannot take down the ones that resolve.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::db::driver::Driver;
use crate::db::manager::DriverManager;
use crate::error::{DbError, DbResult};

/// Read driver names from the list resource: one name per line, surrounding
/// whitespace trimmed, blank lines ignored. Order is preserved since it
/// becomes registration order.
pub fn load_driver_names(path: impl AsRef<Path>) -> DbResult<Vec<String>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .map_err(|err| DbError::resource(path.display().to_string(), err))?;
    Ok(parse_driver_names(&text))
}

fn parse_driver_names(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Catalog of known drivers, keyed by name.
pub struct DriverRegistry {
    drivers: BTreeMap<String, Arc<dyn Driver>>,
}

impl DriverRegistry {
    /// An empty catalog.
    pub fn new() -> Self {
        Self {
            drivers: BTreeMap::new(),
        }
    }

    /// The catalog of compiled-in drivers.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        #[cfg(feature = "sqlite")]
        registry.add_driver(Arc::new(crate::db::sqlite::SqliteDriver));
        registry
    }

    /// Add a driver under its own name, replacing any previous entry.
    pub fn add_driver(&mut self, driver: Arc<dyn Driver>) {
        self.drivers.insert(driver.name().to_string(), driver);
    }

    /// Look up a driver by name.
    pub fn resolve(&self, name: &str) -> DbResult<Arc<dyn Driver>> {
        self.drivers
            .get(name)
            .cloned()
            .ok_or_else(|| DbError::unknown_driver(name))
    }

    /// Names of all cataloged drivers.
    pub fn names(&self) -> Vec<String> {
        self.drivers.keys().cloned().collect()
    }

    /// Resolve each name and register it with the negotiation facility.
    /// Entries that fail to resolve are logged and skipped. Returns how many
    /// registrations succeeded; callers must not treat a shortfall as fatal.
    pub fn register_all(&self, manager: &DriverManager, names: &[String]) -> usize {
        let mut registered = 0;
        for name in names {
            match self.resolve(name) {
                Ok(driver) => {
                    manager.register(driver);
                    registered += 1;
                }
                Err(err) => {
                    warn!(driver = %name, error = %err, "skipping driver registration");
                }
            }
        }
        registered
    }

    /// Load the driver list resource and register every entry, best-effort
    /// end to end: an unreadable list is logged and treated as empty.
    pub fn register_from_file(&self, manager: &DriverManager, path: impl AsRef<Path>) -> usize {
        let names = match load_driver_names(&path) {
            Ok(names) => names,
            Err(err) => {
                warn!(error = %err, "could not load driver list");
                return 0;
            }
        };
        debug!(count = names.len(), "loaded driver list");
        self.register_all(manager, &names)
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db::driver::Connection;
    use std::io::Write;
    use tempfile::NamedTempFile;

    struct NamedStub(&'static str);

    impl Driver for NamedStub {
        fn name(&self) -> &str {
            self.0
        }
        fn accepts_url(&self, _url: &str) -> bool {
            false
        }
        fn connect(&self, _url: &str, _config: &Config) -> DbResult<Box<dyn Connection>> {
            Err(DbError::connect("stub", "stub"))
        }
    }

    fn temp_list(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_parse_driver_names() {
        let names = parse_driver_names("sqlite\ntestdriver.Driver\n");
        assert_eq!(names, vec!["sqlite", "testdriver.Driver"]);
    }

    #[test]
    fn test_parse_ignores_blank_lines_and_trims() {
        let names = parse_driver_names("  sqlite  \n\n\nmem\n\n");
        assert_eq!(names, vec!["sqlite", "mem"]);
    }

    #[test]
    fn test_parse_preserves_order_and_duplicates() {
        let names = parse_driver_names("b\na\nb\n");
        assert_eq!(names, vec!["b", "a", "b"]);
    }

    #[test]
    fn test_load_driver_names_missing_file() {
        let err = load_driver_names("/nonexistent/dbdrivers.txt").unwrap_err();
        assert!(matches!(err, DbError::Resource { .. }));
    }

    #[test]
    fn test_load_driver_names_from_file() {
        let file = temp_list("mem\nsqlite\n");
        let names = load_driver_names(file.path()).unwrap();
        assert_eq!(names, vec!["mem", "sqlite"]);
    }

    #[test]
    fn test_resolve_unknown_driver() {
        let registry = DriverRegistry::new();
        let err = registry.resolve("nope").err().unwrap();
        assert!(matches!(err, DbError::UnknownDriver { .. }));
    }

    #[test]
    fn test_add_and_resolve() {
        let mut registry = DriverRegistry::new();
        registry.add_driver(Arc::new(NamedStub("mem")));
        assert!(registry.resolve("mem").is_ok());
        assert_eq!(registry.names(), vec!["mem"]);
    }

    #[test]
    fn test_register_all_skips_unknown_names() {
        let mut registry = DriverRegistry::new();
        registry.add_driver(Arc::new(NamedStub("mem")));
        let manager = DriverManager::new();
        let names = vec!["bogus.Driver".to_string(), "mem".to_string()];
        let registered = registry.register_all(&manager, &names);
        assert_eq!(registered, 1);
        assert_eq!(manager.registered_names(), vec!["mem"]);
    }

    #[test]
    fn test_register_all_tolerates_duplicates() {
        let mut registry = DriverRegistry::new();
        registry.add_driver(Arc::new(NamedStub("mem")));
        let manager = DriverManager::new();
        let names = vec!["mem".to_string(), "mem".to_string()];
        assert_eq!(registry.register_all(&manager, &names), 2);
        assert_eq!(manager.registered_names().len(), 2);
    }

    #[test]
    fn test_register_from_missing_file_registers_nothing() {
        let registry = DriverRegistry::new();
        let manager = DriverManager::new();
        let registered = registry.register_from_file(&manager, "/nonexistent/dbdrivers.txt");
        assert_eq!(registered, 0);
        assert!(manager.registered_names().is_empty());
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn test_builtin_catalog_has_sqlite() {
        let registry = DriverRegistry::builtin();
        assert!(registry.resolve("sqlite").is_ok());
    }
}
