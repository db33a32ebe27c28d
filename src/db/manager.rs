//! Connection negotiation facility.
//!
//! [`DriverManager`] holds the process-wide list of registered drivers and
//! matches connection URLs against them. Registration normally happens once
//! at startup (driven by the driver list resource); lookups may come from any
//! thread, so the list sits behind a lock.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::db::driver::{Connection, Driver};
use crate::error::{DbError, DbResult};

/// Extract the scheme from a connection URL for logging and errors.
///
/// Connection URLs may embed credentials, so only the scheme ever leaves
/// this module.
pub(crate) fn url_scheme(url: &str) -> String {
    Url::parse(url)
        .map(|u| u.scheme().to_string())
        .unwrap_or_else(|_| "unknown".to_string())
}

/// Ordered registry of drivers willing to negotiate connections.
pub struct DriverManager {
    drivers: RwLock<Vec<Arc<dyn Driver>>>,
}

impl DriverManager {
    pub fn new() -> Self {
        Self {
            drivers: RwLock::new(Vec::new()),
        }
    }

    /// Register a driver. Drivers are tried in registration order; registering
    /// the same driver twice is harmless (the first copy wins negotiation).
    pub fn register(&self, driver: Arc<dyn Driver>) {
        debug!(driver = %driver.name(), "registering driver");
        self.drivers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(driver);
    }

    /// Names of all registered drivers, in registration order.
    pub fn registered_names(&self) -> Vec<String> {
        self.drivers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|d| d.name().to_string())
            .collect()
    }

    /// Open a connection to `url` through the first registered driver that
    /// accepts it. Once a driver accepts, its connect failure propagates
    /// rather than falling through to later drivers.
    pub fn connect(&self, url: &str, config: &Config) -> DbResult<Box<dyn Connection>> {
        let driver = self
            .drivers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|d| d.accepts_url(url))
            .cloned();
        match driver {
            Some(driver) => {
                debug!(driver = %driver.name(), "driver accepted connection URL");
                driver.connect(url, config)
            }
            None => Err(DbError::driver_not_found(url_scheme(url))),
        }
    }
}

impl Default for DriverManager {
    fn default() -> Self {
        Self::new()
    }
}
