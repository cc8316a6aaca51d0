//! Runtime configuration loaded from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `SPYCAT_HOST` | `127.0.0.1` |
//! | `SPYCAT_PORT` | `8080` |
//! | `SPYCAT_DB_PATH` | platform data dir, `spycat.db` |
//! | `SPYCAT_BREED_API_URL` | TheCatAPI |
//! | `SPYCAT_BREED_API_TIMEOUT_SECS` | `10` |
//! | `SPYCAT_OFFLINE_BREEDS` | unset; comma-separated list replaces the remote catalog |

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::breeds::{
    BreedLookupError, BreedValidator, FixedBreeds, TheCatApi, DEFAULT_BREED_API_TIMEOUT,
    DEFAULT_BREED_API_URL,
};
use crate::db::Database;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// `None` means the platform default location.
    pub database_path: Option<PathBuf>,
    pub breed_api_url: String,
    pub breed_api_timeout: Duration,
    /// When set, breeds are checked against this list instead of the API.
    pub offline_breeds: Option<Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database_path: None,
            breed_api_url: DEFAULT_BREED_API_URL.to_string(),
            breed_api_timeout: DEFAULT_BREED_API_TIMEOUT,
            offline_breeds: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source. Unparseable values
    /// fall back to the default with a warning.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let var = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        let port = match var("SPYCAT_PORT") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!("Ignoring invalid SPYCAT_PORT {:?}", raw);
                defaults.port
            }),
            None => defaults.port,
        };

        let breed_api_timeout = match var("SPYCAT_BREED_API_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .unwrap_or_else(|_| {
                    tracing::warn!("Ignoring invalid SPYCAT_BREED_API_TIMEOUT_SECS {:?}", raw);
                    defaults.breed_api_timeout
                }),
            None => defaults.breed_api_timeout,
        };

        let offline_breeds = var("SPYCAT_OFFLINE_BREEDS").map(|s| {
            s.split(',')
                .map(|b| b.trim().to_string())
                .filter(|b| !b.is_empty())
                .collect()
        });

        Self {
            host: var("SPYCAT_HOST").unwrap_or(defaults.host),
            port,
            database_path: var("SPYCAT_DB_PATH").map(PathBuf::from),
            breed_api_url: var("SPYCAT_BREED_API_URL").unwrap_or(defaults.breed_api_url),
            breed_api_timeout,
            offline_breeds,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn open_database(&self) -> anyhow::Result<Database> {
        match &self.database_path {
            Some(path) => Database::open(path.clone()),
            None => Database::open_default(),
        }
    }

    pub fn breed_validator(&self) -> Result<Arc<dyn BreedValidator>, BreedLookupError> {
        match &self.offline_breeds {
            Some(names) => {
                tracing::info!("Using offline breed catalog ({} breeds)", names.len());
                Ok(Arc::new(FixedBreeds::new(names.iter().cloned())))
            }
            None => Ok(Arc::new(TheCatApi::new(
                self.breed_api_url.clone(),
                self.breed_api_timeout,
            )?)),
        }
    }
}
