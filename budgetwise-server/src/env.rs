use once_cell::sync::Lazy;
use std::cell::UnsafeCell;
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use std::time::Duration;
use zeroize::Zeroize;

pub static CONF: Lazy<Config> = Lazy::new(|| Config::from_env().expect("Failed to load config"));

const DB_USERNAME_VAR: &str = "BUDGETWISE_DB_USERNAME";
const DB_PASSWORD_VAR: &str = "BUDGETWISE_DB_PASSWORD";
const DB_HOSTNAME_VAR: &str = "BUDGETWISE_DB_HOSTNAME";
const DB_PORT_VAR: &str = "BUDGETWISE_DB_PORT";
const DB_NAME_VAR: &str = "BUDGETWISE_DB_NAME";
const DB_MAX_CONNECTIONS_VAR: &str = "BUDGETWISE_DB_MAX_CONNECTIONS";
const DB_IDLE_TIMEOUT_SECS_VAR: &str = "BUDGETWISE_DB_IDLE_TIMEOUT_SECS";

const ACTIX_WORKER_COUNT_VAR: &str = "BUDGETWISE_ACTIX_WORKER_COUNT";
const LOG_LEVEL_VAR: &str = "BUDGETWISE_LOG_LEVEL";

const IDENTITY_HEADER_VAR: &str = "BUDGETWISE_IDENTITY_HEADER";
const HEALTH_ENDPOINT_KEY_VAR: &str = "BUDGETWISE_HEALTH_ENDPOINT_KEY";

const MAX_NAME_LENGTH_VAR: &str = "BUDGETWISE_MAX_NAME_LENGTH";
const MAX_DESCRIPTION_LENGTH_VAR: &str = "BUDGETWISE_MAX_DESCRIPTION_LENGTH";

#[cfg(test)]
pub const TEST_HEALTH_ENDPOINT_KEY: &str = "test-health-endpoint-key";

#[derive(Zeroize)]
pub struct ConfigInner {
    pub db_username: String,
    pub db_password: String,
    pub db_hostname: String,
    #[zeroize(skip)]
    pub db_port: u16,
    pub db_name: String,
    #[zeroize(skip)]
    pub db_max_connections: u32,
    #[zeroize(skip)]
    pub db_idle_timeout: Duration,

    #[zeroize(skip)]
    pub actix_worker_count: usize,
    #[zeroize(skip)]
    pub log_level: String,

    #[zeroize(skip)]
    pub identity_header: String,
    pub health_endpoint_key: String,

    #[zeroize(skip)]
    pub max_name_length: usize,
    #[zeroize(skip)]
    pub max_description_length: usize,
}

pub struct Config {
    inner: UnsafeCell<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        // Safe as long as `unsafe Config::zeroize()` hasn't been called
        unsafe { &*self.inner.get() }
    }
}

// Safe to be shared across threads as long as `unsafe Config::zeroize()` hasn't been called
unsafe impl Sync for Config {}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        let actix_worker_count = env_var_or(ACTIX_WORKER_COUNT_VAR, num_cpus::get());

        // Every worker may hold a connection, so the pool must be at least that large
        let db_max_connections = env_var_or(DB_MAX_CONNECTIONS_VAR, actix_worker_count as u32 * 4)
            .max(actix_worker_count as u32);

        let inner = ConfigInner {
            db_username: env_var_or(DB_USERNAME_VAR, String::from("postgres")),
            db_password: secret_env_var(DB_PASSWORD_VAR, "")?,
            db_hostname: env_var_or(DB_HOSTNAME_VAR, String::from("localhost")),
            db_port: env_var_or(DB_PORT_VAR, 5432),
            db_name: env_var_or(DB_NAME_VAR, String::from("budgetwise")),
            db_max_connections,
            db_idle_timeout: Duration::from_secs(env_var_or(DB_IDLE_TIMEOUT_SECS_VAR, 30)),

            actix_worker_count,
            log_level: env_var_or(LOG_LEVEL_VAR, String::from("info")),

            identity_header: env_var_or(
                IDENTITY_HEADER_VAR,
                String::from("X-Authenticated-Email"),
            ),
            #[cfg(not(test))]
            health_endpoint_key: secret_env_var(HEALTH_ENDPOINT_KEY_VAR, "")?,
            #[cfg(test)]
            health_endpoint_key: String::from(TEST_HEALTH_ENDPOINT_KEY),

            max_name_length: env_var_or(MAX_NAME_LENGTH_VAR, 64),
            max_description_length: env_var_or(MAX_DESCRIPTION_LENGTH_VAR, 255),
        };

        Ok(Config {
            inner: UnsafeCell::new(inner),
        })
    }

    pub fn database_uri(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.db_username, self.db_password, self.db_hostname, self.db_port, self.db_name,
        )
    }

    /// # Safety
    ///
    /// Safe only if the Config isn't being used by other threads or across an async
    /// boundary. Generally, this should only be used at the end of the main function once
    /// all threads have been joined.
    pub unsafe fn zeroize(&self) {
        unsafe {
            (*self.inner.get()).zeroize();
        }
    }
}

/// Secrets have no usable default outside of tests
fn secret_env_var(key: &'static str, test_default: &str) -> Result<String, ConfigError> {
    if cfg!(test) {
        return Ok(env_var_or(key, String::from(test_default)));
    }

    env_var(key)
}

fn env_var<T: FromStr>(key: &'static str) -> Result<T, ConfigError> {
    let var = std::env::var(key).map_err(|_| ConfigError::missing(key))?;
    let var: T = var.parse().map_err(|_| ConfigError::invalid(key))?;
    Ok(var)
}

fn env_var_or<T: FromStr>(key: &'static str, default: T) -> T {
    let Ok(var) = std::env::var(key) else {
        return default;
    };

    var.parse().unwrap_or(default)
}

#[derive(Clone, Copy, Debug)]
pub enum ConfigError {
    MissingVar(&'static str),
    InvalidVar(&'static str),
}

impl ConfigError {
    fn missing(var_name: &'static str) -> Self {
        Self::MissingVar(var_name)
    }

    fn invalid(var_name: &'static str) -> Self {
        Self::InvalidVar(var_name)
    }
}

impl std::error::Error for ConfigError {}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingVar(key) => write!(f, "Missing environment variable '{}'", key),
            Self::InvalidVar(key) => write!(f, "Environment variable '{}' is invalid", key),
        }
    }
}
