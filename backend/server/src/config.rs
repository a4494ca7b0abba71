use std::{env, fmt::Display, fs::read_to_string, str::FromStr, time::Duration};

use process::models::{CANDIDATES_ENDPOINT, ENDPOINT};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Redis,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            other => Err(format!("expected redis or memory, got {other}")),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub store: StoreBackend,
    pub redis_url: String,
    pub fec_base_url: String,
    pub fec_candidates_url: String,
    pub fec_api_key: String,
    pub fec_per_page: u32,
    pub ingest_interval: Duration,
    pub ingest_on_start: bool,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| {
            read_secret(key).or_else(|| env::var(key).ok())
        })
    }

    /// Builds the config from any key lookup, `load` wires it to secrets then the environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            port: try_load(&lookup, "RUST_PORT", "8080")?,
            store: try_load(&lookup, "STORE_BACKEND", "redis")?,
            redis_url: try_load(&lookup, "REDIS_URL", "redis://127.0.0.1:6379")?,
            fec_base_url: try_load(&lookup, "FEC_BASE_URL", ENDPOINT)?,
            fec_candidates_url: try_load(&lookup, "FEC_CANDIDATES_URL", CANDIDATES_ENDPOINT)?,
            fec_api_key: try_load(&lookup, "FEC_API_KEY", "DEMO_KEY")?,
            fec_per_page: try_load(&lookup, "FEC_PER_PAGE", "100")?,
            ingest_interval: Duration::from_secs(try_load(
                &lookup,
                "INGEST_INTERVAL_SECS",
                "86400",
            )?),
            ingest_on_start: try_load(&lookup, "INGEST_ON_START", "true")?,
        })
    }
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        value: value.clone(),
        reason: e.to_string(),
    })
}

/// Only keys that name a mounted secret resolve here, everything else falls through to the environment.
fn read_secret(secret_name: &str) -> Option<String> {
    let path = format!("/run/secrets/{secret_name}");

    match read_to_string(&path) {
        Ok(secret) => Some(secret.trim().to_string()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            warn!("Failed to read {secret_name} from file: {e}");
            None
        }
    }
}
