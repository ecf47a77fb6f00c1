//! CMS environment configuration
//!
//! The schema migration tool syncs content types between CMS environments. This
//! crate reads and validates its configuration:
//!
//! ```json
//! {
//!   "environments": [
//!     { "name": "staging", "endpoint": "https://staging.example.com", "accessToken": "..." },
//!     { "name": "cloud", "endpoint": "https://data.example.com", "accessToken": "...", "production": true }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("config lists no environments")]
    NoEnvironments,

    /// Index of the environment without a name
    #[error("environment #{0} has an empty name")]
    EmptyName(usize),

    #[error("environment `{0}` is listed more than once")]
    DuplicateName(String),

    #[error("environment `{name}` has an invalid endpoint: {source}")]
    InvalidEndpoint {
        name: String,
        #[source]
        source: url::ParseError,
    },

    #[error("environment `{name}` endpoint must be http or https, got `{scheme}`")]
    UnsupportedScheme { name: String, scheme: String },

    #[error("more than one production environment: `{0}` and `{1}`")]
    MultipleProduction(String, String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    #[serde(default)]
    environments: Vec<RawEnvironment>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEnvironment {
    name: String,
    endpoint: String,
    access_token: String,
    #[serde(default)]
    production: bool,
}

/// One CMS instance the tool can sync with
#[derive(Clone, PartialEq)]
pub struct Environment {
    pub name: String,
    pub endpoint: Url,
    pub access_token: String,
    pub production: bool,
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint.as_str())
            .field("access_token", &"<redacted>")
            .field("production", &self.production)
            .finish()
    }
}

impl Environment {
    fn from_raw(raw: RawEnvironment) -> Result<Self> {
        let endpoint = Url::parse(&raw.endpoint).map_err(|source| ConfigError::InvalidEndpoint {
            name: raw.name.clone(),
            source,
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme {
                name: raw.name,
                scheme: endpoint.scheme().to_string(),
            });
        }

        Ok(Environment {
            name: raw.name,
            endpoint,
            access_token: raw.access_token,
            production: raw.production,
        })
    }
}

/// Validated sync configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    environments: Vec<Environment>,
}

impl SyncConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawConfig = serde_json::from_str(json)?;
        if raw.environments.is_empty() {
            return Err(ConfigError::NoEnvironments);
        }

        let mut names = HashSet::new();
        let mut production: Option<String> = None;
        let mut environments = Vec::with_capacity(raw.environments.len());

        for (index, raw) in raw.environments.into_iter().enumerate() {
            if raw.name.trim().is_empty() {
                return Err(ConfigError::EmptyName(index));
            }
            if !names.insert(raw.name.clone()) {
                return Err(ConfigError::DuplicateName(raw.name));
            }

            let environment = Environment::from_raw(raw)?;
            if environment.production {
                if let Some(first) = &production {
                    return Err(ConfigError::MultipleProduction(
                        first.clone(),
                        environment.name,
                    ));
                }
                production = Some(environment.name.clone());
            }
            environments.push(environment);
        }

        log::info!("[sync] loaded {} environments", environments.len());
        Ok(SyncConfig { environments })
    }

    /// Read and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("[sync] reading config from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// All environments, in file order
    pub fn environments(&self) -> &[Environment] {
        &self.environments
    }

    /// Find an environment by name
    pub fn environment(&self, name: &str) -> Option<&Environment> {
        self.environments.iter().find(|e| e.name == name)
    }

    /// The environment marked as production, if any
    pub fn production(&self) -> Option<&Environment> {
        self.environments.iter().find(|e| e.production)
    }
}
