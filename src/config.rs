use std::env;
use std::fmt;

use thiserror::Error;
use tracing::error;

// Environment variable names
pub const ENV_API_KEY: &str = "API_KEY";
pub const ENV_SHEET_ID: &str = "SHEET_ID";

/// Credentials needed to read the spreadsheet.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub api_key: String,
    pub sheet_id: String,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variables (API_KEY set: {has_api_key}, SHEET_ID set: {has_sheet_id})")]
    MissingConfiguration {
        has_api_key: bool,
        has_sheet_id: bool,
    },
}

impl ConfigError {
    /// Presence of (`API_KEY`, `SHEET_ID`) at the time resolution failed.
    pub fn presence(&self) -> (bool, bool) {
        match *self {
            ConfigError::MissingConfiguration {
                has_api_key,
                has_sheet_id,
            } => (has_api_key, has_sheet_id),
        }
    }
}

impl Config {
    pub fn load_from_env() -> Result<Config, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Resolve the configuration through `lookup`. Values are trimmed and a
    /// value that is empty after trimming counts as absent.
    ///
    /// The presence flags on failure describe the raw variables: a
    /// whitespace-only value is reported as set even though it is unusable.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        match (read(ENV_API_KEY), read(ENV_SHEET_ID)) {
            (Some(api_key), Some(sheet_id)) => Ok(Config { api_key, sheet_id }),
            _ => {
                let is_set = |name: &str| lookup(name).is_some_and(|value| !value.is_empty());
                let has_api_key = is_set(ENV_API_KEY);
                let has_sheet_id = is_set(ENV_SHEET_ID);
                error!(has_api_key, has_sheet_id, "Missing env vars");
                Err(ConfigError::MissingConfiguration {
                    has_api_key,
                    has_sheet_id,
                })
            }
        }
    }
}

// never print the key itself
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &format_args!("<{} chars>", self.api_key.len()))
            .field("sheet_id", &self.sheet_id)
            .finish()
    }
}
