use std::path::PathBuf;

use hzc_db::DuplicatePolicy;
use serde::Deserialize;

/// Prefix of every configuration variable, e.g. `HZC_DATA_PATH`
pub const ENV_PREFIX: &str = "HZC_";

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub const fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub env: Environment,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// JSON file holding cards and categories
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,
    /// Reject new cards whose Chinese text is already stored
    #[serde(default = "default_reject_duplicates")]
    pub reject_duplicates: bool,
}

fn default_bind_address() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_data_path() -> PathBuf {
    PathBuf::from("flashcards.json")
}

const fn default_reject_duplicates() -> bool {
    true
}

impl ApiConfig {
    /// Read `HZC_*` variables from the process environment.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::prefixed(ENV_PREFIX).from_env()
    }

    pub const fn duplicate_policy(&self) -> DuplicatePolicy {
        if self.reject_duplicates {
            DuplicatePolicy::Reject
        } else {
            DuplicatePolicy::Allow
        }
    }
}
