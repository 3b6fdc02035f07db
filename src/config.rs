//! Runtime settings: endpoint and logging.
//!
//! Precedence, highest first: command-line flags, process environment,
//! `.env` (loaded via `dotenvy`, never overriding real variables), defaults.

use std::path::PathBuf;

use crate::data::DEFAULT_ENDPOINT;
use crate::error::AppError;

pub const ENV_ENDPOINT: &str = "RATER_ENDPOINT";
pub const ENV_LOG_FILE: &str = "RATER_LOG_FILE";
pub const ENV_LOG_FILTER: &str = "RATER_LOG";

pub const DEFAULT_LOG_FILTER: &str = "trait_rater=info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub endpoint: String,
    pub log_file: Option<PathBuf>,
    pub log_filter: String,
}

/// Values that can come from the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl Settings {
    /// Load `.env`, then resolve against the process environment.
    pub fn load(overrides: &Overrides) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::resolve(overrides, |key| std::env::var(key).ok())
    }

    /// Resolve settings from `overrides` and an environment lookup.
    pub fn resolve(overrides: &Overrides, env: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let endpoint = overrides
            .endpoint
            .clone()
            .or_else(|| env(ENV_ENDPOINT))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(AppError::usage(format!(
                "Invalid endpoint '{endpoint}': expected an http:// or https:// URL."
            )));
        }

        let log_file = overrides
            .log_file
            .clone()
            .or_else(|| env(ENV_LOG_FILE).filter(|s| !s.trim().is_empty()).map(PathBuf::from));

        let log_filter = env(ENV_LOG_FILTER)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(Self {
            endpoint,
            log_file,
            log_filter,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() {
        let settings = Settings::resolve(&Overrides::default(), env_from(&[])).unwrap();
        assert_eq!(settings.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(settings.log_file, None);
        assert_eq!(settings.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn flag_beats_environment() {
        let overrides = Overrides {
            endpoint: Some("http://localhost:9000/predict".to_string()),
            log_file: None,
        };
        let env = env_from(&[
            (ENV_ENDPOINT, "https://elsewhere.example/predict"),
            (ENV_LOG_FILE, "rater.log"),
        ]);
        let settings = Settings::resolve(&overrides, env).unwrap();
        assert_eq!(settings.endpoint, "http://localhost:9000/predict");
        assert_eq!(settings.log_file, Some(PathBuf::from("rater.log")));
    }

    #[test]
    fn blank_environment_values_are_ignored() {
        let env = env_from(&[(ENV_ENDPOINT, "  "), (ENV_LOG_FILTER, "")]);
        let settings = Settings::resolve(&Overrides::default(), env).unwrap();
        assert_eq!(settings.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(settings.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn rejects_non_http_endpoint() {
        let env = env_from(&[(ENV_ENDPOINT, "ftp://example.org/predict")]);
        let err = Settings::resolve(&Overrides::default(), env).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_USAGE);
    }
}
