//! Service configuration from the environment.

use cardsync_engine::ServiceConfig;
use std::time::Duration;
use thiserror::Error;

/// API key variable.
pub const API_KEY_VAR: &str = "MOCHI_API_KEY";
/// Base URL override.
pub const BASE_URL_VAR: &str = "MOCHI_BASE_URL";
/// Page size override.
pub const PAGE_SIZE_VAR: &str = "MOCHI_PAGE_SIZE";
/// Request timeout override, in seconds.
pub const TIMEOUT_VAR: &str = "MOCHI_TIMEOUT_SECS";

/// Errors reading the configuration.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("{0} is not set (export it or add it to a .env file)")]
    Missing(&'static str),

    /// A variable could not be parsed.
    #[error("invalid value for {var}: {value:?}")]
    Invalid {
        /// Variable name.
        var: &'static str,
        /// Offending value.
        value: String,
    },
}

/// Builds the service configuration from process environment variables.
pub fn from_env() -> Result<ServiceConfig, ConfigError> {
    from_lookup(|name| std::env::var(name).ok())
}

/// Builds the service configuration from a variable lookup.
pub fn from_lookup<F>(lookup: F) -> Result<ServiceConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

    let api_key = lookup(API_KEY_VAR).ok_or(ConfigError::Missing(API_KEY_VAR))?;
    let mut config = ServiceConfig::new(api_key.trim());

    if let Some(base_url) = lookup(BASE_URL_VAR) {
        config = config.with_base_url(base_url.trim());
    }
    if let Some(value) = lookup(PAGE_SIZE_VAR) {
        let page_size = parse(PAGE_SIZE_VAR, &value)?;
        config = config.with_page_size(page_size);
    }
    if let Some(value) = lookup(TIMEOUT_VAR) {
        let seconds = parse(TIMEOUT_VAR, &value)?;
        config = config.with_timeout(Duration::from_secs(seconds));
    }
    Ok(config)
}

fn parse<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        var,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardsync_engine::{DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE};
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn api_key_is_required() {
        assert_eq!(
            from_lookup(lookup(&[])).unwrap_err(),
            ConfigError::Missing(API_KEY_VAR)
        );
        assert_eq!(
            from_lookup(lookup(&[(API_KEY_VAR, "  ")])).unwrap_err(),
            ConfigError::Missing(API_KEY_VAR)
        );
    }

    #[test]
    fn defaults_apply() {
        let config = from_lookup(lookup(&[(API_KEY_VAR, "key")])).unwrap();
        assert_eq!(config.api_key, "key");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn overrides_apply() {
        let config = from_lookup(lookup(&[
            (API_KEY_VAR, "key"),
            (BASE_URL_VAR, "http://localhost:8080/api/"),
            (PAGE_SIZE_VAR, "25"),
            (TIMEOUT_VAR, "5"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://localhost:8080/api");
        assert_eq!(config.page_size, 25);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let err = from_lookup(lookup(&[(API_KEY_VAR, "key"), (PAGE_SIZE_VAR, "many")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: PAGE_SIZE_VAR, .. }));
    }
}
