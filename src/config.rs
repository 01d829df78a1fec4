// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{defaults, env as vars, FIELD_MANAGER};
use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

/// Client configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Namespace the Repository client operates in
    pub namespace: String,
    /// Field manager name sent with apply requests
    pub field_manager: String,
    /// Deadline applied to each API call
    pub request_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let namespace = lookup(vars::NAMESPACE).unwrap_or_else(|| defaults::NAMESPACE.to_string());
        let field_manager = lookup(vars::FIELD_MANAGER).unwrap_or_else(|| FIELD_MANAGER.to_string());

        let request_timeout_secs = match lookup(vars::REQUEST_TIMEOUT_SECS) {
            Some(raw) => raw.parse::<u64>().with_context(|| {
                format!("{} must be a whole number of seconds, got '{}'", vars::REQUEST_TIMEOUT_SECS, raw)
            })?,
            None => defaults::REQUEST_TIMEOUT_SECS,
        };

        Ok(Config {
            namespace,
            field_manager,
            request_timeout: Duration::from_secs(request_timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config.namespace, "default");
        assert_eq!(config.field_manager, FIELD_MANAGER);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_values_from_environment() {
        let config = Config::from_lookup(lookup_from(&[
            (vars::NAMESPACE, "grafana"),
            (vars::FIELD_MANAGER, "repo-controller"),
            (vars::REQUEST_TIMEOUT_SECS, "5"),
        ]))
        .unwrap();

        assert_eq!(config.namespace, "grafana");
        assert_eq!(config.field_manager, "repo-controller");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_timeout_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[(vars::REQUEST_TIMEOUT_SECS, "soon")]))
            .unwrap_err();

        assert!(err.to_string().contains(vars::REQUEST_TIMEOUT_SECS));
    }
}
