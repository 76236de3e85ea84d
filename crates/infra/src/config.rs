//! Configuration loading and representation.

use anyhow::{Context, Result};

use campus_observability::{LogConfig, LogFormat};

pub const AUDIT_CAPACITY_VAR: &str = "CAMPUS_AUDIT_CAPACITY";
pub const LOG_FORMAT_VAR: &str = "CAMPUS_LOG_FORMAT";
pub const LOG_LEVEL_VAR: &str = "CAMPUS_LOG_LEVEL";

const DEFAULT_AUDIT_CAPACITY: usize = 10_000;

/// Process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampusConfig {
    /// Maximum number of audit entries kept in memory (oldest evicted first).
    pub audit_capacity: usize,
    pub log: LogConfig,
}

impl Default for CampusConfig {
    fn default() -> Self {
        Self {
            audit_capacity: DEFAULT_AUDIT_CAPACITY,
            log: LogConfig::default(),
        }
    }
}

impl CampusConfig {
    /// Read configuration from the process environment, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`CampusConfig::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(AUDIT_CAPACITY_VAR) {
            let capacity: usize = raw
                .trim()
                .parse()
                .with_context(|| format!("{AUDIT_CAPACITY_VAR}='{raw}' is not a valid number"))?;
            anyhow::ensure!(capacity > 0, "{AUDIT_CAPACITY_VAR} must be greater than zero");
            config.audit_capacity = capacity;
        }

        if let Some(raw) = lookup(LOG_FORMAT_VAR) {
            config.log.format = raw
                .parse::<LogFormat>()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("invalid {LOG_FORMAT_VAR}"))?;
        }

        if let Some(raw) = lookup(LOG_LEVEL_VAR) {
            let directive = raw.trim();
            anyhow::ensure!(!directive.is_empty(), "{LOG_LEVEL_VAR} must not be blank");
            config.log.default_directive = directive.to_string();
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = CampusConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, CampusConfig::default());
        assert_eq!(config.audit_capacity, 10_000);
        assert_eq!(config.log.format, LogFormat::Json);
    }

    #[test]
    fn values_are_read_from_the_environment() {
        let config = CampusConfig::from_lookup(lookup(&[
            (AUDIT_CAPACITY_VAR, "250"),
            (LOG_FORMAT_VAR, "pretty"),
            (LOG_LEVEL_VAR, "campus_infra=debug"),
        ]))
        .unwrap();

        assert_eq!(config.audit_capacity, 250);
        assert_eq!(config.log.format, LogFormat::Pretty);
        assert_eq!(config.log.default_directive, "campus_infra=debug");
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = CampusConfig::from_lookup(lookup(&[(AUDIT_CAPACITY_VAR, "lots")])).unwrap_err();
        assert!(err.to_string().contains(AUDIT_CAPACITY_VAR));

        let err = CampusConfig::from_lookup(lookup(&[(AUDIT_CAPACITY_VAR, "0")])).unwrap_err();
        assert!(err.to_string().contains("greater than zero"));

        let err = CampusConfig::from_lookup(lookup(&[(LOG_FORMAT_VAR, "xml")])).unwrap_err();
        assert!(err.to_string().contains(LOG_FORMAT_VAR));
    }
}
