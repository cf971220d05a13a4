//! Runtime configuration read from the environment (and `.env`).

use std::path::PathBuf;
use std::str::FromStr;
use crate::domain::aggregates::DEFAULT_PLATE_COST;

pub const DEFAULT_PORT: u16 = 8083;
pub const DEFAULT_DATA_DIR: &str = "./data";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// HTTP listen port (`PORT`).
    pub port: u16,
    /// Directory holding one JSON file per table (`DATA_DIR`).
    pub data_dir: PathBuf,
    /// Event bus, optional (`NATS_URL`).
    pub nats_url: Option<String>,
    /// Plate cost used when a request leaves it out (`DEFAULT_PLATE_COST`).
    pub default_plate_cost: f64,
    /// Seed the default catalog into an empty products table (`SEED_CATALOG`).
    pub seed_catalog: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            nats_url: None,
            default_plate_cost: DEFAULT_PLATE_COST,
            seed_catalog: true,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset or blank keys keep their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let default_plate_cost = parse_or(get("DEFAULT_PLATE_COST"), "DEFAULT_PLATE_COST", defaults.default_plate_cost)?;
        if !default_plate_cost.is_finite() || default_plate_cost < 0.0 {
            return Err(ConfigError::Invalid { key: "DEFAULT_PLATE_COST", value: default_plate_cost.to_string() });
        }

        Ok(Self {
            port: parse_or(get("PORT"), "PORT", defaults.port)?,
            data_dir: get("DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            nats_url: get("NATS_URL"),
            default_plate_cost,
            seed_catalog: match get("SEED_CATALOG") {
                None => defaults.seed_catalog,
                Some(v) => parse_flag(&v).ok_or(ConfigError::Invalid { key: "SEED_CATALOG", value: v })?,
            },
        })
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { key, value }),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let env: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(config(&[]).unwrap(), AppConfig::default());
        assert_eq!(config(&[("NATS_URL", "  ")]).unwrap().nats_url, None);
    }

    #[test]
    fn test_overrides() {
        let cfg = config(&[("PORT", "9000"), ("DATA_DIR", "/var/lib/shop"), ("DEFAULT_PLATE_COST", "20000.5"), ("SEED_CATALOG", "off")]).unwrap();
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.data_dir, PathBuf::from("/var/lib/shop"));
        assert_eq!(cfg.default_plate_cost, 20000.5);
        assert!(!cfg.seed_catalog);
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(config(&[("PORT", "http")]), Err(ConfigError::Invalid { key: "PORT", value: "http".into() }));
        for cost in ["-1", "NaN", "inf", "-inf"] {
            assert!(config(&[("DEFAULT_PLATE_COST", cost)]).is_err(), "{cost}");
        }
        assert!(config(&[("SEED_CATALOG", "maybe")]).is_err());
    }
}
