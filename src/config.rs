use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

use crate::domain::Money;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Simulation parameters, validated before an engine is constructed.
///
/// Invalid values fail fast with [`ConfigError`]; nothing is clamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimConfig {
    /// Fraction of each gross deposit retained by the system account, in [0, 1].
    #[serde(with = "rust_decimal::serde::float")]
    pub maintenance_fee_rate: Decimal,
    /// Fixed gross deposit amount, > 0.
    pub deposit_amount: Money,
    /// N in the successor sequence draw [1, N]. Nomination odds are 1/N per
    /// qualifying deposit.
    pub successor_sequence_max: u32,
    /// Probability slice of a tick spent on the view branch, in [0, 1].
    pub view_weight: f64,
    /// Probability slice of a tick spent on registration, in [0, 1].
    /// `view_weight + conversion_rate` must not exceed 1; the remainder goes
    /// to the deposit branch.
    pub conversion_rate: f64,
    /// Probability that a new member registers verified, in [0, 1].
    pub verification_rate: f64,
    /// Probability that a registration raises a fraud alert, in [0, 1].
    pub fraud_alert_rate: f64,
    /// Bounded event log capacity, >= 1. Oldest entries drop after append.
    pub event_log_cap: usize,
    /// Bounded history series capacity, >= 1.
    pub history_cap: usize,
    /// Snapshot a HistoryPoint every this many ticks, >= 1.
    pub snapshot_every: u64,
    /// Whether confirming a successor nomination actually re-parents the
    /// successor under the nominator's position-1 ancestor.
    pub reparent_on_confirm: bool,
    /// Seed for the tick RNG. None draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            maintenance_fee_rate: Decimal::new(10, 2), // 0.10
            deposit_amount: Money::from_major(10),
            successor_sequence_max: 4,
            view_weight: 0.40,
            conversion_rate: 0.01,
            verification_rate: 0.85,
            fraud_alert_rate: 0.05,
            event_log_cap: 50,
            history_cap: 50,
            snapshot_every: 1,
            reparent_on_confirm: true,
            seed: None,
        }
    }
}

impl SimConfig {
    /// Validate all numeric ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit = |v: Decimal| v >= Decimal::ZERO && v <= Decimal::ONE;
        if !unit(self.maintenance_fee_rate) {
            return Err(ConfigError::InvalidValue(
                "maintenanceFeeRate".to_string(),
                "must be within [0, 1]".to_string(),
            ));
        }
        if !self.deposit_amount.is_positive() {
            return Err(ConfigError::InvalidValue(
                "depositAmount".to_string(),
                "must be > 0".to_string(),
            ));
        }
        if self.successor_sequence_max < 1 {
            return Err(ConfigError::InvalidValue(
                "successorSequenceMax".to_string(),
                "must be >= 1".to_string(),
            ));
        }
        for (name, value) in [
            ("viewWeight", self.view_weight),
            ("conversionRate", self.conversion_rate),
            ("verificationRate", self.verification_rate),
            ("fraudAlertRate", self.fraud_alert_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidValue(
                    name.to_string(),
                    "must be within [0, 1]".to_string(),
                ));
            }
        }
        if self.view_weight + self.conversion_rate > 1.0 {
            return Err(ConfigError::InvalidValue(
                "conversionRate".to_string(),
                "viewWeight + conversionRate must not exceed 1".to_string(),
            ));
        }
        if self.event_log_cap < 1 {
            return Err(ConfigError::InvalidValue(
                "eventLogCap".to_string(),
                "must be >= 1".to_string(),
            ));
        }
        if self.history_cap < 1 {
            return Err(ConfigError::InvalidValue(
                "historyCap".to_string(),
                "must be >= 1".to_string(),
            ));
        }
        if self.snapshot_every < 1 {
            return Err(ConfigError::InvalidValue(
                "snapshotEvery".to_string(),
                "must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Server configuration: listen port plus the simulation parameters.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub sim: SimConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = parse_or(&env_map, "PORT", 8080u16)?;

        let mut sim = SimConfig::default();
        if let Some(raw) = env_map.get("MAINTENANCE_FEE_RATE") {
            sim.maintenance_fee_rate = Decimal::from_str(raw).map_err(|_| {
                ConfigError::InvalidValue(
                    "MAINTENANCE_FEE_RATE".to_string(),
                    "must be a decimal".to_string(),
                )
            })?;
        }
        if let Some(raw) = env_map.get("DEPOSIT_AMOUNT") {
            sim.deposit_amount = Money::from_str_canonical(raw).map_err(|_| {
                ConfigError::InvalidValue(
                    "DEPOSIT_AMOUNT".to_string(),
                    "must be a decimal".to_string(),
                )
            })?;
        }
        sim.successor_sequence_max =
            parse_or(&env_map, "SUCCESSOR_SEQUENCE_MAX", sim.successor_sequence_max)?;
        sim.view_weight = parse_or(&env_map, "VIEW_WEIGHT", sim.view_weight)?;
        sim.conversion_rate = parse_or(&env_map, "CONVERSION_RATE", sim.conversion_rate)?;
        sim.verification_rate = parse_or(&env_map, "VERIFICATION_RATE", sim.verification_rate)?;
        sim.fraud_alert_rate = parse_or(&env_map, "FRAUD_ALERT_RATE", sim.fraud_alert_rate)?;
        sim.event_log_cap = parse_or(&env_map, "EVENT_LOG_CAP", sim.event_log_cap)?;
        sim.history_cap = parse_or(&env_map, "HISTORY_CAP", sim.history_cap)?;
        sim.snapshot_every = parse_or(&env_map, "SNAPSHOT_EVERY", sim.snapshot_every)?;
        sim.reparent_on_confirm =
            parse_or(&env_map, "REPARENT_ON_CONFIRM", sim.reparent_on_confirm)?;
        if let Some(raw) = env_map.get("SIM_SEED") {
            sim.seed = Some(parse_value("SIM_SEED", raw)?);
        }

        sim.validate()?;
        Ok(Config { port, sim })
    }
}

fn parse_or<T: FromStr>(
    env_map: &HashMap<String, String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match env_map.get(key) {
        Some(raw) => parse_value(key, raw),
        None => Ok(default),
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.parse::<T>().map_err(|_| {
        ConfigError::InvalidValue(
            key.to_string(),
            format!("could not parse {:?}", raw),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_fee_rate_out_of_range() {
        let cfg = SimConfig {
            maintenance_fee_rate: Decimal::new(15, 1), // 1.5
            ..SimConfig::default()
        };
        match cfg.validate() {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "maintenanceFeeRate"),
            other => panic!("Expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_deposit_amount_must_be_positive() {
        let cfg = SimConfig {
            deposit_amount: Money::zero(),
            ..SimConfig::default()
        };
        match cfg.validate() {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "depositAmount"),
            other => panic!("Expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_weights_must_fit_in_unit_interval() {
        let cfg = SimConfig {
            view_weight: 0.8,
            conversion_rate: 0.3,
            ..SimConfig::default()
        };
        match cfg.validate() {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "conversionRate"),
            other => panic!("Expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_caps_must_be_at_least_one() {
        let cfg = SimConfig {
            event_log_cap: 0,
            ..SimConfig::default()
        };
        match cfg.validate() {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "eventLogCap"),
            other => panic!("Expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_from_env_map_defaults() {
        let config = Config::from_env_map(HashMap::new()).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.sim, SimConfig::default());
    }

    #[test]
    fn test_from_env_map_overrides() {
        let mut env_map = HashMap::new();
        env_map.insert("PORT".to_string(), "9000".to_string());
        env_map.insert("DEPOSIT_AMOUNT".to_string(), "25".to_string());
        env_map.insert("SIM_SEED".to_string(), "42".to_string());
        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.sim.deposit_amount, Money::from_major(25));
        assert_eq!(config.sim.seed, Some(42));
    }

    #[test]
    fn test_from_env_map_rejects_invalid() {
        let mut env_map = HashMap::new();
        env_map.insert("MAINTENANCE_FEE_RATE".to_string(), "2".to_string());
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "maintenanceFeeRate"),
            other => panic!("Expected InvalidValue, got {:?}", other),
        }
    }
}
