//! Realm rules: breeding age, breeding check order, starting health.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use wyrmhold_core::{DomainError, DomainResult};

pub const ENV_MIN_BREEDING_AGE: &str = "WYRMHOLD_MIN_BREEDING_AGE";
pub const ENV_BREEDING_CHECKS: &str = "WYRMHOLD_BREEDING_CHECKS";
pub const ENV_DEFAULT_HEALTH: &str = "WYRMHOLD_DEFAULT_HEALTH";

/// One precondition of `have_baby`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreedingCheck {
    /// Parent must be alive (`AlreadyDead`).
    Alive,
    /// Parent must have reached the breeding age (`TooYoung`).
    Age,
    /// Parent must live somewhere (`NotInResidence`).
    Residence,
}

impl BreedingCheck {
    pub const ALL: [BreedingCheck; 3] = [Self::Alive, Self::Age, Self::Residence];

    pub fn as_str(self) -> &'static str {
        match self {
            BreedingCheck::Alive => "alive",
            BreedingCheck::Age => "age",
            BreedingCheck::Residence => "residence",
        }
    }
}

impl core::fmt::Display for BreedingCheck {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BreedingCheck {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "alive" => Ok(Self::Alive),
            "age" => Ok(Self::Age),
            "residence" => Ok(Self::Residence),
            other => Err(DomainError::config(format!(
                "unknown breeding check '{other}'"
            ))),
        }
    }
}

/// Tunable rules of a realm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RealmConfig {
    /// Minimum age at which a dragon may have a baby.
    pub min_breeding_age: u32,
    /// Order in which `have_baby` preconditions are checked.
    pub breeding_checks: Vec<BreedingCheck>,
    /// Health of newly spawned, born, or revived dragons.
    pub default_health: u32,
}

impl Default for RealmConfig {
    fn default() -> Self {
        Self {
            min_breeding_age: 100,
            breeding_checks: BreedingCheck::ALL.to_vec(),
            default_health: 100,
        }
    }
}

impl RealmConfig {
    /// Load from `WYRMHOLD_*` environment variables, keeping defaults for unset ones.
    pub fn from_env() -> DomainResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (the environment, a map in tests, ...).
    pub fn from_lookup<F>(lookup: F) -> DomainResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_MIN_BREEDING_AGE) {
            config.min_breeding_age = parse_number(ENV_MIN_BREEDING_AGE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_BREEDING_CHECKS) {
            config.breeding_checks = raw
                .split(',')
                .map(BreedingCheck::from_str)
                .collect::<DomainResult<Vec<_>>>()?;
        }
        if let Some(raw) = lookup(ENV_DEFAULT_HEALTH) {
            config.default_health = parse_number(ENV_DEFAULT_HEALTH, &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Each breeding check must appear exactly once and health must be positive.
    pub fn validate(&self) -> DomainResult<()> {
        if self.default_health == 0 {
            return Err(DomainError::config("default_health must be greater than zero"));
        }
        for check in BreedingCheck::ALL {
            let count = self.breeding_checks.iter().filter(|c| **c == check).count();
            if count != 1 {
                return Err(DomainError::config(format!(
                    "breeding check '{check}' must appear exactly once (found {count})"
                )));
            }
        }
        Ok(())
    }
}

fn parse_number(key: &str, raw: &str) -> DomainResult<u32> {
    raw.trim()
        .parse()
        .map_err(|e| DomainError::config(format!("{key}: {e}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use wyrmhold_core::ErrorKind;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_documented_rules() {
        let config = RealmConfig::default();
        assert_eq!(config.min_breeding_age, 100);
        assert_eq!(
            config.breeding_checks,
            vec![BreedingCheck::Alive, BreedingCheck::Age, BreedingCheck::Residence]
        );
        assert_eq!(config.default_health, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_lookup_yields_defaults() {
        let config = RealmConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, RealmConfig::default());
    }

    #[test]
    fn lookup_overrides_every_field() {
        let config = RealmConfig::from_lookup(lookup_from(&[
            (ENV_MIN_BREEDING_AGE, "42"),
            (ENV_BREEDING_CHECKS, "residence, Alive,age"),
            (ENV_DEFAULT_HEALTH, " 250 "),
        ]))
        .unwrap();

        assert_eq!(config.min_breeding_age, 42);
        assert_eq!(
            config.breeding_checks,
            vec![BreedingCheck::Residence, BreedingCheck::Alive, BreedingCheck::Age]
        );
        assert_eq!(config.default_health, 250);
    }

    #[test]
    fn malformed_number_is_config_error() {
        let err = RealmConfig::from_lookup(lookup_from(&[(ENV_MIN_BREEDING_AGE, "old")]))
            .unwrap_err();
        match err.kind() {
            ErrorKind::Config(msg) => assert!(msg.contains(ENV_MIN_BREEDING_AGE)),
            other => panic!("Expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_check_is_config_error() {
        let err = RealmConfig::from_lookup(lookup_from(&[(ENV_BREEDING_CHECKS, "alive,wings")]))
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Config(_)));
    }

    #[test]
    fn repeated_or_missing_check_is_rejected() {
        let config = RealmConfig {
            breeding_checks: vec![BreedingCheck::Alive, BreedingCheck::Alive, BreedingCheck::Age],
            ..RealmConfig::default()
        };
        assert!(matches!(config.validate().unwrap_err().kind(), ErrorKind::Config(_)));
    }

    #[test]
    fn zero_health_is_rejected() {
        let config = RealmConfig {
            default_health: 0,
            ..RealmConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn deserializes_partial_json_with_defaults() {
        let config: RealmConfig =
            serde_json::from_str(r#"{"breeding_checks":["age","residence","alive"]}"#).unwrap();
        assert_eq!(config.min_breeding_age, 100);
        assert_eq!(config.breeding_checks[0], BreedingCheck::Age);
    }
}
