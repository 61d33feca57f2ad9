//! Configuration for a WeeklyRace ledger instance.

use serde::{Deserialize, Serialize};

use crate::{Identity, RaceError, Result};

/// How bet registration resolves the race it targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaceLookup {
    /// The race id must have been allocated; anything else is `RaceNotFound`.
    #[default]
    Strict,
    /// Only require that *some* race exists. An unallocated id reads as a
    /// race starting at time zero and is therefore rejected as closed.
    Legacy,
}

/// Immutable ledger configuration, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// The single identity allowed to create races and barred from betting.
    pub owner: Identity,
    /// Race resolution policy for bet registration.
    #[serde(default)]
    pub race_lookup: RaceLookup,
}

impl LedgerConfig {
    /// Strict-lookup configuration for the given owner.
    #[must_use]
    pub fn new(owner: Identity) -> Self {
        Self {
            owner,
            race_lookup: RaceLookup::default(),
        }
    }

    #[must_use]
    pub fn with_race_lookup(mut self, race_lookup: RaceLookup) -> Self {
        self.race_lookup = race_lookup;
        self
    }

    /// Reject configurations that could never be deployed.
    pub fn validate(&self) -> Result<()> {
        if self.owner.is_zero() {
            return Err(RaceError::Configuration(
                "owner must not be the zero identity".into(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| RaceError::Configuration(format!("invalid ledger config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER_HEX: &str = "0x627306090abab3a6e1400e9345bc60c78a8bef57";

    #[test]
    fn parse_minimal_config_defaults_to_strict() {
        let json = format!(r#"{{ "owner": "{OWNER_HEX}" }}"#);
        let cfg = LedgerConfig::from_json_str(&json).unwrap();
        assert_eq!(cfg.owner, OWNER_HEX.parse::<Identity>().unwrap());
        assert_eq!(cfg.race_lookup, RaceLookup::Strict);
    }

    #[test]
    fn parse_legacy_lookup() {
        let json = format!(r#"{{ "owner": "{OWNER_HEX}", "race_lookup": "legacy" }}"#);
        let cfg = LedgerConfig::from_json_str(&json).unwrap();
        assert_eq!(cfg.race_lookup, RaceLookup::Legacy);
    }

    #[test]
    fn zero_owner_rejected() {
        let json = format!(r#"{{ "owner": "0x{}" }}"#, "00".repeat(20));
        let err = LedgerConfig::from_json_str(&json).unwrap_err();
        assert!(matches!(err, RaceError::Configuration(_)));
    }

    #[test]
    fn malformed_owner_rejected() {
        let err = LedgerConfig::from_json_str(r#"{ "owner": "0x12" }"#).unwrap_err();
        assert!(matches!(err, RaceError::Configuration(_)));
    }

    #[test]
    fn config_serde_roundtrip() {
        let cfg = LedgerConfig::new(Identity::random()).with_race_lookup(RaceLookup::Legacy);
        let json = cfg.to_json().unwrap();
        let back = LedgerConfig::from_json_str(&json).unwrap();
        assert_eq!(cfg, back);
    }
}
