//! Error types for the WeeklyRace ledger.
//!
//! All errors use the `WR_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Authorization errors
//! - 2xx: Scheduling errors
//! - 3xx: Bet errors
//! - 4xx: Registry errors
//! - 5xx: Value attachment errors
//! - 9xx: General / internal errors
//!
//! Every variant is a precondition rejection: the invocation that produced it
//! applied no state change, emitted no notification, and captured no value.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{Identity, RaceId, Timestamp};

/// Central error enum for all WeeklyRace operations.
#[derive(Debug, Error)]
pub enum RaceError {
    // =================================================================
    // Authorization Errors (1xx)
    // =================================================================
    /// A non-owner tried to create a race, or the owner tried to bet.
    #[error("WR_ERR_100: Unauthorized: {caller} may not {action}")]
    Unauthorized {
        caller: Identity,
        action: &'static str,
    },

    // =================================================================
    // Scheduling Errors (2xx)
    // =================================================================
    /// Start/end ordering is wrong or the start is not in the future.
    #[error("WR_ERR_200: Invalid schedule: {reason}")]
    InvalidSchedule { reason: String },

    // =================================================================
    // Bet Errors (3xx)
    // =================================================================
    /// Zero commitment hash or non-positive stake.
    #[error("WR_ERR_300: Invalid commitment: {reason}")]
    InvalidCommitment { reason: String },

    /// The bet arrived at or after the race start.
    #[error("WR_ERR_301: Betting closed for {race_id}: start {start}, now {now}")]
    RaceWindowClosed {
        race_id: RaceId,
        start: Timestamp,
        now: Timestamp,
    },

    /// The caller already holds a bet record for this race.
    #[error("WR_ERR_302: Duplicate bet on {race_id} from {racer}")]
    DuplicateBet { race_id: RaceId, racer: Identity },

    /// Taking custody of the stake would overflow a custody total.
    #[error("WR_ERR_303: Stake overflow on {race_id}: {amount} from {racer} exceeds custody range")]
    StakeOverflow {
        race_id: RaceId,
        racer: Identity,
        amount: Decimal,
    },

    // =================================================================
    // Registry Errors (4xx)
    // =================================================================
    /// No race has ever been created.
    #[error("WR_ERR_400: Registry is empty: no race has been created")]
    RegistryEmpty,

    /// The race id was never allocated.
    #[error("WR_ERR_401: Race not found: {0}")]
    RaceNotFound(RaceId),

    /// The race counter cannot be advanced any further.
    #[error("WR_ERR_402: Race id space exhausted")]
    RaceIdExhausted,

    // =================================================================
    // Value Attachment Errors (5xx)
    // =================================================================
    /// Value was attached to an entry point that does not accept it.
    #[error("WR_ERR_500: Entry point is not payable: {attached} attached")]
    UnexpectedValue { attached: Decimal },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error (broken invariant).
    #[error("WR_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / parsing error.
    #[error("WR_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config document, missing fields, etc.).
    #[error("WR_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

impl RaceError {
    /// Numeric code, matching the `WR_ERR_` prefix of the message.
    #[must_use]
    pub fn code(&self) -> u16 {
        match self {
            Self::Unauthorized { .. } => 100,
            Self::InvalidSchedule { .. } => 200,
            Self::InvalidCommitment { .. } => 300,
            Self::RaceWindowClosed { .. } => 301,
            Self::DuplicateBet { .. } => 302,
            Self::StakeOverflow { .. } => 303,
            Self::RegistryEmpty => 400,
            Self::RaceNotFound(_) => 401,
            Self::RaceIdExhausted => 402,
            Self::UnexpectedValue { .. } => 500,
            Self::Internal(_) => 900,
            Self::Serialization(_) => 901,
            Self::Configuration(_) => 902,
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, RaceError>;

impl From<serde_json::Error> for RaceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_contains_prefix() {
        let err = RaceError::RaceNotFound(RaceId(7));
        let msg = format!("{err}");
        assert!(msg.starts_with("WR_ERR_401"), "Got: {msg}");
        assert!(msg.contains("race:7"));
    }

    #[test]
    fn window_closed_display() {
        let err = RaceError::RaceWindowClosed {
            race_id: RaceId(0),
            start: Timestamp(100),
            now: Timestamp(150),
        };
        let msg = format!("{err}");
        assert!(msg.contains("WR_ERR_301"));
        assert!(msg.contains("100"));
        assert!(msg.contains("150"));
    }

    #[test]
    fn code_matches_message_prefix() {
        let errors = vec![
            RaceError::Unauthorized {
                caller: Identity::ZERO,
                action: "create a race",
            },
            RaceError::InvalidSchedule {
                reason: "start >= end".into(),
            },
            RaceError::InvalidCommitment {
                reason: "zero hash".into(),
            },
            RaceError::DuplicateBet {
                race_id: RaceId(1),
                racer: Identity::ZERO,
            },
            RaceError::StakeOverflow {
                race_id: RaceId(0),
                racer: Identity::ZERO,
                amount: Decimal::MAX,
            },
            RaceError::RegistryEmpty,
            RaceError::RaceIdExhausted,
            RaceError::UnexpectedValue {
                attached: Decimal::ONE,
            },
            RaceError::Internal("test".into()),
            RaceError::Configuration("test".into()),
        ];
        for err in errors {
            let msg = format!("{err}");
            let expected = format!("WR_ERR_{}", err.code());
            assert!(msg.starts_with(&expected), "{msg} does not start with {expected}");
        }
    }

    #[test]
    fn serde_json_error_converts() {
        let parse_err = serde_json::from_str::<u8>("not json").unwrap_err();
        let err: RaceError = parse_err.into();
        assert!(matches!(err, RaceError::Serialization(_)));
    }
}
