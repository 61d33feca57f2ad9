//! Race and bet record types.
//!
//! A race moves between phases by time alone:
//!
//! ```text
//!   ┌───────────┐  now >= start  ┌────────┐  now >= end  ┌─────────┐
//!   │ SCHEDULED ├───────────────▶│ CLOSED ├─────────────▶│ ELAPSED │
//!   └───────────┘                └────────┘              └─────────┘
//! ```
//!
//! The phase is never stored. It is computed from `(now, start, end)` on
//! demand, so it can never go stale.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{CommitmentHash, Identity, RaceId, Timestamp};

/// Time-derived lifecycle phase of a race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RacePhase {
    /// Before `start`: bets are accepted.
    Scheduled,
    /// Between `start` and `end`: no further bets.
    Closed,
    /// At or after `end`. Resolution is handled elsewhere.
    Elapsed,
}

impl RacePhase {
    /// Compute the phase of a `[start, end)` window at `now`.
    #[must_use]
    pub fn at(now: Timestamp, start: Timestamp, end: Timestamp) -> Self {
        if now < start {
            Self::Scheduled
        } else if now < end {
            Self::Closed
        } else {
            Self::Elapsed
        }
    }

    #[must_use]
    pub fn accepts_bets(self) -> bool {
        self == Self::Scheduled
    }
}

impl std::fmt::Display for RacePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scheduled => write!(f, "SCHEDULED"),
            Self::Closed => write!(f, "CLOSED"),
            Self::Elapsed => write!(f, "ELAPSED"),
        }
    }
}

/// A sealed, funded bet. Written once per (race, identity), never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetRecord {
    /// Opaque commitment to the racer's token selection.
    pub commitment_hash: CommitmentHash,
    /// Stake attached to the registering call.
    pub amount: Decimal,
    /// Ledger time at which the bet was recorded.
    pub placed_at: Timestamp,
}

impl BetRecord {
    /// Non-zero commitment and strictly positive stake.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.commitment_hash.is_zero() && self.amount > Decimal::ZERO
    }
}

/// A time-windowed betting event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Race {
    pub id: RaceId,
    pub start: Timestamp,
    pub end: Timestamp,
    /// One record per racer. Only ever grows.
    pub bets: HashMap<Identity, BetRecord>,
}

impl Race {
    /// A freshly scheduled race with no bets.
    #[must_use]
    pub fn new(id: RaceId, start: Timestamp, end: Timestamp) -> Self {
        Self {
            id,
            start,
            end,
            bets: HashMap::new(),
        }
    }

    #[must_use]
    pub fn phase_at(&self, now: Timestamp) -> RacePhase {
        RacePhase::at(now, self.start, self.end)
    }

    #[must_use]
    pub fn accepts_bets_at(&self, now: Timestamp) -> bool {
        self.phase_at(now).accepts_bets()
    }

    #[must_use]
    pub fn bet(&self, racer: &Identity) -> Option<&BetRecord> {
        self.bets.get(racer)
    }

    #[must_use]
    pub fn has_bet(&self, racer: &Identity) -> bool {
        self.bets.contains_key(racer)
    }

    #[must_use]
    pub fn bettor_count(&self) -> usize {
        self.bets.len()
    }

    /// Sum of all stakes recorded for this race, or `None` if it overflows.
    #[must_use]
    pub fn total_staked(&self) -> Option<Decimal> {
        self.bets
            .values()
            .try_fold(Decimal::ZERO, |acc, b| acc.checked_add(b.amount))
    }

    /// Length of the race window in seconds.
    #[must_use]
    pub fn duration_secs(&self) -> u64 {
        self.end.0.saturating_sub(self.start.0)
    }
}
