//! Bet Ledger: admits at most one sealed, funded bet per (race, identity).
//!
//! ## Admission checks
//!
//! All checks run before any mutation, in this order:
//!
//! ```text
//! 1. caller != owner                    → Unauthorized
//! 2. at least one race exists           → RegistryEmpty
//!    (strict lookup) race id allocated  → RaceNotFound
//! 3. commitment hash non-zero           → InvalidCommitment
//! 4. stake > 0                          → InvalidCommitment
//! 5. now < race.start                   → RaceWindowClosed
//! 6. no record for (race, caller) yet   → DuplicateBet
//! ```
//!
//! Per (race, identity) the only transition is `Unset → Committed`.

use rust_decimal::Decimal;
use tracing::debug;
use weeklyrace_types::{
    BetRecord, CommitmentHash, Identity, RaceError, RaceId, RaceLookup, Result, Timestamp,
};

use crate::registry::RaceRegistry;

/// Write-once bet admission over the races held by a [`RaceRegistry`].
///
/// Bet records live inside their parent `Race`; the ledger owns only the
/// admission policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct BetLedger {
    lookup: RaceLookup,
}

impl BetLedger {
    #[must_use]
    pub fn new(lookup: RaceLookup) -> Self {
        Self { lookup }
    }

    #[must_use]
    pub fn lookup(&self) -> RaceLookup {
        self.lookup
    }

    /// Run every admission check without mutating anything.
    ///
    /// # Errors
    /// The first failing check, in the order listed in the module docs.
    pub fn check_admissible(
        &self,
        registry: &RaceRegistry,
        caller: Identity,
        race_id: RaceId,
        commitment_hash: CommitmentHash,
        stake: Decimal,
        now: Timestamp,
    ) -> Result<()> {
        if caller == registry.owner() {
            return Err(RaceError::Unauthorized {
                caller,
                action: "place a bet",
            });
        }
        if registry.is_empty() {
            return Err(RaceError::RegistryEmpty);
        }
        let start = registry.scheduled_start(race_id, self.lookup)?;
        if commitment_hash.is_zero() {
            return Err(RaceError::InvalidCommitment {
                reason: "commitment hash is zero".into(),
            });
        }
        if stake <= Decimal::ZERO {
            return Err(RaceError::InvalidCommitment {
                reason: format!("stake must be positive, got {stake}"),
            });
        }
        if now >= start {
            return Err(RaceError::RaceWindowClosed {
                race_id,
                start,
                now,
            });
        }
        if self.has_bet(registry, race_id, &caller) {
            return Err(RaceError::DuplicateBet {
                race_id,
                racer: caller,
            });
        }
        Ok(())
    }

    /// Validate and record a bet. Returns the stored record.
    ///
    /// On any error nothing is written.
    pub fn register_bet(
        &self,
        registry: &mut RaceRegistry,
        caller: Identity,
        race_id: RaceId,
        commitment_hash: CommitmentHash,
        stake: Decimal,
        now: Timestamp,
    ) -> Result<BetRecord> {
        self.check_admissible(registry, caller, race_id, commitment_hash, stake, now)?;
        Self::record(registry, caller, race_id, commitment_hash, stake, now)
    }

    /// Store a bet that already passed [`BetLedger::check_admissible`].
    pub(crate) fn record(
        registry: &mut RaceRegistry,
        caller: Identity,
        race_id: RaceId,
        commitment_hash: CommitmentHash,
        stake: Decimal,
        now: Timestamp,
    ) -> Result<BetRecord> {
        // A race that passed the timing check exists under either lookup policy.
        let race = registry
            .race_mut(race_id)
            .ok_or(RaceError::RaceNotFound(race_id))?;
        let record = BetRecord {
            commitment_hash,
            amount: stake,
            placed_at: now,
        };
        race.bets.insert(caller, record.clone());

        debug!(race = %race_id, racer = %caller.short(), bettors = race.bettor_count(), "Bet recorded");
        Ok(record)
    }

    #[must_use]
    pub fn bet<'a>(
        &self,
        registry: &'a RaceRegistry,
        race_id: RaceId,
        racer: &Identity,
    ) -> Option<&'a BetRecord> {
        registry.race(race_id).and_then(|race| race.bet(racer))
    }

    #[must_use]
    pub fn has_bet(&self, registry: &RaceRegistry, race_id: RaceId, racer: &Identity) -> bool {
        self.bet(registry, race_id, racer).is_some()
    }
}
