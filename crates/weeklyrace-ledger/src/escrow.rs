//! Stake escrow: custody of value captured by accepted bets.
//!
//! Custody is computed with checked arithmetic by [`StakeEscrow::prepare`]
//! alongside the admission checks, and written by [`StakeEscrow::commit`]
//! only once the whole invocation is known to succeed. A rejected call never
//! holds value.
//!
//! Conservation invariant, checkable at any time:
//! ```text
//! Σ(custody) == Σ(race.bets[*].amount) over all races
//! ```
//!
//! There is no release path: payout and refunds belong to race resolution.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::debug;
use weeklyrace_types::{Identity, RaceError, RaceId, Result};

use crate::registry::RaceRegistry;

/// Custody totals computed ahead of a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct PendingCapture {
    race_id: RaceId,
    racer: Identity,
    amount: Decimal,
    position: Decimal,
    race_total: Decimal,
    total: Decimal,
}

/// Per-(race, racer) custody of captured stake.
#[derive(Debug, Default)]
pub struct StakeEscrow {
    holdings: HashMap<(RaceId, Identity), Decimal>,
    race_totals: HashMap<RaceId, Decimal>,
    total: Decimal,
}

impl StakeEscrow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the custody totals that capturing `amount` would produce.
    ///
    /// Nothing is written; apply the result with [`StakeEscrow::commit`].
    ///
    /// # Errors
    /// Returns [`RaceError::StakeOverflow`] if any custody total would overflow.
    pub fn prepare(
        &self,
        race_id: RaceId,
        racer: Identity,
        amount: Decimal,
    ) -> Result<PendingCapture> {
        let overflow = || RaceError::StakeOverflow {
            race_id,
            racer,
            amount,
        };
        let position = self
            .held_for(race_id, &racer)
            .checked_add(amount)
            .ok_or_else(overflow)?;
        let race_total = self
            .race_total(race_id)
            .checked_add(amount)
            .ok_or_else(overflow)?;
        let total = self.total.checked_add(amount).ok_or_else(overflow)?;
        Ok(PendingCapture {
            race_id,
            racer,
            amount,
            position,
            race_total,
            total,
        })
    }

    /// Apply a capture computed by [`StakeEscrow::prepare`].
    pub fn commit(&mut self, pending: PendingCapture) {
        let PendingCapture {
            race_id,
            racer,
            amount,
            position,
            race_total,
            total,
        } = pending;
        self.holdings.insert((race_id, racer), position);
        self.race_totals.insert(race_id, race_total);
        self.total = total;

        debug!(race = %race_id, racer = %racer.short(), %amount, %total, "Stake captured");
    }

    /// Take custody of `amount` on behalf of `racer` in `race_id`.
    ///
    /// # Errors
    /// Returns [`RaceError::StakeOverflow`] and leaves custody untouched if a
    /// total would overflow.
    pub fn capture(&mut self, race_id: RaceId, racer: Identity, amount: Decimal) -> Result<()> {
        let pending = self.prepare(race_id, racer, amount)?;
        self.commit(pending);
        Ok(())
    }

    /// Value held for one racer in one race.
    #[must_use]
    pub fn held_for(&self, race_id: RaceId, racer: &Identity) -> Decimal {
        self.holdings
            .get(&(race_id, *racer))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Value held across every racer in a race.
    #[must_use]
    pub fn race_total(&self, race_id: RaceId) -> Decimal {
        self.race_totals
            .get(&race_id)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    #[must_use]
    pub fn total_custody(&self) -> Decimal {
        self.total
    }

    /// Number of (race, racer) positions with custody.
    #[must_use]
    pub fn position_count(&self) -> usize {
        self.holdings.len()
    }

    /// Verify that custody matches the bet records, race by race.
    ///
    /// # Errors
    /// Returns [`RaceError::Internal`] on the first mismatch.
    pub fn verify_conservation(&self, registry: &RaceRegistry) -> Result<()> {
        let mut recorded_total = Decimal::ZERO;
        for race in registry.races() {
            let recorded = race.total_staked().ok_or_else(|| {
                RaceError::Internal(format!("recorded stake on {} overflows", race.id))
            })?;
            let held = self.race_total(race.id);
            if recorded != held {
                return Err(RaceError::Internal(format!(
                    "custody mismatch on {}: recorded {recorded}, held {held}",
                    race.id
                )));
            }
            for (racer, bet) in &race.bets {
                let held = self.held_for(race.id, racer);
                if held != bet.amount {
                    return Err(RaceError::Internal(format!(
                        "custody mismatch on {} for {racer}: recorded {}, held {held}",
                        race.id, bet.amount
                    )));
                }
            }
            recorded_total = recorded_total.checked_add(recorded).ok_or_else(|| {
                RaceError::Internal("recorded stake across races overflows".into())
            })?;
        }
        if recorded_total != self.total || self.holdings.len() != registry_bet_count(registry) {
            return Err(RaceError::Internal(format!(
                "custody total {} does not match recorded stake {recorded_total}",
                self.total
            )));
        }
        Ok(())
    }
}

fn registry_bet_count(registry: &RaceRegistry) -> usize {
    registry.races().map(weeklyrace_types::Race::bettor_count).sum()
}
