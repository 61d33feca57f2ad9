//! The `WeeklyRace` facade: the only externally invocable entry points.
//!
//! Each invocation reads the clock once, runs every check, and only then
//! applies its effects (state, escrow, notification) together. A rejected
//! invocation changes nothing and emits nothing.

use rust_decimal::Decimal;
use tracing::{info, warn};
use weeklyrace_types::{
    BetRecord, CommitmentHash, EventFilter, EventRecord, Identity, LedgerConfig, Race,
    RaceError, RaceEvent, RaceId, RacePhase, Result, Timestamp, constants,
};

use crate::{
    bet_ledger::BetLedger,
    clock::{Clock, SystemClock},
    context::CallContext,
    escrow::StakeEscrow,
    event_log::EventLog,
    registry::RaceRegistry,
};

/// Race registry, bet ledger, stake escrow and notification log behind
/// one serialized interface.
#[derive(Debug)]
pub struct WeeklyRace<C: Clock = SystemClock> {
    config: LedgerConfig,
    clock: C,
    registry: RaceRegistry,
    ledger: BetLedger,
    escrow: StakeEscrow,
    log: EventLog,
}

impl<C: Clock> WeeklyRace<C> {
    /// Build a ledger from a validated configuration.
    pub fn new(config: LedgerConfig, clock: C) -> Result<Self> {
        config.validate()?;
        info!(
            engine = constants::ENGINE_NAME,
            version = constants::VERSION,
            owner = %config.owner,
            race_lookup = ?config.race_lookup,
            "WeeklyRace ledger initialized"
        );
        Ok(Self {
            registry: RaceRegistry::new(config.owner),
            ledger: BetLedger::new(config.race_lookup),
            escrow: StakeEscrow::new(),
            log: EventLog::new(),
            config,
            clock,
        })
    }

    /// Deploy with the deploying caller as owner. Construction is not payable.
    pub fn deploy(ctx: &CallContext, clock: C) -> Result<Self> {
        if ctx.carries_value() {
            return Err(RaceError::UnexpectedValue {
                attached: ctx.value,
            });
        }
        Self::new(LedgerConfig::new(ctx.caller), clock)
    }

    // =================================================================
    // Entry points
    // =================================================================

    /// Schedule a new race. Owner only; not payable.
    pub fn create_race(
        &mut self,
        ctx: &CallContext,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<RaceId> {
        let now = self.clock.now();
        self.try_create_race(ctx, start, end, now)
            .inspect_err(|err| {
                warn!(
                    code = err.code(),
                    caller = %ctx.caller,
                    %start,
                    %end,
                    %now,
                    error = %err,
                    "createRace rejected"
                );
            })
    }

    fn try_create_race(
        &mut self,
        ctx: &CallContext,
        start: Timestamp,
        end: Timestamp,
        now: Timestamp,
    ) -> Result<RaceId> {
        if ctx.carries_value() {
            return Err(RaceError::UnexpectedValue {
                attached: ctx.value,
            });
        }
        let race_id = self.registry.create_race(ctx.caller, start, end, now)?;
        let sequence = self.log.emit(
            RaceEvent::RaceCreated {
                start,
                end,
                race_id,
            },
            now,
        );

        info!(race = %race_id, %start, %end, sequence, "Race created");
        Ok(race_id)
    }

    /// Commit a sealed bet on `race_id`, staking the value attached to `ctx`.
    ///
    /// Returns `true` on success. On error, the attached value is not captured.
    /// A stake that would overflow custody is refused with
    /// [`RaceError::StakeOverflow`] after the admission checks.
    pub fn register_bet(
        &mut self,
        ctx: &CallContext,
        commitment_hash: CommitmentHash,
        race_id: RaceId,
    ) -> Result<bool> {
        let now = self.clock.now();
        self.try_register_bet(ctx, commitment_hash, race_id, now)
            .inspect_err(|err| {
                warn!(
                    code = err.code(),
                    caller = %ctx.caller,
                    race = %race_id,
                    stake = %ctx.value,
                    %now,
                    error = %err,
                    "registerBet rejected"
                );
            })
    }

    fn try_register_bet(
        &mut self,
        ctx: &CallContext,
        commitment_hash: CommitmentHash,
        race_id: RaceId,
        now: Timestamp,
    ) -> Result<bool> {
        self.ledger.check_admissible(
            &self.registry,
            ctx.caller,
            race_id,
            commitment_hash,
            ctx.value,
            now,
        )?;
        let custody = self.escrow.prepare(race_id, ctx.caller, ctx.value)?;

        let record = BetLedger::record(
            &mut self.registry,
            ctx.caller,
            race_id,
            commitment_hash,
            ctx.value,
            now,
        )?;
        self.escrow.commit(custody);
        let sequence = self.log.emit(
            RaceEvent::BetPlaced {
                race_id,
                racer: ctx.caller,
                commitment_hash: record.commitment_hash,
                amount: record.amount,
            },
            now,
        );

        info!(
            race = %race_id,
            racer = %ctx.caller,
            amount = %record.amount,
            sequence,
            "Bet placed"
        );
        Ok(true)
    }

    // =================================================================
    // Read-only accessors
    // =================================================================

    #[must_use]
    pub fn owner(&self) -> Identity {
        self.registry.owner()
    }

    #[must_use]
    pub fn next_race_index(&self) -> RaceId {
        self.registry.next_race_index()
    }

    #[must_use]
    pub fn race_exists(&self, race_id: RaceId) -> bool {
        self.registry.race_exists(race_id)
    }

    #[must_use]
    pub fn race(&self, race_id: RaceId) -> Option<&Race> {
        self.registry.race(race_id)
    }

    /// Phase of a race at the current ledger time.
    #[must_use]
    pub fn race_phase(&self, race_id: RaceId) -> Option<RacePhase> {
        let now = self.clock.now();
        self.registry.race(race_id).map(|race| race.phase_at(now))
    }

    #[must_use]
    pub fn bet(&self, race_id: RaceId, racer: &Identity) -> Option<&BetRecord> {
        self.ledger.bet(&self.registry, race_id, racer)
    }

    /// Stored commitment, or the zero hash when there is none.
    #[must_use]
    pub fn bet_hash(&self, race_id: RaceId, racer: &Identity) -> CommitmentHash {
        self.bet(race_id, racer)
            .map_or(CommitmentHash::ZERO, |b| b.commitment_hash)
    }

    /// Stored stake, or zero when there is none.
    #[must_use]
    pub fn bet_amount(&self, race_id: RaceId, racer: &Identity) -> Decimal {
        self.bet(race_id, racer).map_or(Decimal::ZERO, |b| b.amount)
    }

    #[must_use]
    pub fn events(&self) -> &[EventRecord] {
        self.log.records()
    }

    #[must_use]
    pub fn query_events(&self, filter: &EventFilter) -> Vec<&EventRecord> {
        self.log.query(filter)
    }

    #[must_use]
    pub fn event_log(&self) -> &EventLog {
        &self.log
    }

    #[must_use]
    pub fn escrow(&self) -> &StakeEscrow {
        &self.escrow
    }

    #[must_use]
    pub fn registry(&self) -> &RaceRegistry {
        &self.registry
    }

    #[must_use]
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Check every ledger invariant: dense ids, valid schedules, valid bet
    /// records, custody conservation, and the notification chain.
    ///
    /// # Errors
    /// Returns [`RaceError::Internal`] describing the first violation.
    pub fn verify_invariants(&self) -> Result<()> {
        let mut expected = RaceId::FIRST;
        for race in self.registry.races() {
            if race.id != expected {
                return Err(RaceError::Internal(format!(
                    "race table out of order: expected {expected}, found {}",
                    race.id
                )));
            }
            if race.start >= race.end {
                return Err(RaceError::Internal(format!(
                    "{} has start {} >= end {}",
                    race.id, race.start, race.end
                )));
            }
            if let Some((racer, _)) = race.bets.iter().find(|(_, bet)| !bet.is_valid()) {
                return Err(RaceError::Internal(format!(
                    "{} holds an invalid bet from {racer}",
                    race.id
                )));
            }
            expected = expected.checked_next().ok_or(RaceError::RaceIdExhausted)?;
        }
        if expected != self.registry.next_race_index() {
            return Err(RaceError::Internal(format!(
                "next race index {} does not match race count {}",
                self.registry.next_race_index(),
                expected.0
            )));
        }
        self.escrow.verify_conservation(&self.registry)?;
        self.log.verify_chain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    const T: Timestamp = Timestamp(1_540_598_400);

    fn deploy() -> (WeeklyRace<ManualClock>, Identity) {
        let owner = Identity::random();
        let race = WeeklyRace::deploy(&CallContext::new(owner), ManualClock::new(T)).unwrap();
        (race, owner)
    }

    #[test]
    fn deploy_sets_owner() {
        let (race, owner) = deploy();
        assert_eq!(race.owner(), owner);
        assert_eq!(race.next_race_index(), RaceId(0));
        assert!(race.events().is_empty());
    }

    #[test]
    fn deploy_with_value_rejected() {
        let ctx = CallContext::new(Identity::random()).with_value(Decimal::ONE);
        let err = WeeklyRace::deploy(&ctx, ManualClock::new(T)).unwrap_err();
        assert!(matches!(err, RaceError::UnexpectedValue { .. }));
    }

    #[test]
    fn new_rejects_zero_owner() {
        let err = WeeklyRace::new(LedgerConfig::new(Identity::ZERO), ManualClock::new(T))
            .unwrap_err();
        assert!(matches!(err, RaceError::Configuration(_)));
    }

    #[test]
    fn create_race_with_value_rejected() {
        let (mut race, owner) = deploy();
        let ctx = CallContext::new(owner).with_value(Decimal::ONE);
        let err = race
            .create_race(&ctx, T.saturating_add(100), T.saturating_add(200))
            .unwrap_err();
        assert!(matches!(err, RaceError::UnexpectedValue { .. }));
        assert_eq!(race.next_race_index(), RaceId(0));
        assert!(race.events().is_empty());
    }

    #[test]
    fn bet_flow_updates_state_escrow_and_log() {
        let (mut race, owner) = deploy();
        let id = race
            .create_race(
                &CallContext::new(owner),
                T.saturating_add(100),
                T.saturating_add(200),
            )
            .unwrap();
        let racer = Identity::random();
        let hash = CommitmentHash::seal(&["ZRX", "BNB", "OMG"], b"nonce");
        let ok = race
            .register_bet(
                &CallContext::new(racer).with_value(Decimal::new(5, 0)),
                hash,
                id,
            )
            .unwrap();
        assert!(ok);
        assert_eq!(race.bet_hash(id, &racer), hash);
        assert_eq!(race.bet_amount(id, &racer), Decimal::new(5, 0));
        assert_eq!(race.escrow().held_for(id, &racer), Decimal::new(5, 0));
        assert_eq!(race.events().len(), 2);
        assert!(race.verify_invariants().is_ok());
    }

    #[test]
    fn custody_overflow_rejected_without_effects() {
        let (mut race, owner) = deploy();
        let id = race
            .create_race(
                &CallContext::new(owner),
                T.saturating_add(100),
                T.saturating_add(200),
            )
            .unwrap();
        let whale = Identity::random();
        let minnow = Identity::random();
        race.register_bet(
            &CallContext::new(whale).with_value(Decimal::MAX),
            CommitmentHash::random(),
            id,
        )
        .unwrap();

        let err = race
            .register_bet(
                &CallContext::new(minnow).with_value(Decimal::ONE),
                CommitmentHash::random(),
                id,
            )
            .unwrap_err();
        assert!(matches!(err, RaceError::StakeOverflow { .. }));
        assert!(race.bet(id, &minnow).is_none());
        assert_eq!(race.escrow().held_for(id, &minnow), Decimal::ZERO);
        assert_eq!(race.escrow().total_custody(), Decimal::MAX);
        assert_eq!(race.events().len(), 2);
        assert!(race.verify_invariants().is_ok());
    }

    #[test]
    fn absent_bet_reads_as_zero() {
        let (race, _) = deploy();
        let nobody = Identity::random();
        assert_eq!(race.bet_hash(RaceId(0), &nobody), CommitmentHash::ZERO);
        assert_eq!(race.bet_amount(RaceId(0), &nobody), Decimal::ZERO);
    }

    #[test]
    fn phase_follows_clock() {
        let (mut race, owner) = deploy();
        let id = race
            .create_race(
                &CallContext::new(owner),
                T.saturating_add(100),
                T.saturating_add(200),
            )
            .unwrap();
        assert_eq!(race.race_phase(id), Some(RacePhase::Scheduled));
        race.clock().advance(100);
        assert_eq!(race.race_phase(id), Some(RacePhase::Closed));
        race.clock().advance(100);
        assert_eq!(race.race_phase(id), Some(RacePhase::Elapsed));
        assert_eq!(race.race_phase(RaceId(1)), None);
    }
}
