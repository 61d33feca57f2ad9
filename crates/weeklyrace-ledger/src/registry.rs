//! Race Registry: the authoritative source of race existence and scheduling.
//!
//! Races are append-only: ids are allocated sequentially from 0, a race is
//! never deleted, and its schedule never changes. The only mutation a stored
//! race ever sees is the insertion of a bet record by the
//! [`BetLedger`](crate::BetLedger).

use tracing::debug;
use weeklyrace_types::{Identity, Race, RaceError, RaceId, RaceLookup, Result, Timestamp};

/// Owns every race ever created and the id counter.
///
/// Invariant: `next_race_index.0 == races.len()` and `races[i].id == RaceId(i)`.
#[derive(Debug)]
pub struct RaceRegistry {
    /// Fixed at construction, never mutated.
    owner: Identity,
    /// The id the next created race will receive.
    next_race_index: RaceId,
    races: Vec<Race>,
}

impl RaceRegistry {
    #[must_use]
    pub fn new(owner: Identity) -> Self {
        Self {
            owner,
            next_race_index: RaceId::FIRST,
            races: Vec::new(),
        }
    }

    /// Schedule a new race and return its id.
    ///
    /// Checks, all before any mutation:
    /// 1. `caller` is the owner
    /// 2. `start < end`
    /// 3. `start` is strictly after `now`
    ///
    /// # Errors
    /// - `Unauthorized` if `caller` is not the owner
    /// - `InvalidSchedule` if the window is empty, inverted, or not in the future
    /// - `RaceIdExhausted` if the id counter cannot advance
    pub fn create_race(
        &mut self,
        caller: Identity,
        start: Timestamp,
        end: Timestamp,
        now: Timestamp,
    ) -> Result<RaceId> {
        if caller != self.owner {
            return Err(RaceError::Unauthorized {
                caller,
                action: "create a race",
            });
        }
        if start >= end {
            return Err(RaceError::InvalidSchedule {
                reason: format!("start {start} is not before end {end}"),
            });
        }
        if start <= now {
            return Err(RaceError::InvalidSchedule {
                reason: format!("start {start} is not after current time {now}"),
            });
        }

        let race_id = self.next_race_index;
        let next = race_id.checked_next().ok_or(RaceError::RaceIdExhausted)?;

        self.races.push(Race::new(race_id, start, end));
        self.next_race_index = next;

        debug!(race = %race_id, races = self.races.len(), "Race stored");
        Ok(race_id)
    }

    /// The start time bet registration must beat for `race_id`.
    ///
    /// Under [`RaceLookup::Legacy`] an unallocated id reads as starting at
    /// time zero, so the caller's timing check rejects it.
    ///
    /// # Errors
    /// `RaceNotFound` under [`RaceLookup::Strict`] for an unallocated id.
    pub fn scheduled_start(&self, race_id: RaceId, lookup: RaceLookup) -> Result<Timestamp> {
        match (self.race(race_id), lookup) {
            (Some(race), _) => Ok(race.start),
            (None, RaceLookup::Strict) => Err(RaceError::RaceNotFound(race_id)),
            (None, RaceLookup::Legacy) => Ok(Timestamp::ZERO),
        }
    }

    #[must_use]
    pub fn owner(&self) -> Identity {
        self.owner
    }

    /// Count of races ever created, which is also the next id to allocate.
    #[must_use]
    pub fn next_race_index(&self) -> RaceId {
        self.next_race_index
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.races.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.races.len()
    }

    #[must_use]
    pub fn race_exists(&self, race_id: RaceId) -> bool {
        self.race(race_id).is_some()
    }

    #[must_use]
    pub fn race(&self, race_id: RaceId) -> Option<&Race> {
        race_id.index().and_then(|i| self.races.get(i))
    }

    pub fn races(&self) -> impl Iterator<Item = &Race> {
        self.races.iter()
    }

    pub(crate) fn race_mut(&mut self, race_id: RaceId) -> Option<&mut Race> {
        race_id.index().and_then(|i| self.races.get_mut(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: Timestamp = Timestamp(1_000);

    fn setup() -> (RaceRegistry, Identity) {
        let owner = Identity::random();
        (RaceRegistry::new(owner), owner)
    }

    #[test]
    fn ids_are_sequential_from_zero() {
        let (mut reg, owner) = setup();
        for expected in 0..5 {
            let id = reg
                .create_race(owner, Timestamp(2_000), Timestamp(3_000), NOW)
                .unwrap();
            assert_eq!(id, RaceId(expected));
        }
        assert_eq!(reg.next_race_index(), RaceId(5));
        assert_eq!(reg.len(), 5);
    }

    #[test]
    fn non_owner_rejected() {
        let (mut reg, _) = setup();
        let err = reg
            .create_race(Identity::random(), Timestamp(2_000), Timestamp(3_000), NOW)
            .unwrap_err();
        assert!(matches!(err, RaceError::Unauthorized { .. }));
        assert!(reg.is_empty());
        assert_eq!(reg.next_race_index(), RaceId(0));
    }

    #[test]
    fn inverted_or_empty_window_rejected() {
        let (mut reg, owner) = setup();
        for (start, end) in [(2_000, 1_500), (2_000, 2_000)] {
            let err = reg
                .create_race(owner, Timestamp(start), Timestamp(end), NOW)
                .unwrap_err();
            assert!(matches!(err, RaceError::InvalidSchedule { .. }));
        }
        assert!(reg.is_empty());
    }

    #[test]
    fn start_must_be_strictly_future() {
        let (mut reg, owner) = setup();
        for start in [NOW.0 - 1, NOW.0] {
            let err = reg
                .create_race(owner, Timestamp(start), Timestamp(5_000), NOW)
                .unwrap_err();
            assert!(matches!(err, RaceError::InvalidSchedule { .. }));
        }
        assert!(
            reg.create_race(owner, Timestamp(NOW.0 + 1), Timestamp(5_000), NOW)
                .is_ok()
        );
    }

    #[test]
    fn lookup_accessors() {
        let (mut reg, owner) = setup();
        let id = reg
            .create_race(owner, Timestamp(2_000), Timestamp(3_000), NOW)
            .unwrap();
        assert!(reg.race_exists(id));
        assert!(!reg.race_exists(RaceId(1)));
        assert!(!reg.race_exists(RaceId(-1)));
        let race = reg.race(id).unwrap();
        assert_eq!(race.start, Timestamp(2_000));
        assert_eq!(race.end, Timestamp(3_000));
        assert!(race.bets.is_empty());
        assert_eq!(reg.owner(), owner);
    }

    #[test]
    fn scheduled_start_respects_lookup() {
        let (mut reg, owner) = setup();
        reg.create_race(owner, Timestamp(2_000), Timestamp(3_000), NOW)
            .unwrap();
        assert_eq!(
            reg.scheduled_start(RaceId(0), RaceLookup::Strict).unwrap(),
            Timestamp(2_000)
        );
        let err = reg
            .scheduled_start(RaceId(9), RaceLookup::Strict)
            .unwrap_err();
        assert!(matches!(err, RaceError::RaceNotFound(RaceId(9))));
        assert_eq!(
            reg.scheduled_start(RaceId(9), RaceLookup::Legacy).unwrap(),
            Timestamp::ZERO
        );
    }
}
