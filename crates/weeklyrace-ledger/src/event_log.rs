//! Append-only notification log.
//!
//! Every record carries a chain digest:
//! ```text
//! digest[n] = SHA-256("weeklyrace:event:v1:" || digest[n-1] || n || emitted_at || event_bytes)
//! digest[-1] = GENESIS_DIGEST
//! ```
//! so any rewrite of history is detectable by [`EventLog::verify_chain`].

use sha2::{Digest, Sha256};
use tracing::debug;
use weeklyrace_types::{
    EventFilter, EventRecord, RaceError, RaceEvent, Result, Timestamp, constants,
};

/// Ordered, append-only store of emitted notifications.
#[derive(Debug, Default)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Chain digest for the record at `sequence` following `prev`.
    #[must_use]
    pub fn compute_digest(
        prev: &[u8; 32],
        sequence: u64,
        emitted_at: Timestamp,
        event: &RaceEvent,
    ) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(constants::EVENT_DIGEST_DOMAIN);
        hasher.update(prev);
        hasher.update(sequence.to_le_bytes());
        hasher.update(emitted_at.as_secs().to_le_bytes());
        hasher.update(event.canonical_bytes());
        hasher.finalize().into()
    }

    /// Append a notification and return its sequence number.
    pub fn emit(&mut self, event: RaceEvent, emitted_at: Timestamp) -> u64 {
        let sequence = self.records.len() as u64;
        let digest = Self::compute_digest(&self.last_digest(), sequence, emitted_at, &event);

        debug!(
            sequence,
            kind = %event.kind(),
            race = %event.race_id(),
            digest = hex::encode(digest),
            "Event emitted"
        );

        self.records.push(EventRecord {
            sequence,
            emitted_at,
            event,
            digest,
        });
        sequence
    }

    /// Digest of the newest record, or the genesis digest when empty.
    #[must_use]
    pub fn last_digest(&self) -> [u8; 32] {
        self.records
            .last()
            .map_or(constants::GENESIS_DIGEST, |r| r.digest)
    }

    /// Recompute the whole chain.
    ///
    /// # Errors
    /// Returns [`RaceError::Internal`] naming the first inconsistent record.
    pub fn verify_chain(&self) -> Result<()> {
        let mut prev = constants::GENESIS_DIGEST;
        for (i, record) in self.records.iter().enumerate() {
            if record.sequence != i as u64 {
                return Err(RaceError::Internal(format!(
                    "event at position {i} has sequence {}",
                    record.sequence
                )));
            }
            let expected =
                Self::compute_digest(&prev, record.sequence, record.emitted_at, &record.event);
            if expected != record.digest {
                return Err(RaceError::Internal(format!(
                    "event digest mismatch at sequence {}: expected {}, got {}",
                    record.sequence,
                    hex::encode(expected),
                    hex::encode(record.digest)
                )));
            }
            prev = record.digest;
        }
        Ok(())
    }

    /// Records whose indexed fields match `filter`, oldest first.
    #[must_use]
    pub fn query(&self, filter: &EventFilter) -> Vec<&EventRecord> {
        self.records
            .iter()
            .filter(|r| filter.matches(&r.event))
            .collect()
    }

    #[must_use]
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    #[must_use]
    pub fn get(&self, sequence: u64) -> Option<&EventRecord> {
        usize::try_from(sequence)
            .ok()
            .and_then(|i| self.records.get(i))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use weeklyrace_types::{CommitmentHash, EventKind, Identity, RaceId};

    fn created(id: i128) -> RaceEvent {
        RaceEvent::RaceCreated {
            start: Timestamp(100),
            end: Timestamp(200),
            race_id: RaceId(id),
        }
    }

    fn placed(id: i128, racer: Identity) -> RaceEvent {
        RaceEvent::BetPlaced {
            race_id: RaceId(id),
            racer,
            commitment_hash: CommitmentHash::random(),
            amount: Decimal::new(5, 0),
        }
    }

    #[test]
    fn sequences_are_dense() {
        let mut log = EventLog::new();
        assert!(log.is_empty());
        assert_eq!(log.last_digest(), constants::GENESIS_DIGEST);
        for i in 0..4 {
            let sequence = log.emit(created(i), Timestamp(10));
            assert_eq!(sequence, u64::try_from(i).unwrap());
            assert_eq!(log.get(sequence).unwrap().sequence, sequence);
        }
        assert_eq!(log.len(), 4);
        assert_eq!(log.get(2).unwrap().event, created(2));
        assert!(log.get(4).is_none());
    }

    #[test]
    fn chain_verifies() {
        let mut log = EventLog::new();
        log.emit(created(0), Timestamp(10));
        log.emit(placed(0, Identity::random()), Timestamp(20));
        assert!(log.verify_chain().is_ok());
        assert_ne!(log.records()[0].digest, log.records()[1].digest);
    }

    #[test]
    fn tampering_breaks_chain() {
        let mut log = EventLog::new();
        log.emit(created(0), Timestamp(10));
        log.emit(created(1), Timestamp(20));
        log.records[0].event = created(5);
        let err = log.verify_chain().unwrap_err();
        assert!(matches!(err, RaceError::Internal(_)));
    }

    #[test]
    fn digest_depends_on_position() {
        let prev = constants::GENESIS_DIGEST;
        let a = EventLog::compute_digest(&prev, 0, Timestamp(1), &created(0));
        let b = EventLog::compute_digest(&prev, 1, Timestamp(1), &created(0));
        assert_ne!(a, b);
    }

    #[test]
    fn query_by_indexed_fields() {
        let mut log = EventLog::new();
        let x = Identity::random();
        let y = Identity::random();
        log.emit(created(0), Timestamp(10));
        log.emit(created(1), Timestamp(11));
        log.emit(placed(0, x), Timestamp(12));
        log.emit(placed(1, x), Timestamp(13));
        log.emit(placed(0, y), Timestamp(14));

        let by_x = EventFilter::new().by_racer(x);
        assert_eq!(log.query(&by_x).len(), 2);

        let race0_bets = EventFilter::new()
            .of_kind(EventKind::BetPlaced)
            .for_race(RaceId(0));
        let seqs: Vec<u64> = log.query(&race0_bets).iter().map(|r| r.sequence).collect();
        assert_eq!(seqs, vec![2, 4]);

        let race1 = EventFilter::new().for_race(RaceId(1));
        assert_eq!(log.query(&race1).len(), 2);
    }
}
