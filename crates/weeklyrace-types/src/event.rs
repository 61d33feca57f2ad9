//! Notification records emitted by successful ledger operations.
//!
//! Notifications are append-only and externally observable. Each one is
//! queryable by its **indexed** fields only:
//!
//! | Event         | Indexed fields                 | Unindexed         |
//! |---------------|--------------------------------|-------------------|
//! | `RaceCreated` | `start`, `end`, `race_id`      | —                 |
//! | `BetPlaced`   | `race_id`, `racer`, `amount`   | `commitment_hash` |

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{CommitmentHash, Identity, RaceId, Timestamp};

/// Discriminant of a [`RaceEvent`], for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    RaceCreated,
    BetPlaced,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RaceCreated => write!(f, "RACE_CREATED"),
            Self::BetPlaced => write!(f, "BET_PLACED"),
        }
    }
}

/// An immutable notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaceEvent {
    /// A race was scheduled by the owner.
    RaceCreated {
        start: Timestamp,
        end: Timestamp,
        race_id: RaceId,
    },
    /// A racer committed a sealed, funded bet.
    BetPlaced {
        race_id: RaceId,
        racer: Identity,
        commitment_hash: CommitmentHash,
        amount: Decimal,
    },
}

impl RaceEvent {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::RaceCreated { .. } => EventKind::RaceCreated,
            Self::BetPlaced { .. } => EventKind::BetPlaced,
        }
    }

    #[must_use]
    pub fn race_id(&self) -> RaceId {
        match self {
            Self::RaceCreated { race_id, .. } | Self::BetPlaced { race_id, .. } => *race_id,
        }
    }

    /// Canonical byte encoding used for the log's hash chain.
    ///
    /// Format: `kind_tag || fields...` with fixed-width little-endian integers
    /// and a length-prefixed normalized decimal string for amounts.
    #[must_use]
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(96);
        match self {
            Self::RaceCreated {
                start,
                end,
                race_id,
            } => {
                out.push(0x01);
                out.extend_from_slice(&start.0.to_le_bytes());
                out.extend_from_slice(&end.0.to_le_bytes());
                out.extend_from_slice(&race_id.0.to_le_bytes());
            }
            Self::BetPlaced {
                race_id,
                racer,
                commitment_hash,
                amount,
            } => {
                out.push(0x02);
                out.extend_from_slice(&race_id.0.to_le_bytes());
                out.extend_from_slice(racer.as_bytes());
                out.extend_from_slice(commitment_hash.as_bytes());
                let amount = amount.normalize().to_string();
                out.extend_from_slice(&(amount.len() as u64).to_le_bytes());
                out.extend_from_slice(amount.as_bytes());
            }
        }
        out
    }
}

/// A notification as stored in the append-only log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Zero-based position in the log.
    pub sequence: u64,
    /// Ledger time of the invocation that emitted it.
    pub emitted_at: Timestamp,
    pub event: RaceEvent,
    /// Chain digest over the previous digest, this position and the event.
    pub digest: [u8; 32],
}

/// Query over indexed notification fields. Unset fields match anything.
///
/// A set field that the event kind does not index never matches: filtering
/// by `racer` excludes every `RaceCreated`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFilter {
    pub kind: Option<EventKind>,
    pub race_id: Option<RaceId>,
    pub racer: Option<Identity>,
    pub amount: Option<Decimal>,
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
}

impl EventFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn of_kind(mut self, kind: EventKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn for_race(mut self, race_id: RaceId) -> Self {
        self.race_id = Some(race_id);
        self
    }

    #[must_use]
    pub fn by_racer(mut self, racer: Identity) -> Self {
        self.racer = Some(racer);
        self
    }

    #[must_use]
    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    #[must_use]
    pub fn starting_at(mut self, start: Timestamp) -> Self {
        self.start = Some(start);
        self
    }

    #[must_use]
    pub fn ending_at(mut self, end: Timestamp) -> Self {
        self.end = Some(end);
        self
    }

    #[must_use]
    pub fn matches(&self, event: &RaceEvent) -> bool {
        fn field<T: PartialEq>(want: Option<&T>, have: Option<&T>) -> bool {
            match (want, have) {
                (None, _) => true,
                (Some(w), Some(h)) => w == h,
                (Some(_), None) => false,
            }
        }

        if self.kind.is_some_and(|k| k != event.kind()) {
            return false;
        }

        match event {
            RaceEvent::RaceCreated {
                start,
                end,
                race_id,
            } => {
                field(self.race_id.as_ref(), Some(race_id))
                    && field(self.start.as_ref(), Some(start))
                    && field(self.end.as_ref(), Some(end))
                    && field(self.racer.as_ref(), None)
                    && field(self.amount.as_ref(), None)
            }
            RaceEvent::BetPlaced {
                race_id,
                racer,
                amount,
                ..
            } => {
                field(self.race_id.as_ref(), Some(race_id))
                    && field(self.racer.as_ref(), Some(racer))
                    && field(self.amount.as_ref(), Some(amount))
                    && field(self.start.as_ref(), None)
                    && field(self.end.as_ref(), None)
            }
        }
    }
}
