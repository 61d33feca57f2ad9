//! # weeklyrace-ledger
//!
//! **Commitment ledger** for weekly token races: owner-scheduled, time-bounded
//! races and exactly one sealed, funded bet per participant per race.
//!
//! ## Architecture
//!
//! 1. **RaceRegistry**: append-only races, sequential ids, scheduling checks
//! 2. **BetLedger**: bet admission (authorization, timing, uniqueness)
//! 3. **StakeEscrow**: custody of stake captured by accepted bets
//! 4. **EventLog**: append-only, hash-chained notifications
//! 5. **WeeklyRace**: the entry-point facade tying them together
//!
//! ## Call Flow
//!
//! ```text
//! owner  → WeeklyRace.create_race()  → RaceRegistry.create_race() → EventLog(RaceCreated)
//! racer  → WeeklyRace.register_bet() → BetLedger.check_admissible()
//!        → StakeEscrow.prepare()     (checked custody totals)
//!        → BetLedger record          → StakeEscrow.commit() → EventLog(BetPlaced)
//! ```
//!
//! Invocations are assumed to be serialized by the host. Each one either
//! applies all of its effects or none.

pub mod bet_ledger;
pub mod clock;
pub mod context;
pub mod escrow;
pub mod event_log;
pub mod registry;
pub mod weekly_race;

pub use bet_ledger::BetLedger;
pub use clock::{Clock, ManualClock, SystemClock};
pub use context::CallContext;
pub use escrow::{PendingCapture, StakeEscrow};
pub use event_log::EventLog;
pub use registry::RaceRegistry;
pub use weekly_race::WeeklyRace;
