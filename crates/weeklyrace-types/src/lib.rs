//! # weeklyrace-types
//!
//! Shared types, errors, and configuration for the **WeeklyRace** commitment ledger.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identifiers**: [`Identity`], [`RaceId`], [`Timestamp`], [`CommitmentHash`]
//! - **Race model**: [`Race`], [`RacePhase`], [`BetRecord`]
//! - **Notifications**: [`RaceEvent`], [`EventRecord`], [`EventFilter`], [`EventKind`]
//! - **Configuration**: [`LedgerConfig`], [`RaceLookup`]
//! - **Errors**: [`RaceError`] with `WR_ERR_` prefix codes
//! - **Constants**: domain tags and defaults

pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod ids;
pub mod race;

// Re-export all primary types at crate root for ergonomic imports:
//   use weeklyrace_types::{Identity, Race, RaceEvent, ...};

pub use config::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use race::*;

// Constants are accessed via `weeklyrace_types::constants::FOO`
// (not re-exported to avoid name collisions).
