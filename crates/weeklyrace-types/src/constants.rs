//! System-wide constants for the WeeklyRace ledger.

/// First race identifier ever allocated.
pub const RACE_ID_START: i128 = 0;

/// Length in bytes of a caller identity (an account address).
pub const IDENTITY_LEN: usize = 20;

/// Length in bytes of a sealed bet commitment.
pub const COMMITMENT_LEN: usize = 32;

/// Domain tag prepended when sealing a token selection into a commitment.
pub const COMMITMENT_DOMAIN: &[u8] = b"weeklyrace:commitment:v1:";

/// Domain tag prepended to every event digest in the notification log.
pub const EVENT_DIGEST_DOMAIN: &[u8] = b"weeklyrace:event:v1:";

/// Digest that precedes the first record of the notification log.
pub const GENESIS_DIGEST: [u8; 32] = [0u8; 32];

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "WeeklyRace";
