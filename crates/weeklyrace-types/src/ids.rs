//! Identifiers and primitive value types used throughout WeeklyRace.
//!
//! Byte-oriented identifiers (`Identity`, `CommitmentHash`) render and
//! serialize as `0x`-prefixed lowercase hex.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::{RaceError, Result, constants};

/// Decode a `0x`-prefixed (or bare) hex string into a fixed-size array.
fn parse_hex<const N: usize>(s: &str, what: &str) -> Result<[u8; N]> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    let mut out = [0u8; N];
    hex::decode_to_slice(digits, &mut out).map_err(|e| {
        RaceError::Serialization(format!("invalid {what} {s:?}: {e}"))
    })?;
    Ok(out)
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// An externally authenticated principal (an account address).
///
/// The ledger never authenticates; it trusts whatever identity the hosting
/// environment hands it. Two identities are equal only if byte-identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct Identity(pub [u8; constants::IDENTITY_LEN]);

impl Identity {
    /// The all-zero address. Never a valid owner.
    pub const ZERO: Self = Self([0u8; constants::IDENTITY_LEN]);

    #[must_use]
    pub const fn from_bytes(bytes: [u8; constants::IDENTITY_LEN]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; constants::IDENTITY_LEN] {
        &self.0
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; constants::IDENTITY_LEN]
    }

    /// First four bytes as hex, for compact log fields.
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Random identity for tests.
    #[cfg(any(test, feature = "test-helpers"))]
    #[must_use]
    pub fn random() -> Self {
        Self(rand::random())
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Identity {
    type Err = RaceError;

    fn from_str(s: &str) -> Result<Self> {
        parse_hex(s, "identity").map(Self)
    }
}

impl Serialize for Identity {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Identity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// RaceId
// ---------------------------------------------------------------------------

/// Sequential race identifier, allocated from 0 and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct RaceId(pub i128);

impl RaceId {
    /// The identifier of the first race ever created.
    pub const FIRST: Self = Self(constants::RACE_ID_START);

    /// The following identifier, or `None` on overflow.
    #[must_use]
    pub fn checked_next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }

    /// Position in the registry's race table, if this id could ever be allocated.
    #[must_use]
    pub fn index(self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }
}

impl fmt::Display for RaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "race:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Timestamp
// ---------------------------------------------------------------------------

/// Ledger time in whole seconds since the UNIX epoch.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    #[must_use]
    pub const fn as_secs(self) -> u64 {
        self.0
    }

    /// Times before the epoch clamp to zero.
    #[must_use]
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(u64::try_from(dt.timestamp()).unwrap_or(0))
    }

    #[must_use]
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        i64::try_from(self.0)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    #[must_use]
    pub const fn saturating_add(self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// CommitmentHash
// ---------------------------------------------------------------------------

/// An opaque sealed commitment to a not-yet-revealed token selection.
///
/// The ledger relies only on equality and non-zero-ness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct CommitmentHash(pub [u8; constants::COMMITMENT_LEN]);

impl CommitmentHash {
    /// The unset commitment. Never admissible as a bet.
    pub const ZERO: Self = Self([0u8; constants::COMMITMENT_LEN]);

    #[must_use]
    pub const fn from_bytes(bytes: [u8; constants::COMMITMENT_LEN]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; constants::COMMITMENT_LEN] {
        &self.0
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; constants::COMMITMENT_LEN]
    }

    /// Seal an ordered token selection with a caller-chosen salt.
    ///
    /// Format: `SHA-256("weeklyrace:commitment:v1:" || count || (len || symbol)* || salt)`.
    /// Order matters: `["ZRX", "BNB"]` and `["BNB", "ZRX"]` seal differently.
    #[must_use]
    pub fn seal<S: AsRef<str>>(selection: &[S], salt: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(constants::COMMITMENT_DOMAIN);
        hasher.update((selection.len() as u64).to_le_bytes());
        for symbol in selection {
            let bytes = symbol.as_ref().as_bytes();
            hasher.update((bytes.len() as u64).to_le_bytes());
            hasher.update(bytes);
        }
        hasher.update(salt);
        Self(hasher.finalize().into())
    }

    /// Random non-zero commitment for tests.
    #[cfg(any(test, feature = "test-helpers"))]
    #[must_use]
    pub fn random() -> Self {
        let mut bytes: [u8; constants::COMMITMENT_LEN] = rand::random();
        bytes[0] |= 1;
        Self(bytes)
    }
}

impl fmt::Display for CommitmentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for CommitmentHash {
    type Err = RaceError;

    fn from_str(s: &str) -> Result<Self> {
        parse_hex(s, "commitment hash").map(Self)
    }
}

impl Serialize for CommitmentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CommitmentHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
