use std::{fmt, str::FromStr};

use chrono::{DateTime, Duration, Timelike, Utc};
use uuid::Uuid;

use crate::error::TokenParseError;

/// Separator between the identifier and the expiry in a serialized token.
pub const SEPARATOR: char = '_';

/// Expiry is written as a count of 100 ns ticks since 0001-01-01T00:00:00Z.
const TICKS_PER_SECOND: i64 = 10_000_000;
const NANOS_PER_TICK: u32 = 100;
const UNIX_EPOCH_TICKS: i64 = 621_355_968_000_000_000;
/// 9999-12-31T23:59:59.9999999Z, the largest tick count the format allows.
const MAX_TICKS: i64 = 3_155_378_975_999_999_999;

/// A single antiforgery token: a random identity plus an absolute expiry.
///
/// The same token travels twice per request: encrypted in the cookie and in
/// plaintext in the form field or header. A request is accepted only when both
/// copies carry the same identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken {
    pub id: Uuid,
    pub expiry: DateTime<Utc>,
}

impl RequestToken {
    /// Mint a token with a fresh random identity that expires `validity` after `now`.
    ///
    /// A negative `validity` yields a token that is already expired.
    pub fn create(now: DateTime<Utc>, validity: Duration) -> Self {
        let expiry = match now.checked_add_signed(validity) {
            Some(expiry) => expiry,
            None if validity < Duration::zero() => earliest(),
            None => latest(),
        };
        Self::new(Uuid::new_v4(), expiry)
    }

    /// Build a token from known parts. The expiry is clamped to the tick range
    /// and truncated to tick precision, so serializing and parsing the token
    /// gives back an equal value.
    pub fn new(id: Uuid, expiry: DateTime<Utc>) -> Self {
        Self {
            id,
            expiry: truncate_to_tick(expiry.clamp(earliest(), latest())),
        }
    }

    pub fn parse(value: &str) -> Result<Self, TokenParseError> {
        if value.trim().is_empty() {
            return Err(TokenParseError::Blank);
        }

        let mut parts = value.split(SEPARATOR);
        let (id, ticks) = match (parts.next(), parts.next(), parts.next()) {
            (Some(id), Some(ticks), None) if !id.is_empty() && !ticks.is_empty() => (id, ticks),
            _ => return Err(TokenParseError::Layout),
        };

        let id = Uuid::parse_str(id)?;
        let ticks: i64 = ticks
            .parse()
            .map_err(|e: std::num::ParseIntError| TokenParseError::Expiry(e.to_string()))?;
        let expiry = from_ticks(ticks)
            .ok_or_else(|| TokenParseError::Expiry(format!("{ticks} is out of range")))?;

        Ok(Self { id, expiry })
    }

    pub fn serialize(&self) -> String {
        format!("{}{}{}", self.id.hyphenated(), SEPARATOR, to_ticks(self.expiry))
    }

    /// True once `now` is strictly past the expiry.
    pub fn has_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expiry
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

impl FromStr for RequestToken {
    type Err = TokenParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Tick count for `at`. Saturates instead of overflowing far outside the tick range.
pub fn to_ticks(at: DateTime<Utc>) -> i64 {
    at.timestamp()
        .saturating_mul(TICKS_PER_SECOND)
        .saturating_add(UNIX_EPOCH_TICKS)
        .saturating_add(i64::from(at.timestamp_subsec_nanos() / NANOS_PER_TICK))
}

pub fn from_ticks(ticks: i64) -> Option<DateTime<Utc>> {
    if !(0..=MAX_TICKS).contains(&ticks) {
        return None;
    }

    let since_epoch = ticks - UNIX_EPOCH_TICKS;
    let secs = since_epoch.div_euclid(TICKS_PER_SECOND);
    let nanos = u32::try_from(since_epoch.rem_euclid(TICKS_PER_SECOND)).ok()? * NANOS_PER_TICK;
    DateTime::from_timestamp(secs, nanos)
}

fn earliest() -> DateTime<Utc> {
    from_ticks(0).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn latest() -> DateTime<Utc> {
    from_ticks(MAX_TICKS).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn truncate_to_tick(at: DateTime<Utc>) -> DateTime<Utc> {
    let nanos = at.nanosecond() / NANOS_PER_TICK * NANOS_PER_TICK;
    at.with_nanosecond(nanos).unwrap_or(at)
}
