// crates/policy-ledger-core/src/core/time.rs
// ============================================================================
// Module: Policy Ledger Time Model
// Description: Canonical millisecond UTC timestamps for envelopes and records.
// Purpose: Render and validate the single timestamp shape the ledger accepts.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Ledger timestamps are RFC 3339 strings pinned to one shape:
//! `YYYY-MM-DDTHH:MM:SS.mmmZ`. Offsets other than `Z` and values without
//! exactly three fractional digits are rejected so that byte-level hashing
//! of envelopes stays stable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use time::UtcOffset;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Exact byte length of a canonical timestamp.
const TIMESTAMP_LEN: usize = 24;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when validating timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    /// Timestamp does not match the canonical UTC millisecond shape.
    #[error("invalid timestamp '{0}': expected YYYY-MM-DDTHH:MM:SS.mmmZ")]
    Shape(String),
    /// Timestamp has the right shape but is not a real instant.
    #[error("invalid timestamp '{0}': {1}")]
    Value(String, String),
}

// ============================================================================
// SECTION: Timestamp
// ============================================================================

/// Canonical UTC timestamp with millisecond precision.
///
/// # Invariants
/// - Always formatted as `YYYY-MM-DDTHH:MM:SS.mmmZ` when constructed through
///   [`EventTimestamp::now`], [`EventTimestamp::from_datetime`], or
///   [`EventTimestamp::parse`].
/// - Deserialization does not validate; the envelope codec does.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventTimestamp(String);

impl EventTimestamp {
    /// Returns the current wall-clock time.
    #[must_use]
    pub fn now() -> Self {
        Self::from_datetime(OffsetDateTime::now_utc())
    }

    /// Formats a datetime as a canonical UTC millisecond timestamp.
    #[must_use]
    pub fn from_datetime(value: OffsetDateTime) -> Self {
        let utc = value.to_offset(UtcOffset::UTC);
        Self(format!(
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
            utc.year(),
            u8::from(utc.month()),
            utc.day(),
            utc.hour(),
            utc.minute(),
            utc.second(),
            utc.millisecond()
        ))
    }

    /// Parses and validates a canonical timestamp string.
    ///
    /// # Errors
    ///
    /// Returns [`TimestampError`] when the value is not canonical.
    pub fn parse(value: &str) -> Result<Self, TimestampError> {
        let bytes = value.as_bytes();
        let shape_ok = bytes.len() == TIMESTAMP_LEN
            && bytes[10] == b'T'
            && bytes[19] == b'.'
            && bytes[20..23].iter().all(u8::is_ascii_digit)
            && bytes[23] == b'Z';
        if !shape_ok {
            return Err(TimestampError::Shape(value.to_string()));
        }
        OffsetDateTime::parse(value, &Rfc3339)
            .map_err(|err| TimestampError::Value(value.to_string(), err.to_string()))?;
        Ok(Self(value.to_string()))
    }

    /// Returns the timestamp string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions."
    )]

    use time::macros::datetime;

    use super::EventTimestamp;

    #[test]
    fn formats_milliseconds_in_utc() {
        let ts = EventTimestamp::from_datetime(datetime!(2026-03-04 05:06:07.089 +02:00));
        assert_eq!(ts.as_str(), "2026-03-04T03:06:07.089Z");
    }

    #[test]
    fn now_round_trips_through_parse() {
        let ts = EventTimestamp::now();
        assert_eq!(EventTimestamp::parse(ts.as_str()).unwrap(), ts);
    }

    #[test]
    fn rejects_offsets_and_missing_millis() {
        for bad in [
            "2026-03-04T03:06:07Z",
            "2026-03-04T03:06:07.089+00:00",
            "2026-03-04T03:06:07.08Z",
            "2026-03-04 03:06:07.089Z",
            "2026-13-04T03:06:07.089Z",
        ] {
            assert!(EventTimestamp::parse(bad).is_err(), "accepted {bad}");
        }
    }
}
