use crate::codec::{DecodeError, Decodable, Encodable};
use bytes::BufMut;
use chrono::{DateTime, NaiveDateTime};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error;

const SECONDS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const MILLIS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Block timestamps count half-second slots from 2000-01-01T00:00:00Z
const BLOCK_TIMESTAMP_EPOCH_MS: i64 = 946_684_800_000;
const BLOCK_INTERVAL_MS: i64 = 500;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseTimeError {
    #[error("invalid timestamp `{0}`")]
    Invalid(String),
    #[error("timestamp `{0}` is out of range")]
    OutOfRange(String),
}

/// Parses `YYYY-MM-DDTHH:MM:SS[.fff][Z]` as UTC milliseconds since the unix epoch
pub fn parse_utc_millis(s: &str) -> Result<i64, ParseTimeError> {
    let trimmed = s.strip_suffix('Z').unwrap_or(s);
    let parsed = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(|_| ParseTimeError::Invalid(s.to_owned()))?;
    Ok(parsed.and_utc().timestamp_millis())
}

fn format_utc_millis(millis: i64, format: &str) -> String {
    let nanos = (millis.rem_euclid(1000) * 1_000_000) as u32;
    match DateTime::from_timestamp(millis.div_euclid(1000), nanos) {
        Some(dt) => dt.naive_utc().format(format).to_string(),
        None => millis.to_string(),
    }
}

/// Seconds since the unix epoch, as used by transaction expirations
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimePointSec(u32);

impl TimePointSec {
    pub const fn from_secs(secs: u32) -> Self {
        Self(secs)
    }

    pub const fn as_secs(&self) -> u32 {
        self.0
    }

    /// Rounds a millisecond-precision timestamp to the nearest second,
    /// matching how block timestamps are folded into expirations.
    pub fn from_str_rounded(s: &str) -> Result<Self, ParseTimeError> {
        let millis = parse_utc_millis(s)?;
        let secs = (millis + 500).div_euclid(1000);
        u32::try_from(secs).map(Self).map_err(|_| ParseTimeError::OutOfRange(s.to_owned()))
    }

    #[must_use]
    pub fn saturating_add(self, secs: u32) -> Self {
        Self(self.0.saturating_add(secs))
    }
}

impl FromStr for TimePointSec {
    type Err = ParseTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let secs = parse_utc_millis(s)?.div_euclid(1000);
        u32::try_from(secs).map(Self).map_err(|_| ParseTimeError::OutOfRange(s.to_owned()))
    }
}

impl fmt::Display for TimePointSec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_utc_millis(i64::from(self.0) * 1000, SECONDS_FORMAT))
    }
}

/// Microseconds since the unix epoch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimePoint(i64);

impl TimePoint {
    pub const fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    pub const fn as_micros(&self) -> i64 {
        self.0
    }
}

impl FromStr for TimePoint {
    type Err = ParseTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.strip_suffix('Z').unwrap_or(s);
        let parsed = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
            .map_err(|_| ParseTimeError::Invalid(s.to_owned()))?;
        Ok(Self(parsed.and_utc().timestamp_micros()))
    }
}

impl fmt::Display for TimePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_utc_millis(self.0.div_euclid(1000), MILLIS_FORMAT))
    }
}

/// Half-second slot number since 2000-01-01T00:00:00Z
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockTimestamp(u32);

impl BlockTimestamp {
    pub const fn from_slot(slot: u32) -> Self {
        Self(slot)
    }

    pub const fn slot(&self) -> u32 {
        self.0
    }

    /// Rounds the slot time to the nearest whole second
    pub fn to_time_point_sec(&self) -> TimePointSec {
        let epoch_half_seconds = (BLOCK_TIMESTAMP_EPOCH_MS / BLOCK_INTERVAL_MS) as u64;
        let half_seconds = u64::from(self.0) + epoch_half_seconds;
        TimePointSec(((half_seconds + 1) / 2) as u32)
    }
}

impl FromStr for BlockTimestamp {
    type Err = ParseTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let millis = parse_utc_millis(s)?;
        let slot = (millis - BLOCK_TIMESTAMP_EPOCH_MS).div_euclid(BLOCK_INTERVAL_MS);
        u32::try_from(slot).map(Self).map_err(|_| ParseTimeError::OutOfRange(s.to_owned()))
    }
}

impl fmt::Display for BlockTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let millis = i64::from(self.0) * BLOCK_INTERVAL_MS + BLOCK_TIMESTAMP_EPOCH_MS;
        f.write_str(&format_utc_millis(millis, MILLIS_FORMAT))
    }
}

macro_rules! impl_time_traits {
    ($($t:ident($inner:ty)),*) => {
        $(
            impl Serialize for $t {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serializer.collect_str(self)
                }
            }

            impl<'de> Deserialize<'de> for $t {
                fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                    let s = String::deserialize(deserializer)?;
                    s.parse().map_err(de::Error::custom)
                }
            }

            impl Encodable for $t {
                fn encode(&self, out: &mut dyn BufMut) {
                    self.0.encode(out)
                }
            }

            impl Decodable for $t {
                fn decode(buf: &mut &[u8]) -> Result<Self, DecodeError> {
                    <$inner>::decode(buf).map(Self)
                }
            }
        )*
    };
}

impl_time_traits!(TimePointSec(u32), TimePoint(i64), BlockTimestamp(u32));
