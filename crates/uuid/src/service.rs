//! Identifier implementations.

use crate::{UuidError, UuidResult};
use chrono::{DateTime, Duration, SubsecRound, Utc};
use std::{fmt, str::FromStr};

/// Re-exported for convenience.
pub use ::uuid::Uuid;

/// Canonical asset identifier (32 lowercase hex characters, no hyphens).
///
/// Once constructed the contained UUID is guaranteed to be in canonical form, so the
/// string representation is stable across documents and stores.
///
/// # Construction
/// - [`AssetId::new`] generates a new canonical id.
/// - [`AssetId::parse`] validates an externally supplied identifier. Hyphenated or
///   uppercase forms are rejected rather than normalised.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(Uuid);

impl Default for AssetId {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetId {
    /// Generates a new random (v4) id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Validates and parses an id that must already be in canonical form.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] if `input` is not 32 lowercase hex characters.
    pub fn parse(input: &str) -> UuidResult<Self> {
        if !Self::is_canonical(input) {
            return Err(UuidError::InvalidInput(format!(
                "UUID must be 32 lowercase hex characters without hyphens, got: '{}'",
                input
            )));
        }
        Uuid::parse_str(input)
            .map(Self)
            .map_err(|e| UuidError::InvalidInput(format!("invalid UUID '{}': {}", input, e)))
    }

    /// Returns the underlying `uuid::Uuid`.
    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// Returns true if `input` is in canonical form.
    ///
    /// This is a purely syntactic check: exactly 32 bytes of `0-9` / `a-f`.
    pub fn is_canonical(input: &str) -> bool {
        input.len() == 32
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for AssetId {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AssetId::parse(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for AssetId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for AssetId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        AssetId::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// A time-prefixed identifier.
///
/// Format:
/// `YYYYMMDDTHHMMSS.mmmZ-<canonical_uuid>`
///
/// Example:
/// `20260111T143522.045Z-550e8400e29b41d4a716446655440000`
///
/// When [`TimestampId::generate`] is given the previous id, the new timestamp is strictly
/// greater (bumped by 1 ms if the clock has not moved), so actions appended in one editing
/// session keep a stable order even when created within the same millisecond.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TimestampId {
    timestamp: DateTime<Utc>,
    uuid: AssetId,
}

impl TimestampId {
    /// Generates a new id, strictly later than `last` if provided.
    pub fn generate(last: Option<&TimestampId>) -> Self {
        // Rendered ids carry milliseconds only.
        let now = Utc::now().trunc_subsecs(3);

        let timestamp = match last {
            Some(prev) if now <= prev.timestamp => prev.timestamp + Duration::milliseconds(1),
            _ => now,
        };

        Self {
            timestamp,
            uuid: AssetId::new(),
        }
    }

    /// Generates a new id after a previously rendered id string.
    ///
    /// Strings that are not timestamp ids (for example hand-written ids in imported
    /// documents) are ignored and a fresh id is generated.
    pub fn generate_after_str(last: Option<&str>) -> Self {
        let parsed = last.and_then(|s| TimestampId::from_str(s).ok());
        Self::generate(parsed.as_ref())
    }

    /// Returns the timestamp component.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the UUID component.
    pub fn uuid(&self) -> &AssetId {
        &self.uuid
    }
}

impl FromStr for TimestampId {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (ts_str, uuid_str) = s.split_once('-').ok_or_else(|| {
            UuidError::InvalidInput(format!("Invalid timestamp id format: '{}'", s))
        })?;

        let ts_no_z = ts_str.strip_suffix('Z').ok_or_else(|| {
            UuidError::InvalidInput(format!("Timestamp must end with 'Z': '{}'", ts_str))
        })?;

        let naive =
            chrono::NaiveDateTime::parse_from_str(ts_no_z, "%Y%m%dT%H%M%S%.3f").map_err(|e| {
                UuidError::InvalidInput(format!("Invalid timestamp format '{}': {}", ts_str, e))
            })?;

        Ok(Self {
            timestamp: DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc),
            uuid: AssetId::parse(uuid_str)?,
        })
    }
}

impl fmt::Display for TimestampId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.timestamp.format("%Y%m%dT%H%M%S%.3fZ"),
            self.uuid
        )
    }
}

/// Key addressing one item in an ordered list (a lab result, an exam finding).
///
/// Keys are opaque: any string read back from a document is accepted, and new keys are
/// random so two items created in the same session never share one.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ItemKey(String);

impl ItemKey {
    /// Generates a fresh random key.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ItemKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
