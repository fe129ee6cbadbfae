//! Reminder timestamp value type.
//!
//! Written as ISO-8601 UTC with millisecond precision
//! (`YYYY-MM-DDTHH:MM:SS.sssZ`). Text read from storage in any other RFC 3339
//! shape is kept verbatim and written back unchanged.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Absolute instant at which a note's reminder should fire.
///
/// Equality, ordering and hashing consider the instant only.
#[derive(Debug, Clone)]
pub struct ReminderAt {
    at: DateTime<Utc>,
    /// Source text when it differs from the canonical form.
    source: Option<Box<str>>,
}

impl ReminderAt {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self { at, source: None }
    }

    /// Builds a timestamp from Unix epoch milliseconds.
    ///
    /// Returns `None` when the value is outside chrono's representable range.
    pub fn from_epoch_millis(millis: i64) -> Option<Self> {
        Utc.timestamp_millis_opt(millis).single().map(Self::new)
    }

    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.at
    }

    pub fn epoch_millis(&self) -> i64 {
        self.at.timestamp_millis()
    }

    /// Canonical ISO-8601 text, e.g. `2026-10-18T09:30:00.000Z`.
    pub fn to_iso_string(&self) -> String {
        self.at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Text written to storage: the source text if one was kept.
    pub fn wire_text(&self) -> Cow<'_, str> {
        match &self.source {
            Some(source) => Cow::Borrowed(&**source),
            None => Cow::Owned(self.to_iso_string()),
        }
    }
}

impl PartialEq for ReminderAt {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at
    }
}

impl Eq for ReminderAt {}

impl PartialOrd for ReminderAt {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ReminderAt {
    fn cmp(&self, other: &Self) -> Ordering {
        self.at.cmp(&other.at)
    }
}

impl Hash for ReminderAt {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.at.hash(state);
    }
}

impl From<DateTime<Utc>> for ReminderAt {
    fn from(value: DateTime<Utc>) -> Self {
        Self::new(value)
    }
}

impl Display for ReminderAt {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso_string())
    }
}

impl FromStr for ReminderAt {
    type Err = chrono::ParseError;

    /// Accepts any RFC 3339 timestamp; non-canonical text is remembered.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parsed = DateTime::parse_from_rfc3339(value.trim())?;
        let mut reminder = Self::new(parsed.with_timezone(&Utc));
        if value != reminder.to_iso_string() {
            reminder.source = Some(value.into());
        }
        Ok(reminder)
    }
}

impl Serialize for ReminderAt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.wire_text())
    }
}

impl<'de> Deserialize<'de> for ReminderAt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<ReminderAt>()
            .map_err(|err| D::Error::custom(format!("invalid reminder timestamp `{raw}`: {err}")))
    }
}
