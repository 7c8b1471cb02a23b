//! Conversion context.
//!
//! A [`Context`] travels with a query builder into normalization and result
//! hydration. The only key the core interprets is `timezone`, which selects the
//! target timezone for date/datetime conversion.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

pub const TIMEZONE_KEY: &str = "timezone";
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// String-keyed bag of options passed through the conversion pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context(Map<String, JsonValue>);

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a context holding only a timezone.
    pub fn with_timezone(timezone: impl Into<String>) -> Self {
        let mut ctx = Self::new();
        ctx.insert(TIMEZONE_KEY, JsonValue::String(timezone.into()));
        ctx
    }

    pub fn insert(&mut self, key: impl Into<String>, value: JsonValue) -> Option<JsonValue> {
        self.0.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Timezone name, `UTC` when unset.
    pub fn timezone(&self) -> &str {
        self.0
            .get(TIMEZONE_KEY)
            .and_then(JsonValue::as_str)
            .unwrap_or(DEFAULT_TIMEZONE)
    }

    /// Copy every key of `defaults` that this context does not set yet.
    pub fn merge_defaults(&mut self, defaults: &Context) {
        for (key, value) in &defaults.0 {
            if !self.0.contains_key(key) {
                self.0.insert(key.clone(), value.clone());
            }
        }
    }

    pub fn as_map(&self) -> &Map<String, JsonValue> {
        &self.0
    }
}

impl From<Map<String, JsonValue>> for Context {
    fn from(map: Map<String, JsonValue>) -> Self {
        Self(map)
    }
}

/// A resolved context timezone.
///
/// IANA names keep their DST rules; numeric offsets stay fixed. Converted
/// values always carry the offset in effect at that instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timezone {
    Named(Tz),
    Fixed(FixedOffset),
}

impl Timezone {
    /// Read a wall-clock time in this zone.
    ///
    /// Ambiguous times (DST fall-back) take the earlier instant. Times inside
    /// a DST gap do not exist and give `None`.
    pub fn localize(&self, naive: &NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        match self {
            Timezone::Named(tz) => tz
                .from_local_datetime(naive)
                .earliest()
                .map(|dt| dt.fixed_offset()),
            Timezone::Fixed(offset) => offset.from_local_datetime(naive).single(),
        }
    }

    /// Shift an instant into this zone.
    pub fn convert<T: TimeZone>(&self, moment: &DateTime<T>) -> DateTime<FixedOffset> {
        match self {
            Timezone::Named(tz) => moment.with_timezone(tz).fixed_offset(),
            Timezone::Fixed(offset) => moment.with_timezone(offset),
        }
    }
}

/// Resolve a timezone name.
///
/// IANA names such as `Europe/Brussels` resolve through the tz database.
/// Otherwise `UTC`, `GMT`, `Z` (any case) and numeric offsets such as
/// `+02:00`, `+0200`, `+02` or `-05:30` are accepted. Returns `None` for
/// anything else.
pub fn parse_timezone(name: &str) -> Option<Timezone> {
    let name = name.trim();
    if let Ok(tz) = name.parse::<Tz>() {
        return Some(Timezone::Named(tz));
    }
    parse_offset(name).map(Timezone::Fixed)
}

fn parse_offset(name: &str) -> Option<FixedOffset> {
    if ["utc", "gmt", "z", "etc/utc", "etc/gmt"].contains(&name.to_ascii_lowercase().as_str()) {
        return FixedOffset::east_opt(0);
    }

    let (sign, rest) = match name.as_bytes().first()? {
        b'+' => (1, &name[1..]),
        b'-' => (-1, &name[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes) = match digits.len() {
        1 | 2 => (digits.parse::<i32>().ok()?, 0),
        4 => (digits[..2].parse::<i32>().ok()?, digits[2..].parse::<i32>().ok()?),
        _ => return None,
    };
    if hours > 14 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
