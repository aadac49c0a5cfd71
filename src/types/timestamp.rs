// ABOUTME: Push timestamp normalization for image records.
// ABOUTME: Converts native datetimes to one canonical RFC 3339 string form.

use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use std::fmt;

/// When an image was pushed, either as received from the registry or
/// already normalized to its canonical string form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushedAt {
    Native(DateTime<FixedOffset>),
    Iso(String),
}

impl PushedAt {
    /// Convert to the canonical string form in place. Already-normalized
    /// values are left untouched.
    pub fn normalize(&mut self) {
        if let PushedAt::Native(dt) = self {
            *self = PushedAt::Iso(canonical(dt));
        }
    }

    /// Consuming variant of [`PushedAt::normalize`].
    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    /// The comparable instant, or `None` when the string form does not parse.
    /// ISO strings without an offset are read as UTC.
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            PushedAt::Native(dt) => Some(dt.with_timezone(&Utc)),
            PushedAt::Iso(s) => parse_iso(s),
        }
    }
}

/// Offset-free layouts accepted after RFC 3339.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

fn parse_iso(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

fn canonical(dt: &DateTime<FixedOffset>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

impl From<DateTime<Utc>> for PushedAt {
    fn from(dt: DateTime<Utc>) -> Self {
        PushedAt::Native(dt.fixed_offset())
    }
}

impl From<DateTime<FixedOffset>> for PushedAt {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        PushedAt::Native(dt)
    }
}

impl From<String> for PushedAt {
    fn from(s: String) -> Self {
        PushedAt::Iso(s)
    }
}

impl fmt::Display for PushedAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushedAt::Iso(s) => f.write_str(s),
            PushedAt::Native(dt) => f.write_str(&canonical(dt)),
        }
    }
}

impl Serialize for PushedAt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
