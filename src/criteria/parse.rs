//! Conversions from raw criteria input to typed values
//!
//! These never fail loudly: input that cannot be understood yields `None`,
//! which the compilers treat as a criterion no record can satisfy.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static RELATIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-]\d+(?:\.\d+)?)\s*([smhd]?)$").expect("valid relative time regex")
});

const LOCAL_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S%.f",
    "%d/%m/%Y %H:%M",
];

const LOCAL_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

/// Timezone used to interpret dates typed without an explicit offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(Tz);

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    pub fn tz(&self) -> Tz {
        self.0
    }

    /// Parse a time criterion relative to `now`.
    ///
    /// Accepts signed offsets (`-5` is five minutes ago, `-2h` two hours ago),
    /// RFC 3339 strings and a few local date layouts. The sign is required:
    /// a bare number such as `2019` is not a date and yields `None`.
    pub fn parse_at(&self, value: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }

        if let Some(caps) = RELATIVE_RE.captures(value) {
            let amount: f64 = caps[1].parse().ok()?;
            let unit_seconds = match &caps[2] {
                "s" => 1.0,
                "h" => 3600.0,
                "d" => 86400.0,
                _ => 60.0,
            };
            let millis = amount * unit_seconds * 1000.0;
            if !millis.is_finite() || millis.abs() > i64::MAX as f64 {
                return None;
            }
            return now.checked_add_signed(Duration::try_milliseconds(millis as i64)?);
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(dt.with_timezone(&Utc));
        }

        let naive = LOCAL_DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
            .or_else(|| {
                LOCAL_DATE_FORMATS.iter().find_map(|fmt| {
                    NaiveDate::parse_from_str(value, fmt)
                        .ok()
                        .and_then(|date| date.and_hms_opt(0, 0, 0))
                })
            })?;

        self.0
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn parse(&self, value: &str) -> Option<DateTime<Utc>> {
        self.parse_at(value, Utc::now())
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(Tz::UTC)
    }
}

impl FromStr for Timezone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Tz>().map(Timezone).map_err(|e| e.to_string())
    }
}

impl fmt::Display for Timezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.name())
    }
}

/// Parse the leading integer of a string, tolerating trailing garbage
/// (`"12abc"` is 12). Returns `None` when no digit leads the input.
pub fn parse_leading_int(value: &str) -> Option<i64> {
    let s = value.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let magnitude: i64 = digits[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Split a set criterion into its tokens
pub fn split_tokens(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}

/// Convert an instant to fractional epoch seconds with millisecond precision
pub fn epoch_seconds(instant: &DateTime<Utc>) -> f64 {
    instant.timestamp_millis() as f64 / 1000.0
}
