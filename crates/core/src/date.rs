//! Date handling for post records.
//!
//! Post dates arrive as strings of two kinds: bare calendar days
//! (`YYYY-MM-DD`) and timestamps. Calendar days are compared against "today"
//! in a fixed reference zone; timestamps are compared as instants.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};

/// Default reference zone offset (India Standard Time)
pub const DEFAULT_TIMEZONE: &str = "+05:30";

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// The instant a filter run treats as "now", and the zone that defines "today"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceTime {
    pub now: DateTime<Utc>,
    pub zone: FixedOffset,
}

impl ReferenceTime {
    pub fn new(now: DateTime<Utc>, zone: FixedOffset) -> Self {
        Self { now, zone }
    }

    /// Wall-clock reference in the given zone
    pub fn current(zone: FixedOffset) -> Self {
        Self::new(Utc::now(), zone)
    }

    pub fn today(&self) -> NaiveDate {
        self.now.with_timezone(&self.zone).date_naive()
    }

    pub fn today_string(&self) -> String {
        self.today().format("%Y-%m-%d").to_string()
    }
}

/// Outcome of comparing a post date against the reference time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recency {
    OnOrBefore,
    Future,
    Unparseable,
}

/// `YYYY-MM-DD` with nothing else
pub fn is_bare_date(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Decide whether a normalized date is on or before the reference time.
///
/// Bare dates compare lexicographically against today's date in the
/// reference zone, so a post dated today is included.
pub fn check_recency(date: &str, reference: &ReferenceTime) -> Recency {
    if is_bare_date(date) {
        return if date <= reference.today_string().as_str() {
            Recency::OnOrBefore
        } else {
            Recency::Future
        };
    }

    match parse_instant(date, reference.zone) {
        Some(instant) if instant <= reference.now => Recency::OnOrBefore,
        Some(_) => Recency::Future,
        None => Recency::Unparseable,
    }
}

/// Parse a timestamp string.
///
/// RFC 3339 strings carry their own offset; naive date-times are read in `zone`.
pub fn parse_instant(s: &str, zone: FixedOffset) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    NAIVE_FORMATS.iter().find_map(|fmt| {
        NaiveDateTime::parse_from_str(s, fmt)
            .ok()
            .and_then(|naive| zone.from_local_datetime(&naive).single())
            .map(|dt| dt.with_timezone(&Utc))
    })
}

/// Milliseconds since the epoch, used for newest/oldest ordering.
///
/// Bare dates count as UTC midnight; unparseable input sorts as the epoch.
pub fn sort_key(s: &str) -> i64 {
    if is_bare_date(s) {
        return NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc().timestamp_millis())
            .unwrap_or(0);
    }
    parse_instant(s, utc())
        .map(|dt| dt.timestamp_millis())
        .unwrap_or(0)
}

/// Human-readable date like "Aug 28, 2025"; unparseable input comes back as-is
pub fn format_display_date(s: &str) -> String {
    let day = if is_bare_date(s) {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
    } else {
        parse_instant(s, utc()).map(|dt| dt.date_naive())
    };

    match day {
        Some(d) => d.format("%b %d, %Y").to_string(),
        None => s.to_string(),
    }
}

/// Parse a fixed UTC offset such as `+05:30`, `-0800`, `+09` or `UTC`
pub fn parse_utc_offset(s: &str) -> Option<FixedOffset> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("utc") || s.eq_ignore_ascii_case("z") {
        return Some(utc());
    }

    let (sign, rest) = match s.chars().next()? {
        '+' => (1, &s[1..]),
        '-' => (-1, &s[1..]),
        _ => return None,
    };

    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None if rest.len() == 4 => rest.split_at(2),
        None => (rest, "0"),
    };

    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if !(0..=23).contains(&hours) || !(0..60).contains(&minutes) {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn utc() -> FixedOffset {
    Utc.fix()
}
