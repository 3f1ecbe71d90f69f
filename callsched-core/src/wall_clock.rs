//! Value types that flow through the converter, plus strict parsers for the
//! form-layer string formats (`YYYY-MM-DD`, `HH:MM`, IANA zone ids).

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{InputField, Result, ScheduleError};

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("date pattern compiles"));
static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2}):(\d{2})$").expect("time pattern compiles"));

/// Milliseconds since the Unix epoch (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Instant(i64);

impl Instant {
    pub const fn from_millis(ms: i64) -> Self {
        Instant(ms)
    }

    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// Fails with `OutOfRange` instead of wrapping on overflow.
    pub fn plus_minutes(self, minutes: i64) -> Result<Self> {
        minutes
            .checked_mul(60_000)
            .and_then(|ms| self.0.checked_add(ms))
            .map(Instant)
            .ok_or(ScheduleError::OutOfRange(self.0))
    }

    /// Fails only for integers chrono cannot represent (roughly +/- 262,000 years).
    pub fn to_utc(self) -> Result<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.0)
            .single()
            .ok_or(ScheduleError::OutOfRange(self.0))
    }
}

impl From<DateTime<Utc>> for Instant {
    fn from(dt: DateTime<Utc>) -> Self {
        Instant(dt.timestamp_millis())
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_utc() {
            Ok(dt) => f.write_str(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Err(_) => write!(f, "{}ms", self.0),
        }
    }
}

/// A picker time: hour and minute, no seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(ClockTime {
            hour: hour as u8,
            minute: minute as u8,
        })
    }

    pub fn hour(self) -> u32 {
        self.hour.into()
    }

    pub fn minute(self) -> u32 {
        self.minute.into()
    }

    /// Drops seconds and sub-seconds.
    pub fn from_naive(t: NaiveTime) -> Self {
        ClockTime {
            hour: t.hour() as u8,
            minute: t.minute() as u8,
        }
    }

    pub fn to_naive(self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour(), self.minute(), 0).unwrap_or(NaiveTime::MIN)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = ScheduleError;

    fn try_from(s: String) -> Result<Self> {
        parse_time(&s)
    }
}

impl From<ClockTime> for String {
    fn from(t: ClockTime) -> String {
        t.to_string()
    }
}

/// What a user sees in the date and time pickers, without the zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WallClock {
    pub date: NaiveDate,
    pub time: ClockTime,
}

impl fmt::Display for WallClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date.format("%Y-%m-%d"), self.time)
    }
}

/// A wall-clock reading scoped to a zone. Still not a point in time on its own:
/// DST gaps and overlaps make some readings map to zero or two instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallClockInput {
    pub date: NaiveDate,
    pub time: ClockTime,
    pub zone: Tz,
}

impl WallClockInput {
    pub fn parse(date: &str, time: &str, zone: &str) -> Result<Self> {
        Ok(WallClockInput {
            date: parse_date(date)?,
            time: parse_time(time)?,
            zone: parse_zone(zone)?,
        })
    }

    pub fn wall_clock(&self) -> WallClock {
        WallClock {
            date: self.date,
            time: self.time,
        }
    }
}

/// Parse a `YYYY-MM-DD` picker value.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let caps = DATE_RE
        .captures(s)
        .ok_or_else(|| ScheduleError::invalid(InputField::Date, s, "expected YYYY-MM-DD"))?;
    let bad = |reason: &str| ScheduleError::invalid(InputField::Date, s, reason);
    let year: i32 = caps[1].parse().map_err(|_| bad("bad year"))?;
    let month: u32 = caps[2].parse().map_err(|_| bad("bad month"))?;
    let day: u32 = caps[3].parse().map_err(|_| bad("bad day"))?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| bad("no such calendar date"))
}

/// Parse an `HH:MM` picker value (24-hour clock).
pub fn parse_time(s: &str) -> Result<ClockTime> {
    let caps = TIME_RE
        .captures(s)
        .ok_or_else(|| ScheduleError::invalid(InputField::Time, s, "expected HH:MM"))?;
    let bad = |reason: &str| ScheduleError::invalid(InputField::Time, s, reason);
    let hour: u32 = caps[1].parse().map_err(|_| bad("bad hour"))?;
    let minute: u32 = caps[2].parse().map_err(|_| bad("bad minute"))?;

    ClockTime::new(hour, minute).ok_or_else(|| bad("hour must be 00-23 and minute 00-59"))
}

/// Resolve an IANA zone identifier against the bundled tz database.
pub fn parse_zone(s: &str) -> Result<Tz> {
    s.parse::<Tz>().map_err(|_| ScheduleError::UnknownZone(s.to_string()))
}

/// Parse a stored epoch-millisecond value as it comes back from the API.
pub fn parse_instant(s: &str) -> Result<Instant> {
    let ms: i64 = s
        .trim()
        .parse()
        .map_err(|e| ScheduleError::invalid(InputField::Timestamp, s, format!("{e}")))?;
    let instant = Instant::from_millis(ms);
    instant.to_utc()?;
    Ok(instant)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_accepts_picker_format() {
        assert_eq!(
            parse_date("2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[test]
    fn test_parse_date_rejects_impossible_and_malformed() {
        for bad in ["2023-02-29", "2024-13-01", "2024-1-01", "01/02/2024", "", "2024-01-01T00:00"] {
            match parse_date(bad) {
                Err(ScheduleError::InvalidInputFormat { field, .. }) => {
                    assert_eq!(field, InputField::Date)
                }
                other => panic!("expected date error for {bad:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_parse_time() {
        let t = parse_time("08:05").unwrap();
        assert_eq!((t.hour(), t.minute()), (8, 5));
        assert_eq!(t.to_string(), "08:05");

        for bad in ["24:00", "12:60", "8:05", "08:05:00", "noon"] {
            assert!(parse_time(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_parse_zone() {
        assert_eq!(parse_zone("America/New_York").unwrap(), Tz::America__New_York);
        assert_eq!(
            parse_zone("Mars/Olympus_Mons"),
            Err(ScheduleError::UnknownZone("Mars/Olympus_Mons".to_string()))
        );
    }

    #[test]
    fn test_parse_instant() {
        assert_eq!(parse_instant("1719871200000").unwrap().as_millis(), 1_719_871_200_000);
        assert!(parse_instant("12.5").is_err());
        assert!(matches!(parse_instant(&i64::MAX.to_string()), Err(ScheduleError::OutOfRange(_))));
    }

    #[test]
    fn plus_minutes_reports_overflow() {
        let i = Instant::from_millis(0);
        assert_eq!(i.plus_minutes(2).unwrap().as_millis(), 120_000);
        assert_eq!(i.plus_minutes(-1).unwrap().as_millis(), -60_000);
        assert!(matches!(i.plus_minutes(i64::MAX / 1000), Err(ScheduleError::OutOfRange(0))));
        assert!(Instant::from_millis(i64::MAX - 1).plus_minutes(1).is_err());
    }

    #[test]
    fn instant_display_is_rfc3339_utc() {
        let i = Instant::from_millis(1_719_871_200_000);
        assert_eq!(i.to_string(), "2024-07-01T22:00:00Z");
    }

    #[test]
    fn wall_clock_serializes_as_picker_strings() {
        let wc = WallClock {
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            time: ClockTime::new(8, 30).unwrap(),
        };
        let json = serde_json::to_string(&wc).unwrap();
        assert_eq!(json, r#"{"date":"2024-06-01","time":"08:30"}"#);

        let back: WallClock = serde_json::from_str(&json).unwrap();
        assert_eq!(back, wc);
        let bad_time = r#"{"date":"2024-06-01","time":"25:00"}"#;
        assert!(serde_json::from_str::<WallClock>(bad_time).is_err());
    }
}
