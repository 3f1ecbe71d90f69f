//! Time utilities: timezone-aware conversion between picker values and instants.

use chrono::{LocalResult, NaiveDate, Offset, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, ScheduleError};
use crate::wall_clock::{ClockTime, Instant, WallClock, WallClockInput};

/// Convert a wall-clock reading in `zone` to the instant that renders as it.
///
/// chrono-tz is used only as a "render this instant in that zone" primitive:
/// the reading is first treated as UTC, rendered in `zone`, and the guess is
/// shifted back by whatever the render drifted. One correction, no iteration.
///
/// Exact whenever the zone's offset is the same at the guess and at the answer.
/// Inside a spring-forward gap the result is whatever that one correction
/// lands on (for `America/New_York` 02:30 on a skip day it renders as 03:30).
/// In a fall-back overlap the correction usually picks the earlier reading.
/// Use [`classify_local_time`] to detect either case before converting.
pub fn local_to_instant(date: NaiveDate, time: ClockTime, zone: Tz) -> Instant {
    let requested = date.and_time(time.to_naive());
    let guess = requested.and_utc();

    let rendered = guess.with_timezone(&zone).naive_local();
    let delta_ms = (rendered - requested).num_milliseconds();
    let corrected = guess.timestamp_millis() - delta_ms;

    debug!(%zone, %requested, delta_ms, corrected, "local_to_instant");
    Instant::from_millis(corrected)
}

/// String entry point used by forms: `YYYY-MM-DD`, `HH:MM`, IANA id.
pub fn local_str_to_instant(date: &str, time: &str, zone: &str) -> Result<Instant> {
    let input = WallClockInput::parse(date, time, zone)?;
    Ok(input_to_instant(&input))
}

pub fn input_to_instant(input: &WallClockInput) -> Instant {
    local_to_instant(input.date, input.time, input.zone)
}

/// Render an instant as picker values in `zone`. Seconds are truncated.
///
/// Instants at the edge of chrono's range can overflow once the zone offset
/// is applied; those return `OutOfRange`.
pub fn instant_to_local(instant: Instant, zone: Tz) -> Result<WallClock> {
    let utc = instant.to_utc()?.naive_utc();
    let offset = zone.offset_from_utc_datetime(&utc).fix();
    let local = utc
        .checked_add_offset(offset)
        .ok_or(ScheduleError::OutOfRange(instant.as_millis()))?;
    Ok(WallClock {
        date: local.date(),
        time: ClockTime::from_naive(local.time()),
    })
}

/// UTC offset of `zone` at `instant`, in minutes (east positive).
pub fn offset_minutes_at(zone: Tz, instant: Instant) -> Result<i32> {
    let utc = instant.to_utc()?;
    let offset = zone.offset_from_utc_datetime(&utc.naive_utc()).fix();
    Ok(offset.local_minus_utc() / 60)
}

/// `UTC`, `UTC+05:30`, `UTC-04:00`.
pub fn offset_label(minutes: i32) -> String {
    if minutes == 0 {
        return "UTC".to_string();
    }
    let sign = if minutes < 0 { '-' } else { '+' };
    let abs = minutes.unsigned_abs();
    format!("UTC{sign}{:02}:{:02}", abs / 60, abs % 60)
}

/// How many instants a wall-clock reading maps to in a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalTimeKind {
    Unique,
    /// Fall-back overlap: the reading occurs twice.
    Ambiguous,
    /// Spring-forward gap: the reading never occurs.
    Nonexistent,
}

pub fn classify_local_time(date: NaiveDate, time: ClockTime, zone: Tz) -> LocalTimeKind {
    let ndt = date.and_time(time.to_naive());
    match zone.from_local_datetime(&ndt) {
        LocalResult::Single(_) => LocalTimeKind::Unique,
        LocalResult::Ambiguous(_, _) => LocalTimeKind::Ambiguous,
        LocalResult::None => {
            warn!(%zone, %ndt, "local time falls in a DST gap");
            LocalTimeKind::Nonexistent
        }
    }
}
