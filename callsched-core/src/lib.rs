//! callsched-core: timezone-correct scheduling arithmetic for call booking.
//!
//! Converts date/time picker values in an IANA zone to epoch-millisecond
//! instants and back, and derives the picker guardrails (minimum selectable
//! time, default slot, zone list) from an injected clock.

pub mod call;
pub mod clock;
pub mod error;
pub mod scheduler;
pub mod time;
pub mod wall_clock;
pub mod zones;

pub use call::ScheduledCallDraft;
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{InputField, Result, ScheduleError};
pub use scheduler::{
    CallScheduler, DEFAULT_LEAD_MINUTES, MAX_POLICY_MINUTES, MinimumSchedulable, SchedulePolicy,
    ScheduleSlot,
};
pub use time::{
    LocalTimeKind, classify_local_time, input_to_instant, instant_to_local, local_str_to_instant,
    local_to_instant, offset_label, offset_minutes_at,
};
pub use wall_clock::{
    ClockTime, Instant, WallClock, WallClockInput, parse_date, parse_instant, parse_time,
    parse_zone,
};
pub use zones::{CURATED_ZONES, TimezoneOption, is_curated, timezone_options};

pub use chrono_tz::Tz;
