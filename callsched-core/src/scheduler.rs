//! Picker guardrails: everything that depends on "now".
//!
//! Each operation samples the clock exactly once, so a single call is
//! internally consistent. Two back-to-back calls may see different values.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::call::ScheduledCallDraft;
use crate::clock::Clock;
use crate::error::{Result, ScheduleError};
use crate::time::{LocalTimeKind, classify_local_time, input_to_instant, instant_to_local};
use crate::wall_clock::{ClockTime, Instant, WallClock, WallClockInput};
use crate::zones::{TimezoneOption, timezone_options};

/// Lead used for the default slot and as its skew fallback.
pub const DEFAULT_LEAD_MINUTES: i64 = 60;

/// Upper bound for every policy field (one year).
pub const MAX_POLICY_MINUTES: i64 = 366 * 24 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulePolicy {
    /// Earliest selectable time is `now + buffer_minutes`.
    pub buffer_minutes: i64,
    /// The default slot is `now + default_lead_minutes`.
    pub default_lead_minutes: i64,
    /// A default slot closer than this falls back to [`DEFAULT_LEAD_MINUTES`].
    pub min_lead_minutes: i64,
    /// Reject readings that fall in a spring-forward gap when validating a call.
    pub reject_nonexistent: bool,
}

impl SchedulePolicy {
    /// Every field must be in `0..=MAX_POLICY_MINUTES`. A negative buffer would
    /// let the pickers offer times in the past.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("buffer_minutes", self.buffer_minutes),
            ("default_lead_minutes", self.default_lead_minutes),
            ("min_lead_minutes", self.min_lead_minutes),
        ];
        for (field, value) in fields {
            if !(0..=MAX_POLICY_MINUTES).contains(&value) {
                return Err(ScheduleError::InvalidPolicy { field, value });
            }
        }
        Ok(())
    }
}

impl Default for SchedulePolicy {
    fn default() -> Self {
        Self {
            buffer_minutes: 2,
            default_lead_minutes: DEFAULT_LEAD_MINUTES,
            min_lead_minutes: 10,
            reject_nonexistent: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimumSchedulable {
    pub min_date: chrono::NaiveDate,
    /// Only set when `min_date` is today in the zone; otherwise any time on `min_date` is fine.
    pub min_time: Option<ClockTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSlot {
    pub instant: Instant,
    pub local: WallClock,
}

#[derive(Debug, Clone)]
pub struct CallScheduler<C: Clock> {
    clock: C,
    policy: SchedulePolicy,
}

impl<C: Clock> CallScheduler<C> {
    pub fn new(clock: C) -> Self {
        Self::with_policy(clock, SchedulePolicy::default())
    }

    pub fn with_policy(clock: C, policy: SchedulePolicy) -> Self {
        Self { clock, policy }
    }

    pub fn policy(&self) -> &SchedulePolicy {
        &self.policy
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// True when the reading converts to an instant strictly after now.
    pub fn is_future_local(&self, input: &WallClockInput) -> bool {
        input_to_instant(input) > self.clock.now()
    }

    pub fn minimum_schedulable(&self, zone: Tz) -> Result<MinimumSchedulable> {
        let now = self.clock.now();
        let earliest = now.plus_minutes(self.policy.buffer_minutes)?;

        let today = instant_to_local(now, zone)?.date;
        let min = instant_to_local(earliest, zone)?;

        let min_time = (min.date == today).then_some(min.time);
        debug!(%zone, %now, %earliest, ?min_time, "minimum_schedulable");
        Ok(MinimumSchedulable {
            min_date: min.date,
            min_time,
        })
    }

    pub fn default_schedulable(&self, zone: Tz) -> Result<ScheduleSlot> {
        let now = self.clock.now();
        let floor = now.plus_minutes(self.policy.min_lead_minutes)?;

        let mut instant = now.plus_minutes(self.policy.default_lead_minutes)?;
        if instant < floor {
            // Only reachable with a skewed clock or a misconfigured lead.
            warn!(%instant, %floor, "default slot too close to now; using fallback lead");
            instant = now.plus_minutes(DEFAULT_LEAD_MINUTES)?;
        }

        Ok(ScheduleSlot {
            instant,
            local: instant_to_local(instant, zone)?,
        })
    }

    /// Curated zone options with offsets as of now.
    pub fn timezone_options(&self) -> Result<Vec<TimezoneOption>> {
        timezone_options(self.clock.now())
    }

    /// Form-submit check: convert the picker values and refuse anything before
    /// the earliest schedulable instant.
    pub fn validate_call_time(
        &self,
        phone_number: &str,
        date: &str,
        time: &str,
        zone: &str,
    ) -> Result<ScheduledCallDraft> {
        let input = WallClockInput::parse(date, time, zone)?;

        if self.policy.reject_nonexistent
            && classify_local_time(input.date, input.time, input.zone) == LocalTimeKind::Nonexistent
        {
            return Err(ScheduleError::NonexistentLocalTime {
                date: input.date,
                time: input.time,
                zone: input.zone.name().to_string(),
            });
        }

        let requested = input_to_instant(&input);
        let earliest = self.clock.now().plus_minutes(self.policy.buffer_minutes)?;
        if requested < earliest {
            return Err(ScheduleError::TooSoon { requested, earliest });
        }

        Ok(ScheduledCallDraft::new(phone_number, requested, input.zone))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{TimeZone, Utc};

    fn frozen(y: i32, m: u32, d: u32, h: u32, min: u32) -> CallScheduler<FixedClock> {
        let now = Instant::from(Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap());
        CallScheduler::new(FixedClock(now))
    }

    fn input(date: &str, time: &str, zone: &str) -> WallClockInput {
        WallClockInput::parse(date, time, zone).unwrap()
    }

    #[test]
    fn test_is_future_local() {
        let s = frozen(2024, 6, 1, 12, 0);
        assert!(s.is_future_local(&input("2024-06-01", "08:30", "America/New_York")));
        assert!(!s.is_future_local(&input("2024-06-01", "07:30", "America/New_York")));
        // Exactly now is not in the future.
        assert!(!s.is_future_local(&input("2024-06-01", "08:00", "America/New_York")));
    }

    #[test]
    fn minimum_rolls_into_next_day() {
        let s = frozen(2024, 6, 1, 23, 58);
        let m = s.minimum_schedulable(Tz::UTC).unwrap();
        assert_eq!(m.min_date.to_string(), "2024-06-02");
        assert_eq!(m.min_time, None);
    }

    #[test]
    fn minimum_today_carries_a_time() {
        let s = frozen(2024, 6, 1, 12, 0);
        let m = s.minimum_schedulable(Tz::America__New_York).unwrap();
        assert_eq!(m.min_date.to_string(), "2024-06-01");
        assert_eq!(m.min_time.map(|t| t.to_string()).as_deref(), Some("08:02"));
    }

    #[test]
    fn minimum_uses_the_zone_calendar() {
        // 23:58Z is already the next morning in Tokyo; the buffer stays on that day.
        let s = frozen(2024, 6, 1, 23, 58);
        let m = s.minimum_schedulable(Tz::Asia__Tokyo).unwrap();
        assert_eq!(m.min_date.to_string(), "2024-06-02");
        assert_eq!(m.min_time.map(|t| t.to_string()).as_deref(), Some("09:00"));
    }

    #[test]
    fn default_is_an_hour_ahead() {
        let s = frozen(2024, 6, 1, 12, 0);
        let slot = s.default_schedulable(Tz::America__New_York).unwrap();
        assert_eq!(slot.instant, s.now().plus_minutes(60).unwrap());
        assert_eq!(slot.local.to_string(), "2024-06-01 09:00");
    }

    #[test]
    fn default_falls_back_when_lead_is_too_short() {
        let now = Instant::from(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap());
        let policy = SchedulePolicy {
            default_lead_minutes: 5,
            ..SchedulePolicy::default()
        };
        let s = CallScheduler::with_policy(FixedClock(now), policy);
        assert_eq!(s.policy(), &policy);
        let slot = s.default_schedulable(Tz::UTC).unwrap();
        assert_eq!(slot.instant, now.plus_minutes(DEFAULT_LEAD_MINUTES).unwrap());
    }

    #[test]
    fn validate_rejects_inside_buffer() {
        let s = frozen(2024, 6, 1, 12, 0);
        // 12:01Z is before now + 2 minutes.
        let err = s
            .validate_call_time("+15551234567", "2024-06-01", "08:01", "America/New_York")
            .unwrap_err();
        assert!(matches!(err, ScheduleError::TooSoon { .. }));

        let draft = s
            .validate_call_time("+15551234567", "2024-06-01", "08:02", "America/New_York")
            .unwrap();
        assert_eq!(draft.scheduled_for, s.now().plus_minutes(2).unwrap());
        assert_eq!(draft.timezone, "America/New_York");
    }

    #[test]
    fn validate_surfaces_format_errors() {
        let s = frozen(2024, 6, 1, 12, 0);
        assert!(matches!(
            s.validate_call_time("+1", "2024-06-01", "08:30", "EST5EDT/Nope"),
            Err(ScheduleError::UnknownZone(_))
        ));
        assert!(matches!(
            s.validate_call_time("+1", "June 1", "08:30", "UTC"),
            Err(ScheduleError::InvalidInputFormat { .. })
        ));
    }

    #[test]
    fn validate_gap_only_when_opted_in() {
        let now = Instant::from(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());

        let lenient = CallScheduler::new(FixedClock(now));
        let gap = lenient.validate_call_time("+1", "2024-03-10", "02:30", "America/New_York");
        assert!(gap.is_ok());

        let strict = CallScheduler::with_policy(
            FixedClock(now),
            SchedulePolicy {
                reject_nonexistent: true,
                ..SchedulePolicy::default()
            },
        );
        assert!(matches!(
            strict.validate_call_time("+1", "2024-03-10", "02:30", "America/New_York"),
            Err(ScheduleError::NonexistentLocalTime { .. })
        ));
    }

    #[test]
    fn test_policy_validate() {
        assert!(SchedulePolicy::default().validate().is_ok());

        let negative = SchedulePolicy {
            buffer_minutes: -5,
            ..SchedulePolicy::default()
        };
        assert_eq!(
            negative.validate(),
            Err(ScheduleError::InvalidPolicy {
                field: "buffer_minutes",
                value: -5
            })
        );

        let huge = SchedulePolicy {
            default_lead_minutes: MAX_POLICY_MINUTES + 1,
            ..SchedulePolicy::default()
        };
        assert!(matches!(
            huge.validate(),
            Err(ScheduleError::InvalidPolicy { field: "default_lead_minutes", .. })
        ));
    }

    #[test]
    fn oversized_policy_errors_instead_of_overflowing() {
        let now = Instant::from(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap());
        let policy = SchedulePolicy {
            buffer_minutes: i64::MAX / 1000,
            min_lead_minutes: i64::MAX / 1000,
            ..SchedulePolicy::default()
        };
        let s = CallScheduler::with_policy(FixedClock(now), policy);

        assert!(matches!(s.minimum_schedulable(Tz::UTC), Err(ScheduleError::OutOfRange(_))));
        assert!(matches!(s.default_schedulable(Tz::UTC), Err(ScheduleError::OutOfRange(_))));
        assert!(matches!(
            s.validate_call_time("+1", "2024-06-02", "12:00", "UTC"),
            Err(ScheduleError::OutOfRange(_))
        ));
    }
}
