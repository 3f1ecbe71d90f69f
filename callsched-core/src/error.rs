//! Error taxonomy for scheduling conversions.

use chrono::NaiveDate;

use crate::wall_clock::{ClockTime, Instant};

/// Which form field a parse failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    Date,
    Time,
    Timestamp,
}

impl std::fmt::Display for InputField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            InputField::Date => "date",
            InputField::Time => "time",
            InputField::Timestamp => "timestamp",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error("invalid {field} '{value}': {reason}")]
    InvalidInputFormat {
        field: InputField,
        value: String,
        reason: String,
    },

    #[error("unknown timezone: {0}")]
    UnknownZone(String),

    #[error("timestamp {0} ms is outside the supported range")]
    OutOfRange(i64),

    #[error("requested time {requested} is before the earliest schedulable time {earliest}")]
    TooSoon { requested: Instant, earliest: Instant },

    #[error("schedule policy {field} = {value} is out of range")]
    InvalidPolicy { field: &'static str, value: i64 },

    /// Only raised by callers that opt into gap rejection; conversion itself never does.
    #[error("{date} {time} does not exist in {zone} (DST gap)")]
    NonexistentLocalTime {
        date: NaiveDate,
        time: ClockTime,
        zone: String,
    },
}

impl ScheduleError {
    pub(crate) fn invalid(field: InputField, value: &str, reason: impl Into<String>) -> Self {
        ScheduleError::InvalidInputFormat {
            field,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
