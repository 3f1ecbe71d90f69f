//! The scheduling fields of an outbound call record.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::time::instant_to_local;
use crate::wall_clock::{Instant, WallClock, parse_zone};

/// `scheduled_for` goes over the wire as a bare epoch-millisecond integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledCallDraft {
    pub phone_number: String,
    pub scheduled_for: Instant,
    pub timezone: String,
}

impl ScheduledCallDraft {
    pub fn new(phone_number: impl Into<String>, scheduled_for: Instant, zone: Tz) -> Self {
        Self {
            phone_number: phone_number.into(),
            scheduled_for,
            timezone: zone.name().to_string(),
        }
    }

    /// Picker values for editing a stored record in its own zone.
    pub fn local(&self) -> Result<WallClock> {
        instant_to_local(self.scheduled_for, parse_zone(&self.timezone)?)
    }
}
