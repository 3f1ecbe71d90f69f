//! Curated timezone catalogue for the zone picker.
//!
//! The identifiers are fixed; offsets are not. Each call to [`timezone_options`]
//! recomputes offsets for the instant it is given, so results must not be
//! cached across DST transitions.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::time::{offset_label, offset_minutes_at};
use crate::wall_clock::Instant;

/// (IANA id, human label)
pub const CURATED_ZONES: &[(Tz, &str)] = &[
    (Tz::Pacific__Honolulu, "Hawaii"),
    (Tz::America__Anchorage, "Alaska"),
    (Tz::America__Los_Angeles, "Pacific Time - Los Angeles"),
    (Tz::America__Phoenix, "Mountain Time - Phoenix"),
    (Tz::America__Denver, "Mountain Time - Denver"),
    (Tz::America__Chicago, "Central Time - Chicago"),
    (Tz::America__Mexico_City, "Mexico City"),
    (Tz::America__New_York, "Eastern Time - New York"),
    (Tz::America__Toronto, "Eastern Time - Toronto"),
    (Tz::America__Halifax, "Atlantic Time - Halifax"),
    (Tz::America__St_Johns, "Newfoundland"),
    (Tz::America__Sao_Paulo, "Sao Paulo"),
    (Tz::America__Argentina__Buenos_Aires, "Buenos Aires"),
    (Tz::UTC, "Coordinated Universal Time"),
    (Tz::Europe__London, "London"),
    (Tz::Europe__Dublin, "Dublin"),
    (Tz::Europe__Paris, "Paris"),
    (Tz::Europe__Berlin, "Berlin"),
    (Tz::Europe__Madrid, "Madrid"),
    (Tz::Africa__Lagos, "Lagos"),
    (Tz::Africa__Johannesburg, "Johannesburg"),
    (Tz::Europe__Athens, "Athens"),
    (Tz::Africa__Cairo, "Cairo"),
    (Tz::Europe__Istanbul, "Istanbul"),
    (Tz::Europe__Moscow, "Moscow"),
    (Tz::Asia__Dubai, "Dubai"),
    (Tz::Asia__Karachi, "Karachi"),
    (Tz::Asia__Kolkata, "India - Kolkata"),
    (Tz::Asia__Kathmandu, "Kathmandu"),
    (Tz::Asia__Dhaka, "Dhaka"),
    (Tz::Asia__Bangkok, "Bangkok"),
    (Tz::Asia__Jakarta, "Jakarta"),
    (Tz::Asia__Singapore, "Singapore"),
    (Tz::Asia__Shanghai, "China - Shanghai"),
    (Tz::Asia__Hong_Kong, "Hong Kong"),
    (Tz::Asia__Manila, "Manila"),
    (Tz::Asia__Seoul, "Seoul"),
    (Tz::Asia__Tokyo, "Tokyo"),
    (Tz::Australia__Adelaide, "Adelaide"),
    (Tz::Australia__Brisbane, "Brisbane"),
    (Tz::Australia__Sydney, "Sydney"),
    (Tz::Pacific__Auckland, "Auckland"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimezoneOption {
    /// IANA identifier, e.g. `America/New_York`.
    pub zone: String,
    pub label: String,
    pub offset_minutes: i32,
}

impl TimezoneOption {
    /// `(UTC-04:00) Eastern Time - New York`
    pub fn display_label(&self) -> String {
        format!("({}) {}", offset_label(self.offset_minutes), self.label)
    }
}

/// Offset-annotated options as of `now`, sorted by offset then label.
pub fn timezone_options(now: Instant) -> Result<Vec<TimezoneOption>> {
    let mut out = CURATED_ZONES
        .iter()
        .map(|(tz, label)| {
            Ok(TimezoneOption {
                zone: tz.name().to_string(),
                label: (*label).to_string(),
                offset_minutes: offset_minutes_at(*tz, now)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    out.sort_by(|a, b| {
        a.offset_minutes
            .cmp(&b.offset_minutes)
            .then_with(|| a.label.cmp(&b.label))
    });
    Ok(out)
}

/// Whether `zone` appears in the curated picker list.
pub fn is_curated(zone: Tz) -> bool {
    CURATED_ZONES.iter().any(|(tz, _)| *tz == zone)
}
