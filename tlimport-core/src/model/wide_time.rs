use serde::{Serialize, Serializer};
use std::fmt::Display;

/// a GTFS time of day, stored as seconds since noon minus 12h ("midnight") of
/// the service day. values past 24:00:00 are valid for trips that run
/// after midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WideTime(u32);

impl WideTime {
    pub fn from_seconds(seconds: u32) -> WideTime {
        WideTime(seconds)
    }

    pub fn from_hms(hours: u32, minutes: u32, seconds: u32) -> WideTime {
        WideTime(hours * 3600 + minutes * 60 + seconds)
    }

    pub fn seconds(&self) -> u32 {
        self.0
    }

    /// parses `H:MM:SS` or `HH:MM:SS`. hours may exceed 23, but not so far
    /// that the total overflows.
    pub fn parse(value: &str) -> Option<WideTime> {
        let mut parts = value.trim().split(':');
        let (h, m, s) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() || m.len() != 2 || s.len() != 2 || h.is_empty() {
            return None;
        }
        let hours: u32 = h.parse().ok()?;
        let minutes: u32 = m.parse().ok()?;
        let seconds: u32 = s.parse().ok()?;
        if minutes > 59 || seconds > 59 {
            return None;
        }
        let total = hours
            .checked_mul(3600)?
            .checked_add(minutes * 60 + seconds)?;
        Some(WideTime(total))
    }
}

impl Display for WideTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let h = self.0 / 3600;
        let m = (self.0 % 3600) / 60;
        let s = self.0 % 60;
        write!(f, "{h:02}:{m:02}:{s:02}")
    }
}

impl Serialize for WideTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}
