// libs/scheduling-cell/src/interval.rs
use chrono::{NaiveTime, Timelike};

/// Fixed appointment duration and slot granularity in minutes.
pub const SLOT_MINUTES: u16 = 30;

/// Minute-of-day for a clinic-local time. Seconds are truncated; the
/// scheduling data model works at whole-minute resolution (0..=1439).
pub fn minute_of_day(time: NaiveTime) -> u16 {
    (time.hour() * 60 + time.minute()) as u16
}

pub fn to_naive_time(minute: u16) -> NaiveTime {
    // minute is always a slot start inside a single day
    NaiveTime::from_hms_opt(u32::from(minute / 60), u32::from(minute % 60), 0)
        .unwrap_or(NaiveTime::MIN)
}

pub fn format_minute(minute: u16) -> String {
    format!("{:02}:{:02}", minute / 60, minute % 60)
}

/// Half-open `[start, end)` range of minutes within a single clinic day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinuteInterval {
    pub start: u16,
    pub end: u16,
}

impl MinuteInterval {
    pub fn new(start: u16, end: u16) -> Self {
        Self { start, end }
    }

    pub fn from_times(start: NaiveTime, end: NaiveTime) -> Self {
        Self::new(minute_of_day(start), minute_of_day(end))
    }

    /// The occupied interval of a single booking starting at `start_minute`.
    pub fn slot(start_minute: u16) -> Self {
        Self::new(start_minute, start_minute + SLOT_MINUTES)
    }

    /// Two half-open intervals overlap iff `a.start < b.end && b.start < a.end`.
    pub fn overlaps(&self, other: &MinuteInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Membership check used by the booking validator: the window end itself
    /// counts as inside (`start <= minute <= end`). This is intentionally NOT
    /// the half-open rule slot generation uses; see DESIGN.md.
    pub fn contains_inclusive(&self, minute: u16) -> bool {
        self.start <= minute && minute <= self.end
    }

    /// Bookable slot starts inside this window, stepping by the slot
    /// granularity. A trailing partial slot is truncated, never offered.
    pub fn slot_starts(&self) -> impl Iterator<Item = u16> {
        let end = self.end;
        (self.start..end)
            .step_by(usize::from(SLOT_MINUTES))
            .filter(move |start| start + SLOT_MINUTES <= end)
    }
}
