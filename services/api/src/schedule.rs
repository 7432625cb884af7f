//! Time-window parsing and slot generation
//!
//! Wall-clock times are interpreted in a fixed UTC offset (configured through
//! `SCHEDULE_UTC_OFFSET_MINUTES`) and stored as UTC instants.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;
use uuid::Uuid;

use crate::models::slot::NewSlot;

/// Length of every generated slot
pub const SLOT_MINUTES: u32 = 60;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Invalid time format '{0}'. Use HH:mm")]
    InvalidTimeFormat(String),

    #[error("Start time {start} must be before end time {end}")]
    EmptyWindow { start: String, end: String },

    #[error("dayOfWeek must be between 0 and 6, got {0}")]
    InvalidDayOfWeek(i16),
}

/// Hour and minute of a day, ordered lexicographically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeOfDay {
    hour: u32,
    minute: u32,
}

impl TimeOfDay {
    /// Parse `H:mm` or `HH:mm` on a 24h clock
    pub fn parse(raw: &str) -> Result<Self, ScheduleError> {
        static TIME_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = TIME_REGEX.get_or_init(|| {
            Regex::new(r"^([0-1]?[0-9]|2[0-3]):([0-5][0-9])$").expect("Failed to compile time regex")
        });

        let captures = regex
            .captures(raw)
            .ok_or_else(|| ScheduleError::InvalidTimeFormat(raw.to_string()))?;

        // Both groups are digit-only by construction
        let hour = captures[1]
            .parse()
            .map_err(|_| ScheduleError::InvalidTimeFormat(raw.to_string()))?;
        let minute = captures[2]
            .parse()
            .map_err(|_| ScheduleError::InvalidTimeFormat(raw.to_string()))?;

        Ok(Self { hour, minute })
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    fn minutes_since_midnight(&self) -> u32 {
        self.hour * 60 + self.minute
    }
}

/// Validated `[start, end)` window within one day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl TimeWindow {
    /// Validate both bounds and require `start < end`
    pub fn parse(start: &str, end: &str) -> Result<Self, ScheduleError> {
        let start_time = TimeOfDay::parse(start)?;
        let end_time = TimeOfDay::parse(end)?;

        if start_time >= end_time {
            return Err(ScheduleError::EmptyWindow {
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        Ok(Self {
            start: start_time,
            end: end_time,
        })
    }
}

pub fn validate_day_of_week(day_of_week: Option<i16>) -> Result<(), ScheduleError> {
    match day_of_week {
        Some(day) if !(0..=6).contains(&day) => Err(ScheduleError::InvalidDayOfWeek(day)),
        _ => Ok(()),
    }
}

/// Expand a window into consecutive one-hour slots
///
/// The cursor starts at `window.start` and advances by one hour (minutes
/// unchanged) while it is before `window.end`. A candidate is emitted only
/// when it ends at or before `window.end`, so a trailing partial hour is
/// dropped, and a window shorter than an hour yields nothing.
pub fn generate_slots(
    availability_id: Uuid,
    owner_id: Uuid,
    date: NaiveDate,
    window: TimeWindow,
    offset: FixedOffset,
) -> Vec<NewSlot> {
    let end = window.end.minutes_since_midnight();
    let mut cursor = window.start.minutes_since_midnight();
    let mut slots = Vec::new();

    while cursor < end {
        let candidate_end = cursor + SLOT_MINUTES;

        if candidate_end <= end {
            slots.push(NewSlot {
                availability_id,
                owner_id,
                start_time: wall_clock(date, cursor, offset),
                end_time: wall_clock(date, candidate_end, offset),
            });
        }

        cursor += SLOT_MINUTES;
    }

    slots
}

/// Inclusive UTC bounds of a local calendar day: midnight to 23:59:59.999
pub fn day_bounds(date: NaiveDate, offset: FixedOffset) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = to_utc(date.and_time(NaiveTime::MIN), offset);
    let end = start + Duration::milliseconds(24 * 60 * 60 * 1000 - 1);
    (start, end)
}

fn wall_clock(date: NaiveDate, minutes: u32, offset: FixedOffset) -> DateTime<Utc> {
    to_utc(
        date.and_time(NaiveTime::MIN) + Duration::minutes(i64::from(minutes)),
        offset,
    )
}

fn to_utc(local: NaiveDateTime, offset: FixedOffset) -> DateTime<Utc> {
    Utc.from_utc_datetime(&(local - Duration::seconds(i64::from(offset.local_minus_utc()))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 3, 14).unwrap()
    }

    fn generate(start: &str, end: &str) -> Vec<NewSlot> {
        let window = TimeWindow::parse(start, end).unwrap();
        generate_slots(Uuid::nil(), Uuid::nil(), date(), window, utc())
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.from_utc_datetime(&date().and_hms_opt(hour, minute, 0).unwrap())
    }

    #[test]
    fn accepts_single_and_double_digit_hours() {
        assert_eq!(TimeOfDay::parse("9:00").unwrap().hour(), 9);
        assert_eq!(TimeOfDay::parse("09:05").unwrap().minute(), 5);
        assert_eq!(TimeOfDay::parse("23:59").unwrap().hour(), 23);
        assert_eq!(TimeOfDay::parse("0:00").unwrap().hour(), 0);
    }

    #[test]
    fn rejects_malformed_times() {
        for raw in ["25:00", "24:00", "09:60", "9:5", "0900", "09:00 ", " 09:00", "", "ab:cd"] {
            assert_eq!(
                TimeOfDay::parse(raw),
                Err(ScheduleError::InvalidTimeFormat(raw.to_string())),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn window_requires_start_before_end() {
        assert!(matches!(
            TimeWindow::parse("10:00", "09:00"),
            Err(ScheduleError::EmptyWindow { .. })
        ));
        assert!(matches!(
            TimeWindow::parse("10:00", "10:00"),
            Err(ScheduleError::EmptyWindow { .. })
        ));
        assert!(TimeWindow::parse("9:59", "10:00").is_ok());
    }

    #[test]
    fn window_reports_format_before_ordering() {
        assert_eq!(
            TimeWindow::parse("10:00", "09:60"),
            Err(ScheduleError::InvalidTimeFormat("09:60".to_string()))
        );
    }

    #[test]
    fn three_hour_window_yields_three_contiguous_slots() {
        let slots = generate("09:00", "12:00");

        let ranges: Vec<_> = slots.iter().map(|s| (s.start_time, s.end_time)).collect();
        assert_eq!(
            ranges,
            vec![
                (at(9, 0), at(10, 0)),
                (at(10, 0), at(11, 0)),
                (at(11, 0), at(12, 0)),
            ]
        );
    }

    #[test]
    fn whole_hour_windows_yield_duration_over_sixty_slots() {
        for (start, end, expected) in [("0:00", "23:00", 23), ("06:15", "08:15", 2), ("13:30", "14:30", 1)] {
            let slots = generate(start, end);
            assert_eq!(slots.len(), expected, "{start}-{end}");

            assert_eq!(slots[0].start_time.format("%H:%M").to_string(), format!("{:0>5}", start));
            for pair in slots.windows(2) {
                assert_eq!(pair[0].end_time, pair[1].start_time);
            }
            for slot in &slots {
                assert_eq!(slot.end_time - slot.start_time, Duration::hours(1));
            }
        }
    }

    #[test]
    fn window_shorter_than_an_hour_yields_nothing() {
        assert!(generate("09:00", "09:30").is_empty());
        assert!(generate("09:30", "10:15").is_empty());
    }

    #[test]
    fn trailing_partial_hour_is_dropped() {
        let slots = generate("09:30", "11:45");
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[1].start_time, at(10, 30));
        assert_eq!(slots[1].end_time, at(11, 30));
    }

    #[test]
    fn candidates_past_midnight_are_never_emitted() {
        let slots = generate("22:30", "23:45");
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].end_time, at(23, 30));
    }

    #[test]
    fn slots_carry_parent_ids() {
        let availability_id = Uuid::new_v4();
        let owner_id = Uuid::new_v4();
        let window = TimeWindow::parse("08:00", "10:00").unwrap();

        let slots = generate_slots(availability_id, owner_id, date(), window, utc());
        assert!(
            slots
                .iter()
                .all(|s| s.availability_id == availability_id && s.owner_id == owner_id)
        );
    }

    #[test]
    fn local_offset_shifts_instants() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let window = TimeWindow::parse("09:00", "10:00").unwrap();

        let slots = generate_slots(Uuid::nil(), Uuid::nil(), date(), window, plus_two);
        assert_eq!(slots[0].start_time, at(7, 0));
    }

    #[test]
    fn day_bounds_cover_the_local_day() {
        let (start, end) = day_bounds(date(), utc());
        assert_eq!(start, at(0, 0));
        assert_eq!(end, at(23, 59) + Duration::milliseconds(59_999));
    }

    #[test]
    fn day_of_week_must_be_in_range() {
        assert!(validate_day_of_week(None).is_ok());
        assert!(validate_day_of_week(Some(0)).is_ok());
        assert!(validate_day_of_week(Some(6)).is_ok());
        assert_eq!(
            validate_day_of_week(Some(7)),
            Err(ScheduleError::InvalidDayOfWeek(7))
        );
        assert!(validate_day_of_week(Some(-1)).is_err());
    }
}
