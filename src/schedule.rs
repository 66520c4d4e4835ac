//! Weekly working-hours schedules.
//!
//! A schedule is seven comma separated days starting on Sunday. Each day is a
//! `+` separated list of `start-end` shifts written as durations from
//! midnight, e.g. `,8h-12h+13h-18h,9h-18h,,,,`. Empty days have no working
//! hours.

use std::time::Duration;
use thiserror::Error;

/// Day names, indexed like [`WeeklySchedule::days`].
pub const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Last instant of a day, used as the open end of inverted shifts.
pub const END_OF_DAY: Duration = Duration::new(24 * 60 * 60 - 1, 999_999_999);

const UNITS: &[(&str, u64)] = &[
    ("ns", 1),
    ("us", 1_000),
    ("µs", 1_000),
    ("μs", 1_000),
    ("ms", 1_000_000),
    ("s", 1_000_000_000),
    ("m", 60 * 1_000_000_000),
    ("h", 60 * 60 * 1_000_000_000),
];

/// Reasons a raw schedule is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("expected a full week schedule: {raw}")]
    IncompleteWeek { raw: String },

    #[error("{day}'s shift is invalid: {shifts}")]
    InvalidShift { day: &'static str, shifts: String },

    #[error("unable to parse {day}'s shift {shifts}: invalid duration {value:?}")]
    InvalidDuration {
        day: &'static str,
        shifts: String,
        value: String,
    },

    #[error("{day}'s shift starts after it ends: {shift}")]
    StartsAfterEnd { day: &'static str, shift: String },

    #[error("{day}'s shifts are not correctly sorted: {shift}")]
    Unsorted { day: &'static str, shift: String },

    #[error("end must be less than 24h: {}", format_duration(*.end))]
    PastEndOfDay { end: Duration },

    #[error("schedule is empty")]
    Empty,
}

/// A working period within one day, as offsets from midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shift {
    pub start: Duration,
    pub end: Duration,
}

impl Shift {
    pub const fn new(start: Duration, end: Duration) -> Self {
        Self { start, end }
    }
}

impl std::fmt::Display for Shift {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{}",
            format_duration(self.start),
            format_duration(self.end)
        )
    }
}

/// Shifts for each day of the week, Sunday first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeeklySchedule {
    days: [Vec<Shift>; 7],
}

impl WeeklySchedule {
    pub fn from_days(days: [Vec<Shift>; 7]) -> Self {
        Self { days }
    }

    pub fn days(&self) -> &[Vec<Shift>; 7] {
        &self.days
    }

    /// Parse a raw schedule, rejecting unsorted, overlapping or reversed
    /// shifts and weeks without any working hours.
    pub fn parse(raw: &str) -> Result<Self, ScheduleError> {
        let week: Vec<&str> = raw.split(',').collect();
        if week.len() != WEEKDAYS.len() {
            return Err(ScheduleError::IncompleteWeek {
                raw: raw.to_string(),
            });
        }

        let mut schedule = WeeklySchedule::default();
        for (index, shifts) in week.into_iter().enumerate() {
            if shifts.is_empty() {
                continue;
            }
            schedule.days[index] = parse_day(WEEKDAYS[index], shifts)?;
        }

        if schedule.days.iter().all(Vec::is_empty) {
            return Err(ScheduleError::Empty);
        }
        Ok(schedule)
    }

    /// The complement of the schedule: every day's non-working hours.
    ///
    /// A day without shifts becomes a single shift covering the whole day.
    pub fn inverted(&self) -> Self {
        let mut inverted = WeeklySchedule::default();

        for (day, shifts) in self.days.iter().enumerate() {
            let out = &mut inverted.days[day];
            let Some(last) = shifts.last() else {
                out.push(Shift::new(Duration::ZERO, END_OF_DAY));
                continue;
            };

            for (i, shift) in shifts.iter().enumerate() {
                if shift.start.is_zero() {
                    continue;
                }
                if i == 0 {
                    out.push(Shift::new(Duration::ZERO, shift.start));
                    continue;
                }
                let previous = shifts[i - 1];
                if previous.end >= END_OF_DAY {
                    continue;
                }
                out.push(Shift::new(previous.end, shift.start));
            }

            if last.end < END_OF_DAY {
                out.push(Shift::new(last.end, END_OF_DAY));
            }
        }

        inverted
    }
}

impl std::str::FromStr for WeeklySchedule {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_day(day: &'static str, shifts: &str) -> Result<Vec<Shift>, ScheduleError> {
    let mut parsed: Vec<Shift> = Vec::new();

    for shift in shifts.split('+') {
        let Some((start, end)) = shift.split_once('-').filter(|(_, end)| !end.contains('-'))
        else {
            return Err(ScheduleError::InvalidShift {
                day,
                shifts: shifts.to_string(),
            });
        };

        let bound = |value: &str| {
            parse_duration(value).ok_or_else(|| ScheduleError::InvalidDuration {
                day,
                shifts: shifts.to_string(),
                value: value.to_string(),
            })
        };
        let (start, end) = (bound(start)?, bound(end)?);

        if start > end {
            return Err(ScheduleError::StartsAfterEnd {
                day,
                shift: shift.to_string(),
            });
        }
        if parsed.last().is_some_and(|previous| previous.end > start) {
            return Err(ScheduleError::Unsorted {
                day,
                shift: shift.to_string(),
            });
        }
        if end >= DAY {
            return Err(ScheduleError::PastEndOfDay { end });
        }

        parsed.push(Shift::new(start, end));
    }

    Ok(parsed)
}

/// Parse a duration such as `8h`, `8h30m` or `1.5h`.
///
/// A bare `0` is accepted; every other number needs a unit (`ns`, `us`, `ms`,
/// `s`, `m`, `h`).
pub fn parse_duration(raw: &str) -> Option<Duration> {
    if raw == "0" {
        return Some(Duration::ZERO);
    }
    if raw.is_empty() {
        return None;
    }

    let is_number = |c: char| c.is_ascii_digit() || c == '.';
    let mut rest = raw;
    let mut nanos = 0f64;

    while !rest.is_empty() {
        let number_end = rest.find(|c: char| !is_number(c)).unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_end);
        let unit_end = tail.find(is_number).unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_end);

        if number.is_empty() || number == "." {
            return None;
        }
        let value: f64 = number.parse().ok()?;
        let (_, scale) = UNITS.iter().find(|(name, _)| *name == unit)?;

        nanos += value * *scale as f64;
        rest = tail;
    }

    (nanos < u64::MAX as f64).then(|| Duration::from_nanos(nanos.round() as u64))
}

/// Render a duration as hours, minutes and seconds, e.g. `8h30m0s`.
pub fn format_duration(duration: Duration) -> String {
    if duration.is_zero() {
        return "0s".to_string();
    }

    let nanos = duration.subsec_nanos();
    if duration < Duration::from_secs(1) {
        return match nanos {
            n if n < 1_000 => format!("{n}ns"),
            n if n < 1_000_000 => format!("{}µs", decimal(n, 1_000, 3)),
            n => format!("{}ms", decimal(n, 1_000_000, 6)),
        };
    }

    let total = duration.as_secs();
    let (hours, minutes, seconds) = (total / 3600, (total / 60) % 60, total % 60);

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    let seconds = u64::from(nanos) + seconds * 1_000_000_000;
    out.push_str(&format!("{}s", decimal(seconds, 1_000_000_000, 9)));
    out
}

fn decimal(value: impl Into<u64>, scale: u64, digits: usize) -> String {
    let value = value.into();
    let (whole, fraction) = (value / scale, value % scale);
    if fraction == 0 {
        return whole.to_string();
    }
    let fraction = format!("{fraction:0digits$}");
    format!("{whole}.{}", fraction.trim_end_matches('0'))
}
