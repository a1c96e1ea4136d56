use crate::{
    error::Error,
    prelude::{Duration, Epoch},
};

use chrono::{DateTime, Local, TimeZone};
use hifitime::Unit;

/// Gregorian calendar day. Prayer schedules are computed per [Date].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date {
    year: i32,
    month: u8,
    day: u8,
}

impl std::fmt::Display for Date {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl std::str::FromStr for Date {
    type Err = Error;
    /// Parses "YYYY-MM-DD"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut items = s.trim().split('-');
        let year = items
            .next()
            .and_then(|y| y.parse::<i32>().ok())
            .ok_or(Error::InvalidDate)?;
        let month = items
            .next()
            .and_then(|m| m.parse::<u8>().ok())
            .ok_or(Error::InvalidDate)?;
        let day = items
            .next()
            .and_then(|d| d.parse::<u8>().ok())
            .ok_or(Error::InvalidDate)?;
        if items.next().is_some() {
            return Err(Error::InvalidDate);
        }
        Self::new(year, month, day)
    }
}

impl Date {
    /// Builds a new [Date], rejecting non existing days.
    pub fn new(year: i32, month: u8, day: u8) -> Result<Self, Error> {
        Epoch::maybe_from_gregorian_utc(year, month, day, 0, 0, 0, 0)
            .map_err(|_| Error::InvalidDate)?;
        Ok(Self { year, month, day })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    /// Calendar day of `t` as seen on a wall clock at `utc_offset` from UTC.
    pub fn from_epoch(t: Epoch, utc_offset: Duration) -> Self {
        let (year, month, day, _, _, _, _) = (t + utc_offset).to_gregorian_utc();
        Self { year, month, day }
    }

    /// Start of this day, 00:00:00 UTC.
    pub fn midnight_utc(&self) -> Epoch {
        Epoch::from_gregorian_utc_at_midnight(self.year, self.month, self.day)
    }

    /// Following calendar day.
    pub fn next(&self) -> Self {
        // 36h lands safely inside the next day, leap second or not
        Self::from_epoch(self.midnight_utc() + 36.0 * Unit::Hour, Duration::ZERO)
    }

    /// Previous calendar day.
    pub fn previous(&self) -> Self {
        Self::from_epoch(self.midnight_utc() - 12.0 * Unit::Hour, Duration::ZERO)
    }
}

/// Offset of the system time zone to UTC, at that instant.
/// Falls back to UTC when the instant cannot be represented.
pub fn local_utc_offset(t: Epoch) -> Duration {
    let unix_s = t.to_unix_seconds().floor() as i64;
    match DateTime::from_timestamp(unix_s, 0) {
        Some(utc) => {
            let offset = Local.offset_from_utc_datetime(&utc.naive_utc());
            f64::from(offset.local_minus_utc()) * Unit::Second
        },
        None => Duration::ZERO,
    }
}

/// [Clock] supplies the current wall clock time.
/// Applications inject their own implementation to run deterministic scenarios.
pub trait Clock {
    fn now(&self) -> Result<Epoch, Error>;
}

/// [SystemClock] reads the operating system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Result<Epoch, Error> {
        Epoch::now().map_err(|_| Error::SystemClock)
    }
}

/// Remaining time, as whole hours, minutes and seconds.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    pub hours: u64,
    pub minutes: u8,
    pub seconds: u8,
}

impl std::fmt::Display for Countdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}h {}m {}s", self.hours, self.minutes, self.seconds)
    }
}

impl From<Duration> for Countdown {
    /// Negative durations count as zero. Sub-second remainder is truncated.
    fn from(remaining: Duration) -> Self {
        let total_s = remaining.to_seconds().floor();
        if total_s.is_nan() || total_s <= 0.0 {
            return Self::default();
        }
        let total_s = total_s as u64;
        Self {
            hours: total_s / 3600,
            minutes: ((total_s % 3600) / 60) as u8,
            seconds: (total_s % 60) as u8,
        }
    }
}

impl Countdown {
    pub fn is_zero(&self) -> bool {
        self.hours == 0 && self.minutes == 0 && self.seconds == 0
    }
}

/// Wall clock time of day, displayed on a 12 hour dial ("h:mm AM").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalTime {
    pub hour: u8,
    pub minute: u8,
}

impl LocalTime {
    pub fn from_epoch(t: Epoch, utc_offset: Duration) -> Self {
        let (_, _, _, hour, minute, _, _) = (t + utc_offset).to_gregorian_utc();
        Self { hour, minute }
    }
}

impl std::fmt::Display for LocalTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let suffix = if self.hour < 12 { "AM" } else { "PM" };
        let hour = match self.hour % 12 {
            0 => 12,
            h => h,
        };
        write!(f, "{}:{:02} {}", hour, self.minute, suffix)
    }
}
