//! Next prayer tracking
use log::{debug, info};

use crate::prelude::{Countdown, Date, Duration, Epoch, Prayer, PrayerSchedule};

use hifitime::Unit;

/// [NextEventTracker] life cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackerStatus {
    /// No [PrayerSchedule] loaded yet
    #[default]
    Idle,
    /// Schedule loaded, updated on each tick
    Tracking,
    /// Torn down: no further tick has any effect
    Stopped,
}

/// Upcoming event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NextEvent {
    pub prayer: Prayer,
    pub instant: Epoch,
    /// Event belongs to the following day's schedule
    pub next_day: bool,
}

impl std::fmt::Display for NextEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.next_day {
            write!(f, "{} (tomorrow)", self.prayer)
        } else {
            write!(f, "{}", self.prayer)
        }
    }
}

/// Derived tracking state, recomputed on every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NextEventState {
    pub candidate: Option<NextEvent>,
    /// Time until candidate, never negative. Zero is a valid momentary state.
    pub remaining: Duration,
}

impl Default for NextEventState {
    fn default() -> Self {
        Self {
            candidate: None,
            remaining: Duration::ZERO,
        }
    }
}

impl NextEventState {
    /// Remaining time as whole hours, minutes, seconds
    pub fn countdown(&self) -> Countdown {
        Countdown::from(self.remaining)
    }
}

/// Emitted when every event of the day has passed and the following day's
/// [PrayerSchedule] is needed. The owner is expected to compute it and
/// hand it over with [NextEventTracker::load_next_day].
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextDayRequest {
    pub date: Date,
}

/// [NextEventTracker] selects the next upcoming event of a [PrayerSchedule].
#[derive(Debug, Clone, Default)]
pub struct NextEventTracker {
    status: TrackerStatus,
    today: Option<PrayerSchedule>,
    tomorrow: Option<PrayerSchedule>,
    /// Last [NextDayRequest] we issued, so we only ask once
    requested: Option<Date>,
    state: NextEventState,
}

/// Earliest available entry strictly after `now`.
/// Ties resolve to the earlier declared entry.
fn earliest_after(schedule: &PrayerSchedule, now: Epoch) -> Option<(Prayer, Epoch)> {
    schedule
        .available()
        .filter(|(_, t)| *t > now)
        .reduce(|best, entry| if entry.1 < best.1 { entry } else { best })
}

impl NextEventTracker {
    /// Builds an [TrackerStatus::Idle] tracker
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> TrackerStatus {
        self.status
    }

    /// Latest [NextEventState]
    pub fn state(&self) -> &NextEventState {
        &self.state
    }

    /// Currently tracked [PrayerSchedule]
    pub fn schedule(&self) -> Option<&PrayerSchedule> {
        self.today.as_ref()
    }

    /// Loads (or replaces) today's [PrayerSchedule], starts tracking.
    /// A previously loaded following day is kept only if it still follows.
    pub fn load(&mut self, schedule: PrayerSchedule) {
        if self.status == TrackerStatus::Stopped {
            return;
        }
        let next_date = schedule.date().next();
        if self
            .tomorrow
            .as_ref()
            .is_some_and(|tomorrow| tomorrow.date() != next_date)
        {
            self.tomorrow = None;
        }
        if self.requested.is_some_and(|date| date != next_date) {
            self.requested = None;
        }
        debug!("tracking {}", schedule);
        self.today = Some(schedule);
        self.status = TrackerStatus::Tracking;
    }

    /// Hands over the following day's [PrayerSchedule]
    pub fn load_next_day(&mut self, schedule: PrayerSchedule) {
        if self.status == TrackerStatus::Stopped {
            return;
        }
        debug!("next day {}", schedule);
        self.tomorrow = Some(schedule);
    }

    /// Back to [TrackerStatus::Idle] (location lost)
    pub fn unload(&mut self) {
        if self.status == TrackerStatus::Stopped {
            return;
        }
        self.today = None;
        self.tomorrow = None;
        self.requested = None;
        self.state = NextEventState::default();
        self.status = TrackerStatus::Idle;
    }

    /// Updates the [NextEventState] for this wall clock time.
    /// Returns a [NextDayRequest] the first time we roll over to a
    /// following day that was not loaded yet.
    pub fn tick(&mut self, now: Epoch) -> Option<NextDayRequest> {
        if self.status != TrackerStatus::Tracking {
            return None;
        }

        let today = self.today.as_ref()?;
        let mut request = None;

        let candidate = match earliest_after(today, now) {
            Some((prayer, instant)) => Some(NextEvent {
                prayer,
                instant,
                next_day: false,
            }),
            None => {
                let next_date = today.date().next();
                match self.tomorrow.as_ref() {
                    Some(tomorrow) => tomorrow.first_available().map(|(prayer, instant)| NextEvent {
                        prayer,
                        instant,
                        next_day: true,
                    }),
                    None => {
                        if self.requested != Some(next_date) {
                            info!("all events of {} have passed", today.date());
                            self.requested = Some(next_date);
                            request = Some(NextDayRequest { date: next_date });
                        }
                        // placeholder until the following day is loaded
                        today.first_available().map(|(prayer, instant)| NextEvent {
                            prayer,
                            instant: instant + 1.0 * Unit::Day,
                            next_day: true,
                        })
                    },
                }
            },
        };

        let remaining = match candidate {
            Some(candidate) => {
                let remaining = candidate.instant - now;
                if remaining < Duration::ZERO {
                    Duration::ZERO
                } else {
                    remaining
                }
            },
            None => Duration::ZERO,
        };

        self.state = NextEventState {
            candidate,
            remaining,
        };

        request
    }

    /// Tears the tracker down. Terminal: later calls have no effect.
    pub fn stop(&mut self) {
        if self.status != TrackerStatus::Stopped {
            debug!("next event tracker stopped");
        }
        self.status = TrackerStatus::Stopped;
        self.today = None;
        self.tomorrow = None;
        self.state = NextEventState::default();
    }
}
