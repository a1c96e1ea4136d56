//! Single owner of the prayer times and qibla state
use log::{debug, error, info, warn};

use crate::{
    compass::{BearingResult, HeadingSample, QiblaCompass},
    error::LocationFailure,
    prayer::Calculator,
    prelude::{Config, Date, Epoch, Error, GeoPoint, PrayerSchedule},
    solar::{SolarPosition, SolarRoutine},
    tracker::{NextEventState, NextEventTracker},
};

/// [Event]s delivered to the [Engine], one at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Periodic timer (one second by default)
    Tick,
    /// One shot location outcome
    Location(Result<GeoPoint, LocationFailure>),
    /// Location entered by the user, validated on delivery
    ManualLocation { latitude_deg: f64, longitude_deg: f64 },
    /// New device heading
    Heading(HeadingSample),
    /// Tears everything down. Terminal.
    Teardown,
}

/// Where the location currently stands
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LocationState {
    /// Still waiting on the provider
    #[default]
    Pending,
    Acquired(GeoPoint),
    /// Provider failed: no schedule, no qibla, until a manual location is set
    Unavailable(LocationFailure),
}

/// Everything a presentation layer needs, after each handled [Event].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub location: LocationState,
    pub schedule: Option<PrayerSchedule>,
    pub next_event: NextEventState,
    pub qibla: Option<BearingResult>,
    pub rotation_deg: Option<f64>,
    pub stopped: bool,
}

/// [Engine] owns the calculator, the [NextEventTracker] and the [QiblaCompass].
/// It is driven by explicit [Event]s and never blocks.
pub struct Engine<S: SolarRoutine = SolarPosition> {
    calculator: Calculator<S>,
    location: LocationState,
    tracker: NextEventTracker,
    compass: QiblaCompass,
    stopped: bool,
}

impl Engine<SolarPosition> {
    /// Builds a new [Engine] using our default [SolarPosition] model.
    pub fn new(cfg: Config) -> Self {
        Self::with_solar_routine(cfg, SolarPosition::default())
    }
}

impl<S: SolarRoutine> Engine<S> {
    /// Builds a new [Engine] using your own [SolarRoutine].
    pub fn with_solar_routine(cfg: Config, solar: S) -> Self {
        Self {
            calculator: Calculator::with_solar_routine(cfg, solar),
            location: LocationState::Pending,
            tracker: NextEventTracker::new(),
            compass: QiblaCompass::new(),
            stopped: false,
        }
    }

    pub fn config(&self) -> &Config {
        self.calculator.config()
    }

    /// Handles one [Event], at this wall clock time.
    /// Events are ignored once torn down.
    pub fn handle(&mut self, now: Epoch, event: Event) {
        if self.stopped {
            debug!("engine stopped: {:?} dropped", event);
            return;
        }
        match event {
            Event::Tick => self.tick(now),
            Event::Location(Ok(point)) => {
                info!("location acquired: {}", point);
                self.set_location(point, now);
            },
            Event::Location(Err(failure)) => {
                warn!("{}", Error::LocationUnavailable(failure));
                self.location = LocationState::Unavailable(failure);
                self.tracker.unload();
                self.compass.clear_location();
            },
            Event::ManualLocation {
                latitude_deg,
                longitude_deg,
            } => {
                // rejection is logged, current state is kept
                let _ = self.set_manual_location(latitude_deg, longitude_deg, now);
            },
            Event::Heading(sample) => self.compass.update_heading(sample),
            Event::Teardown => self.teardown(),
        }
    }

    /// Manually entered location, used when the provider is not available.
    /// Out of range coordinates are rejected and the current state is kept.
    pub fn set_manual_location(
        &mut self,
        latitude_deg: f64,
        longitude_deg: f64,
        now: Epoch,
    ) -> Result<(), Error> {
        let point = GeoPoint::new(latitude_deg, longitude_deg).map_err(|e| {
            error!("manual location rejected: {}", e);
            e
        })?;
        if !self.stopped {
            info!("manual location: {}", point);
            self.set_location(point, now);
        }
        Ok(())
    }

    /// Unsubscribes from every source and stops tracking. Terminal.
    pub fn teardown(&mut self) {
        if !self.stopped {
            info!("engine teardown");
        }
        self.tracker.stop();
        self.compass.teardown();
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn location(&self) -> &LocationState {
        &self.location
    }

    /// Current location, or why there is none.
    pub fn location_fix(&self) -> Result<GeoPoint, Error> {
        match self.location {
            LocationState::Acquired(point) => Ok(point),
            LocationState::Unavailable(failure) => Err(Error::LocationUnavailable(failure)),
            LocationState::Pending => Err(Error::LocationPending),
        }
    }

    /// Today's [PrayerSchedule], None until a location is known.
    pub fn prayer_schedule(&self) -> Option<&PrayerSchedule> {
        self.tracker.schedule()
    }

    pub fn next_event_state(&self) -> &NextEventState {
        self.tracker.state()
    }

    /// Qibla bearing and distance, None until a location is known.
    pub fn qibla(&self) -> Option<&BearingResult> {
        self.compass.bearing()
    }

    /// Compass display rotation, degrees (see [QiblaCompass::rotation_deg]).
    pub fn compass_rotation(&self) -> Option<f64> {
        self.compass.rotation_deg()
    }

    pub fn compass(&self) -> &QiblaCompass {
        &self.compass
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            location: self.location,
            schedule: self.prayer_schedule().cloned(),
            next_event: *self.next_event_state(),
            qibla: self.qibla().copied(),
            rotation_deg: self.compass_rotation(),
            stopped: self.stopped,
        }
    }

    fn today(&self, now: Epoch) -> Date {
        Date::from_epoch(now, self.config().utc_offset_at(now))
    }

    fn set_location(&mut self, point: GeoPoint, now: Epoch) {
        self.location = LocationState::Acquired(point);
        self.compass.update_location(&point);

        let schedule = self.calculator.schedule(&point, self.today(now));
        self.tracker.load(schedule);
        self.tick(now);
    }

    fn tick(&mut self, now: Epoch) {
        let LocationState::Acquired(point) = self.location else {
            return;
        };

        let today = self.today(now);
        if self
            .tracker
            .schedule()
            .is_some_and(|schedule| schedule.date() != today)
        {
            info!("new day: {}", today);
            let schedule = self.calculator.schedule(&point, today);
            self.tracker.load(schedule);
        }

        if let Some(request) = self.tracker.tick(now) {
            let schedule = self.calculator.schedule(&point, request.date);
            self.tracker.load_next_day(schedule);
            let _ = self.tracker.tick(now);
        }
    }
}
