//! Daily prayer schedule
use itertools::Itertools;
use log::{debug, warn};

use crate::{
    cfg::{Config, IshaRule, Rounding},
    constants::SUNRISE_DEPRESSION_DEG,
    prelude::{Clock, Date, Duration, Epoch, Error, GeoPoint, LocalTime},
    solar::{SolarEvent, SolarPosition, SolarRoutine},
};

use hifitime::Unit;

/// The six daily events, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Prayer {
    Fajr,
    /// Not a prayer, but marks the end of Fajr
    Sunrise,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl Prayer {
    pub const ALL: [Self; 6] = [
        Self::Fajr,
        Self::Sunrise,
        Self::Dhuhr,
        Self::Asr,
        Self::Maghrib,
        Self::Isha,
    ];

    /// Position in the canonical order
    pub const fn index(&self) -> usize {
        match self {
            Self::Fajr => 0,
            Self::Sunrise => 1,
            Self::Dhuhr => 2,
            Self::Asr => 3,
            Self::Maghrib => 4,
            Self::Isha => 5,
        }
    }

    /// False for [Prayer::Sunrise]
    pub fn is_prayer(&self) -> bool {
        *self != Self::Sunrise
    }
}

impl std::fmt::Display for Prayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fajr => write!(f, "Fajr"),
            Self::Sunrise => write!(f, "Sunrise"),
            Self::Dhuhr => write!(f, "Dhuhr"),
            Self::Asr => write!(f, "Asr"),
            Self::Maghrib => write!(f, "Maghrib"),
            Self::Isha => write!(f, "Isha"),
        }
    }
}

impl std::str::FromStr for Prayer {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fajr" => Ok(Self::Fajr),
            "sunrise" => Ok(Self::Sunrise),
            "dhuhr" | "zuhr" => Ok(Self::Dhuhr),
            "asr" => Ok(Self::Asr),
            "maghrib" => Ok(Self::Maghrib),
            "isha" => Ok(Self::Isha),
            _ => Err(Error::UnknownPrayer),
        }
    }
}

/// One (label, instant) pair of a [PrayerSchedule].
/// The instant is missing when the solar calculation is undefined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrayerEntry {
    pub prayer: Prayer,
    instant: Option<Epoch>,
}

impl std::fmt::Display for PrayerEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.instant {
            Some(t) => write!(f, "{}: {}", self.prayer, t),
            None => write!(f, "{}: unavailable", self.prayer),
        }
    }
}

impl PrayerEntry {
    /// UTC instant, or [Error::SolarCalculationUndefined]
    pub fn instant(&self) -> Result<Epoch, Error> {
        self.instant
            .ok_or(Error::SolarCalculationUndefined(self.prayer))
    }

    pub fn is_available(&self) -> bool {
        self.instant.is_some()
    }

    /// True once this (available) entry is in the past
    pub fn has_passed(&self, now: Epoch) -> bool {
        self.instant.is_some_and(|t| t <= now)
    }

    /// Wall clock time of this entry
    pub fn local_time(&self, utc_offset: Duration) -> Option<LocalTime> {
        self.instant
            .map(|t| LocalTime::from_epoch(t, utc_offset))
    }
}

/// The six canonical entries of one calendar day.
/// Available instants are strictly increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct PrayerSchedule {
    date: Date,
    entries: [PrayerEntry; 6],
}

impl std::fmt::Display for PrayerSchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.date)?;
        for entry in self.entries.iter() {
            write!(f, " | {}", entry)?;
        }
        Ok(())
    }
}

impl PrayerSchedule {
    /// Builds a [PrayerSchedule] from instants given in canonical order
    /// ([Prayer::ALL]). Any instant that does not strictly follow the
    /// previous available one is flagged unavailable.
    pub fn new(date: Date, instants: [Option<Epoch>; 6]) -> Self {
        let mut last: Option<Epoch> = None;
        let mut entries = [PrayerEntry {
            prayer: Prayer::Fajr,
            instant: None,
        }; 6];

        for (i, prayer) in Prayer::ALL.iter().enumerate() {
            let mut instant = instants[i];
            if let (Some(t), Some(prev)) = (instant, last) {
                if t <= prev {
                    warn!("{} - {} ({}) breaks daily order: discarded", date, prayer, t);
                    instant = None;
                }
            }
            if instant.is_some() {
                last = instant;
            }
            entries[i] = PrayerEntry {
                prayer: *prayer,
                instant,
            };
        }

        Self { date, entries }
    }

    pub fn date(&self) -> Date {
        self.date
    }

    /// All six entries, in canonical order
    pub fn entries(&self) -> &[PrayerEntry] {
        &self.entries
    }

    pub fn entry(&self, prayer: Prayer) -> &PrayerEntry {
        &self.entries[prayer.index()]
    }

    /// Available entries only, in canonical order
    pub fn available(&self) -> impl Iterator<Item = (Prayer, Epoch)> + '_ {
        self.entries
            .iter()
            .filter_map(|entry| entry.instant.map(|t| (entry.prayer, t)))
    }

    /// Entries whose solar calculation is undefined
    pub fn unavailable(&self) -> impl Iterator<Item = Prayer> + '_ {
        self.entries
            .iter()
            .filter(|entry| !entry.is_available())
            .map(|entry| entry.prayer)
    }

    /// First available entry of the day
    pub fn first_available(&self) -> Option<(Prayer, Epoch)> {
        self.available().next()
    }

    pub fn is_complete(&self) -> bool {
        self.entries.iter().all(|entry| entry.is_available())
    }

    /// True when available instants are strictly increasing
    pub fn is_strictly_increasing(&self) -> bool {
        self.available()
            .tuple_windows()
            .all(|((_, t0), (_, t1))| t0 < t1)
    }
}

fn round_instant(t: Epoch, rounding: Rounding) -> Epoch {
    let unix_minutes = t.to_unix_seconds() / 60.0;
    match rounding {
        Rounding::None => t,
        Rounding::Nearest => Epoch::from_unix_seconds(unix_minutes.round() * 60.0),
        Rounding::Up => Epoch::from_unix_seconds(unix_minutes.ceil() * 60.0),
    }
}

/// [Calculator] orchestrates the [SolarRoutine] to form a [PrayerSchedule].
pub struct Calculator<S: SolarRoutine = SolarPosition> {
    cfg: Config,
    solar: S,
}

impl Calculator<SolarPosition> {
    /// Builds a [Calculator] using our default [SolarPosition] model.
    pub fn new(cfg: Config) -> Self {
        Self::with_solar_routine(cfg, SolarPosition::default())
    }
}

impl<S: SolarRoutine> Calculator<S> {
    /// Builds a [Calculator] using your own [SolarRoutine].
    pub fn with_solar_routine(cfg: Config, solar: S) -> Self {
        Self { cfg, solar }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// [PrayerSchedule] from raw coordinates, rejected with
    /// [Error::InvalidLocation] when out of range.
    pub fn schedule_at(
        &self,
        latitude_deg: f64,
        longitude_deg: f64,
        date: Date,
    ) -> Result<PrayerSchedule, Error> {
        let point = GeoPoint::new(latitude_deg, longitude_deg)?;
        Ok(self.schedule(&point, date))
    }

    /// [PrayerSchedule] for today, as seen on the local wall clock.
    pub fn schedule_today<C: Clock>(
        &self,
        point: &GeoPoint,
        clock: &C,
    ) -> Result<PrayerSchedule, Error> {
        let now = clock.now()?;
        let today = Date::from_epoch(now, self.cfg.utc_offset_at(now));
        Ok(self.schedule(point, today))
    }

    /// Computes the [PrayerSchedule] at this location, for this local [Date].
    /// Entries the sun does not allow are flagged unavailable
    /// (see [Error::SolarCalculationUndefined]): this never fails as a whole.
    pub fn schedule(&self, point: &GeoPoint, date: Date) -> PrayerSchedule {
        let params = self.cfg.method.parameters();

        let solve = |event: SolarEvent| self.solar.solve(point, date, event);

        let mut fajr = solve(SolarEvent::Morning {
            depression_deg: params.fajr_angle,
        });

        let sunrise = solve(SolarEvent::Morning {
            depression_deg: SUNRISE_DEPRESSION_DEG,
        });

        let dhuhr = solve(SolarEvent::Transit);

        let asr = solve(SolarEvent::AsrShadow {
            factor: self.cfg.madhab.shadow_factor(),
        });

        let sunset = solve(SolarEvent::Evening {
            depression_deg: SUNRISE_DEPRESSION_DEG,
        });

        let maghrib = match params.maghrib_angle {
            Some(angle) => solve(SolarEvent::Evening {
                depression_deg: angle,
            }),
            None => sunset,
        };

        let mut isha = match params.isha {
            IshaRule::Angle(angle) => solve(SolarEvent::Evening {
                depression_deg: angle,
            }),
            IshaRule::Interval(minutes) => maghrib.map(|t| t + f64::from(minutes) * Unit::Minute),
        };

        if let Some(rule) = self.cfg.high_latitude_rule {
            if let (Some(sunrise), Some(sunset)) = (sunrise, sunset) {
                // approximated by today's sunrise, one day later
                let night = sunrise + 1.0 * Unit::Day - sunset;

                let safe_fajr = sunrise - night * rule.night_portion(params.fajr_angle);
                fajr = match fajr {
                    Some(t) if t >= safe_fajr => Some(t),
                    _ => {
                        debug!("{} - {}: fajr bounded by {}", date, point, rule);
                        Some(safe_fajr)
                    },
                };

                if let IshaRule::Angle(angle) = params.isha {
                    let safe_isha = sunset + night * rule.night_portion(angle);
                    isha = match isha {
                        Some(t) if t <= safe_isha => Some(t),
                        _ => {
                            debug!("{} - {}: isha bounded by {}", date, point, rule);
                            Some(safe_isha)
                        },
                    };
                }
            }
        }

        let mut instants = [fajr, sunrise, dhuhr, asr, maghrib, isha];

        for (prayer, instant) in Prayer::ALL.iter().zip(instants.iter_mut()) {
            match instant {
                Some(t) => {
                    *t = round_instant(*t + self.cfg.adjustment(*prayer), self.cfg.rounding);
                },
                None => {
                    warn!(
                        "{} - {}: {}",
                        date,
                        point,
                        Error::SolarCalculationUndefined(*prayer)
                    );
                },
            }
        }

        let schedule = PrayerSchedule::new(date, instants);
        debug!("{} ({}): {}", point, self.cfg.method, schedule);
        schedule
    }
}
