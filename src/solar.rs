//! Solar position: instants at which the sun reaches a given altitude.
use log::debug;

use crate::{
    constants::{DEGREES_PER_HOUR, J2000_JULIAN_DAY, UNIX_EPOCH_JULIAN_DAY},
    geodesy::normalize_degrees,
    prelude::{Date, Epoch, GeoPoint},
};

use hifitime::Unit;

/// [SolarEvent] describes the sun configuration we're looking for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SolarEvent {
    /// Sun crossing the local meridian (solar noon)
    Transit,
    /// Sun `depression_deg` below the horizon, before transit
    Morning { depression_deg: f64 },
    /// Sun `depression_deg` below the horizon, after transit
    Evening { depression_deg: f64 },
    /// Afternoon instant when an object shadow equals
    /// `factor` times its length, plus its noon shadow
    AsrShadow { factor: f64 },
}

impl SolarEvent {
    /// First guess, in hours of local solar time
    fn local_guess_hours(&self) -> f64 {
        match self {
            Self::Transit => 12.0,
            Self::Morning { .. } => 6.0,
            Self::Evening { .. } => 18.0,
            Self::AsrShadow { .. } => 15.0,
        }
    }
}

/// [SolarRoutine] is the astronomical model the prayer calculator relies on.
/// Implement this to provide your own ephemerides.
pub trait SolarRoutine {
    /// Returns the UTC instant of this [SolarEvent], at this location,
    /// for this local calendar [Date]. Returns None when the sun never
    /// reaches the requested altitude that day (polar regions).
    fn solve(&self, point: &GeoPoint, date: Date, event: SolarEvent) -> Option<Epoch>;
}

/// Declination and equation of time, at a given Julian day
#[derive(Debug, Clone, Copy)]
struct SunState {
    declination_rad: f64,
    equation_of_time_h: f64,
}

impl SunState {
    /// Low precision solar coordinates (about 1 arcminute, 1950-2050),
    /// as published by the US Naval Observatory.
    fn at(julian_day: f64) -> Self {
        let d = julian_day - J2000_JULIAN_DAY;

        let mean_anomaly = normalize_degrees(357.529 + 0.98560028 * d).to_radians();
        let mean_longitude = normalize_degrees(280.459 + 0.98564736 * d);

        let ecliptic_longitude = normalize_degrees(
            mean_longitude
                + 1.915 * mean_anomaly.sin()
                + 0.020 * (2.0 * mean_anomaly).sin(),
        )
        .to_radians();

        let obliquity = (23.439 - 0.00000036 * d).to_radians();

        let right_ascension_h = normalize_degrees(
            (obliquity.cos() * ecliptic_longitude.sin())
                .atan2(ecliptic_longitude.cos())
                .to_degrees(),
        ) / DEGREES_PER_HOUR;

        let eqt_h = mean_longitude / DEGREES_PER_HOUR - right_ascension_h;

        Self {
            declination_rad: (obliquity.sin() * ecliptic_longitude.sin()).asin(),
            equation_of_time_h: eqt_h - 24.0 * (eqt_h / 24.0).round(),
        }
    }
}

/// Hour angle (in hours) at which the sun reaches `altitude_rad`.
fn hour_angle_hours(latitude_rad: f64, declination_rad: f64, altitude_rad: f64) -> Option<f64> {
    let cos_h = (altitude_rad.sin() - latitude_rad.sin() * declination_rad.sin())
        / (latitude_rad.cos() * declination_rad.cos());

    if cos_h.is_finite() && (-1.0..=1.0).contains(&cos_h) {
        Some(cos_h.acos().to_degrees() / DEGREES_PER_HOUR)
    } else {
        None
    }
}

/// Sun altitude when shadow = factor * length + noon shadow
fn asr_altitude_rad(factor: f64, latitude_rad: f64, declination_rad: f64) -> f64 {
    (1.0 / (factor + (latitude_rad - declination_rad).abs().tan())).atan()
}

/// [SolarPosition] is our default [SolarRoutine]: iterative solution
/// of the hour angle equation, using low precision solar coordinates.
#[derive(Debug, Clone, Copy)]
pub struct SolarPosition {
    iterations: usize,
}

impl Default for SolarPosition {
    fn default() -> Self {
        Self { iterations: 3 }
    }
}

impl SolarPosition {
    /// Builds [SolarPosition] with custom number of refinement iterations (at least 1).
    pub fn with_iterations(iterations: usize) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }
}

impl SolarRoutine for SolarPosition {
    fn solve(&self, point: &GeoPoint, date: Date, event: SolarEvent) -> Option<Epoch> {
        let midnight = date.midnight_utc();
        let julian_day_0 = midnight.to_unix_seconds() / 86400.0 + UNIX_EPOCH_JULIAN_DAY;

        let latitude_rad = point.latitude_deg().to_radians();
        let longitude_h = point.longitude_deg() / DEGREES_PER_HOUR;

        // UTC hours since midnight
        let mut t_h = event.local_guess_hours() - longitude_h;

        for _ in 0..self.iterations {
            let sun = SunState::at(julian_day_0 + t_h / 24.0);
            let transit_h = 12.0 - sun.equation_of_time_h - longitude_h;

            t_h = match event {
                SolarEvent::Transit => transit_h,
                SolarEvent::Morning { depression_deg } => {
                    let altitude_rad = (-depression_deg).to_radians();
                    transit_h - hour_angle_hours(latitude_rad, sun.declination_rad, altitude_rad)?
                },
                SolarEvent::Evening { depression_deg } => {
                    let altitude_rad = (-depression_deg).to_radians();
                    transit_h + hour_angle_hours(latitude_rad, sun.declination_rad, altitude_rad)?
                },
                SolarEvent::AsrShadow { factor } => {
                    let altitude_rad =
                        asr_altitude_rad(factor, latitude_rad, sun.declination_rad);
                    transit_h + hour_angle_hours(latitude_rad, sun.declination_rad, altitude_rad)?
                },
            };
        }

        debug!("{} {} - {:?}: {:.4}h UTC", date, point, event, t_h);
        Some(midnight + t_h * Unit::Hour)
    }
}
