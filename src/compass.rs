//! Qibla compass: target bearing fused with the device heading.
use log::debug;

use crate::{
    geodesy::{bearing, distance_km, normalize_degrees, CompassPoint, KAABA},
    prelude::GeoPoint,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Most recent device orientation reading, degrees clockwise from north, in [0, 360).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HeadingSample {
    degrees: f64,
}

impl HeadingSample {
    /// Builds a new [HeadingSample], any angle is wrapped into [0, 360).
    /// Returns None for non finite readings.
    pub fn new(degrees: f64) -> Option<Self> {
        if degrees.is_finite() {
            Some(Self {
                degrees: normalize_degrees(degrees),
            })
        } else {
            None
        }
    }

    /// Builds a [HeadingSample] from a device orientation `alpha` angle
    /// (counter clockwise rotation around the z axis).
    pub fn from_device_alpha(alpha_deg: f64) -> Option<Self> {
        Self::new(360.0 - alpha_deg)
    }

    pub fn degrees(&self) -> f64 {
        self.degrees
    }
}

/// Bearing and distance to the target.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BearingResult {
    /// Initial great circle bearing, in [0, 360)
    pub bearing_deg: f64,
    /// Great circle distance, in km
    pub distance_km: f64,
}

impl BearingResult {
    /// Bearing and distance from `from` to `to`
    pub fn between(from: &GeoPoint, to: &GeoPoint) -> Self {
        Self {
            bearing_deg: bearing(from, to),
            distance_km: distance_km(from, to),
        }
    }

    /// Closest 16-point [CompassPoint]
    pub fn compass_point(&self) -> CompassPoint {
        CompassPoint::from_bearing(self.bearing_deg)
    }
}

impl std::fmt::Display for BearingResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.1}° ({}) {:.0} km",
            self.bearing_deg,
            self.compass_point(),
            self.distance_km
        )
    }
}

/// [QiblaCompass] combines the static Qibla bearing (recomputed once per location)
/// with the latest [HeadingSample] (last write wins, no filtering).
#[derive(Debug, Clone)]
pub struct QiblaCompass {
    target: GeoPoint,
    bearing: Option<BearingResult>,
    heading: Option<HeadingSample>,
    subscribed: bool,
}

impl Default for QiblaCompass {
    fn default() -> Self {
        Self::with_target(KAABA)
    }
}

impl QiblaCompass {
    /// [QiblaCompass] pointing to the Kaaba
    pub fn new() -> Self {
        Self::default()
    }

    /// [QiblaCompass] pointing to any other target
    pub fn with_target(target: GeoPoint) -> Self {
        Self {
            target,
            bearing: None,
            heading: None,
            subscribed: true,
        }
    }

    pub fn target(&self) -> &GeoPoint {
        &self.target
    }

    /// New location: recomputes bearing and distance to the target.
    pub fn update_location(&mut self, location: &GeoPoint) -> BearingResult {
        let result = BearingResult::between(location, &self.target);
        debug!("qibla from {}: {}", location, result);
        self.bearing = Some(result);
        result
    }

    /// Location lost
    pub fn clear_location(&mut self) {
        self.bearing = None;
    }

    /// New device heading, supersedes the previous one.
    /// Ignored once torn down.
    pub fn update_heading(&mut self, sample: HeadingSample) {
        if self.subscribed {
            self.heading = Some(sample);
        }
    }

    /// Latest [BearingResult], None until a location is known
    pub fn bearing(&self) -> Option<&BearingResult> {
        self.bearing.as_ref()
    }

    /// Latest [HeadingSample], None if the sensor never reported
    pub fn heading(&self) -> Option<&HeadingSample> {
        self.heading.as_ref()
    }

    /// Display rotation (degrees, positive clockwise) = heading - target bearing.
    /// Without any heading sample, the device is assumed to point north
    /// and this is exactly -bearing. None until a location is known.
    pub fn rotation_deg(&self) -> Option<f64> {
        let bearing = self.bearing?;
        let heading = self.heading.map(|h| h.degrees()).unwrap_or(0.0);
        Some(heading - bearing.bearing_deg)
    }

    /// Direction of the target relative to the top of the device,
    /// clockwise, in [0, 360).
    pub fn needle_deg(&self) -> Option<f64> {
        self.rotation_deg()
            .map(|rotation| normalize_degrees(-rotation))
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    /// Unsubscribes from the heading stream. Terminal.
    pub fn teardown(&mut self) {
        self.subscribed = false;
        self.heading = None;
    }
}
