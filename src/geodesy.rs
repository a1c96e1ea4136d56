//! Great-circle geometry over a spherical Earth.
use crate::{
    constants::{EARTH_MEAN_RADIUS_KM, KAABA_LATITUDE_DEG, KAABA_LONGITUDE_DEG},
    error::Error,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The Kaaba, in Makkah: fixed Qibla target.
pub const KAABA: GeoPoint = GeoPoint::from_degrees_unchecked(KAABA_LATITUDE_DEG, KAABA_LONGITUDE_DEG);

/// [GeoPoint] is an immutable (latitude, longitude) pair, in degrees.
/// Coordinates are validated once, at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "(f64, f64)", into = "(f64, f64)"))]
pub struct GeoPoint {
    latitude_deg: f64,
    longitude_deg: f64,
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}°, {:.4}°)", self.latitude_deg, self.longitude_deg)
    }
}

impl TryFrom<(f64, f64)> for GeoPoint {
    type Error = Error;
    fn try_from(value: (f64, f64)) -> Result<Self, Self::Error> {
        Self::new(value.0, value.1)
    }
}

impl From<GeoPoint> for (f64, f64) {
    fn from(point: GeoPoint) -> Self {
        (point.latitude_deg, point.longitude_deg)
    }
}

impl GeoPoint {
    /// Builds a new [GeoPoint] from latitude ∈ [-90, 90] and
    /// longitude ∈ [-180, 180], both in degrees.
    pub fn new(latitude_deg: f64, longitude_deg: f64) -> Result<Self, Error> {
        // NaN fails both range checks
        if !(-90.0..=90.0).contains(&latitude_deg) || !(-180.0..=180.0).contains(&longitude_deg) {
            return Err(Error::InvalidLocation(latitude_deg, longitude_deg));
        }
        Ok(Self::from_degrees_unchecked(latitude_deg, longitude_deg))
    }

    pub(crate) const fn from_degrees_unchecked(latitude_deg: f64, longitude_deg: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
        }
    }

    pub fn latitude_deg(&self) -> f64 {
        self.latitude_deg
    }

    pub fn longitude_deg(&self) -> f64 {
        self.longitude_deg
    }

    /// Initial bearing from [Self] to other [GeoPoint], see [bearing].
    pub fn bearing_to(&self, other: &GeoPoint) -> f64 {
        bearing(self, other)
    }

    /// Great circle distance from [Self] to other [GeoPoint], see [distance_km].
    pub fn distance_km_to(&self, other: &GeoPoint) -> f64 {
        distance_km(self, other)
    }
}

/// Wraps any angle into [0, 360).
/// Same result as `((x % 360) + 360) % 360`, without the double rounding
/// that would break idempotence for tiny positive inputs.
/// Non finite input returns NaN.
pub fn normalize_degrees(x: f64) -> f64 {
    let wrapped = x.rem_euclid(360.0);
    // -1E-15 wraps to 360.0 after rounding
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Initial great circle bearing from `from` to `to`, in degrees
/// (0 = true north, clockwise), always in [0, 360).
///
/// Identical points (or both points on the same pole) have no defined bearing:
/// the formula reduces to atan2(0, 0) and we return 0.0 (north).
pub fn bearing(from: &GeoPoint, to: &GeoPoint) -> f64 {
    let lat_from = from.latitude_deg.to_radians();
    let lat_to = to.latitude_deg.to_radians();
    let delta_lon = (to.longitude_deg - from.longitude_deg).to_radians();

    let y = delta_lon.sin() * lat_to.cos();
    let x = lat_from.cos() * lat_to.sin() - lat_from.sin() * lat_to.cos() * delta_lon.cos();

    let bearing = y.atan2(x).to_degrees();
    if bearing.is_finite() {
        normalize_degrees(bearing)
    } else {
        0.0
    }
}

/// Haversine great circle distance between two points, in kilometers.
/// Read more here: https://en.wikipedia.org/wiki/Haversine_formula
pub fn distance_km(from: &GeoPoint, to: &GeoPoint) -> f64 {
    let lat_from = from.latitude_deg.to_radians();
    let lat_to = to.latitude_deg.to_radians();
    let delta_lat = (to.latitude_deg - from.latitude_deg).to_radians();
    let delta_lon = (to.longitude_deg - from.longitude_deg).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat_from.cos() * lat_to.cos() * (delta_lon / 2.0).sin().powi(2);

    // rounding may push antipodal points slightly above 1
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_MEAN_RADIUS_KM * c
}

/// Projects `from` along the great circle of initial `bearing_deg`
/// for `distance_km`, returns the destination point.
pub fn project(from: &GeoPoint, bearing_deg: f64, distance_km: f64) -> GeoPoint {
    let lat1 = from.latitude_deg.to_radians();
    let lon1 = from.longitude_deg.to_radians();
    let brng = bearing_deg.to_radians();
    let angular_distance = distance_km / EARTH_MEAN_RADIUS_KM;

    let lat2 = (lat1.sin() * angular_distance.cos()
        + lat1.cos() * angular_distance.sin() * brng.cos())
    .asin();

    let lon2 = lon1
        + (brng.sin() * angular_distance.sin() * lat1.cos())
            .atan2(angular_distance.cos() - lat1.sin() * lat2.sin());

    let lon2_deg = normalize_degrees(lon2.to_degrees() + 180.0) - 180.0;

    GeoPoint::from_degrees_unchecked(lat2.to_degrees().clamp(-90.0, 90.0), lon2_deg)
}

/// 16-point compass rose.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompassPoint {
    N,
    NNE,
    NE,
    ENE,
    E,
    ESE,
    SE,
    SSE,
    S,
    SSW,
    SW,
    WSW,
    W,
    WNW,
    NW,
    NNW,
}

impl std::fmt::Display for CompassPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl CompassPoint {
    const ROSE: [Self; 16] = [
        Self::N,
        Self::NNE,
        Self::NE,
        Self::ENE,
        Self::E,
        Self::ESE,
        Self::SE,
        Self::SSE,
        Self::S,
        Self::SSW,
        Self::SW,
        Self::WSW,
        Self::W,
        Self::WNW,
        Self::NW,
        Self::NNW,
    ];

    /// Closest [CompassPoint] for this bearing (any angle, normalized internally).
    /// Each point covers 22.5°.
    pub fn from_bearing(bearing_deg: f64) -> Self {
        let normalized = normalize_degrees(bearing_deg);
        if !normalized.is_finite() {
            return Self::N;
        }
        let index = ((normalized + 11.25) / 22.5) as usize % 16;
        Self::ROSE[index]
    }

    pub fn name(&self) -> &str {
        match self {
            Self::N => "north",
            Self::NNE => "north-northeast",
            Self::NE => "northeast",
            Self::ENE => "east-northeast",
            Self::E => "east",
            Self::ESE => "east-southeast",
            Self::SE => "southeast",
            Self::SSE => "south-southeast",
            Self::S => "south",
            Self::SSW => "south-southwest",
            Self::SW => "southwest",
            Self::WSW => "west-southwest",
            Self::W => "west",
            Self::WNW => "west-northwest",
            Self::NW => "northwest",
            Self::NNW => "north-northwest",
        }
    }
}
