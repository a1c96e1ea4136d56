/// Earth mean radius (kilometers), spherical model
pub const EARTH_MEAN_RADIUS_KM: f64 = 6371.0;

/// Kaaba latitude (degrees)
pub const KAABA_LATITUDE_DEG: f64 = 21.4225;

/// Kaaba longitude (degrees)
pub const KAABA_LONGITUDE_DEG: f64 = 39.8262;

/// Sun depression at apparent sunrise and sunset (degrees):
/// atmospheric refraction + solar semi-diameter.
pub const SUNRISE_DEPRESSION_DEG: f64 = 0.833;

/// Julian day of the Unix epoch (1970-01-01T00:00:00 UTC)
pub const UNIX_EPOCH_JULIAN_DAY: f64 = 2440587.5;

/// Julian day of J2000.0
pub const J2000_JULIAN_DAY: f64 = 2451545.0;

/// Sun longitude rate (degrees per hour of solar time)
pub const DEGREES_PER_HOUR: f64 = 15.0;

/// Next event polling period (milliseconds)
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;
