#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    constants::DEFAULT_TICK_INTERVAL_MS,
    prelude::{Duration, Epoch, Error, Prayer},
    time::local_utc_offset,
};

use hifitime::Unit;

mod method;
pub use method::{IshaRule, Method, MethodParameters};

/// Juristic school: selects the Asr shadow length factor.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Madhab {
    /// Asr when shadow length = object length + noon shadow
    #[default]
    Shafi,
    /// Asr when shadow length = twice the object length + noon shadow
    Hanafi,
}

impl Madhab {
    pub(crate) fn shadow_factor(&self) -> f64 {
        match self {
            Self::Shafi => 1.0,
            Self::Hanafi => 2.0,
        }
    }
}

impl std::fmt::Display for Madhab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Shafi => write!(f, "Shafi"),
            Self::Hanafi => write!(f, "Hanafi"),
        }
    }
}

impl std::str::FromStr for Madhab {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "shafi" | "standard" => Ok(Self::Shafi),
            "hanafi" => Ok(Self::Hanafi),
            _ => Err(Error::UnknownMadhab),
        }
    }
}

/// [HighLatitudeRule] bounds Fajr and Isha by a portion of the night,
/// for locations where twilight persists all night long.
/// Without rule, Fajr and Isha are reported as unavailable in that case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HighLatitudeRule {
    /// Fajr no earlier than half of the night before sunrise,
    /// Isha no later than half of the night after sunset.
    MiddleOfTheNight,
    /// Same as [HighLatitudeRule::MiddleOfTheNight], using a seventh of the night.
    SeventhOfTheNight,
    /// Portion of the night = twilight angle / 60.
    TwilightAngle,
}

impl HighLatitudeRule {
    /// Night portion for a twilight angle (degrees)
    pub(crate) fn night_portion(&self, angle: f64) -> f64 {
        match self {
            Self::MiddleOfTheNight => 1.0 / 2.0,
            Self::SeventhOfTheNight => 1.0 / 7.0,
            Self::TwilightAngle => angle / 60.0,
        }
    }
}

impl std::fmt::Display for HighLatitudeRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MiddleOfTheNight => write!(f, "MiddleOfTheNight"),
            Self::SeventhOfTheNight => write!(f, "SeventhOfTheNight"),
            Self::TwilightAngle => write!(f, "TwilightAngle"),
        }
    }
}

impl std::str::FromStr for HighLatitudeRule {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "middleofthenight" | "middle" => Ok(Self::MiddleOfTheNight),
            "seventhofthenight" | "seventh" => Ok(Self::SeventhOfTheNight),
            "twilightangle" | "angle" => Ok(Self::TwilightAngle),
            _ => Err(Error::UnknownHighLatitudeRule),
        }
    }
}

/// Rounding applied to the final instants.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Rounding {
    /// Nearest minute
    #[default]
    Nearest,
    /// Next minute
    Up,
    /// Keep seconds
    None,
}

impl std::str::FromStr for Rounding {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nearest" => Ok(Self::Nearest),
            "up" => Ok(Self::Up),
            "none" => Ok(Self::None),
            _ => Err(Error::UnknownRounding),
        }
    }
}

/// User adjustments, in minutes, added on top of the [Method] adjustments.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Adjustments {
    #[cfg_attr(feature = "serde", serde(default))]
    pub fajr: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub sunrise: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub dhuhr: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub asr: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub maghrib: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub isha: i32,
}

impl Adjustments {
    pub fn minutes(&self, prayer: Prayer) -> i32 {
        match prayer {
            Prayer::Fajr => self.fajr,
            Prayer::Sunrise => self.sunrise,
            Prayer::Dhuhr => self.dhuhr,
            Prayer::Asr => self.asr,
            Prayer::Maghrib => self.maghrib,
            Prayer::Isha => self.isha,
        }
    }
}

fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL_MS
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Calculation [Method] (twilight angles)
    #[cfg_attr(feature = "serde", serde(default))]
    pub method: Method,
    /// [Madhab] for Asr
    #[cfg_attr(feature = "serde", serde(default))]
    pub madhab: Madhab,
    /// Optional [HighLatitudeRule]. When not defined, Fajr and Isha
    /// are flagged unavailable whenever the sun does not reach the twilight angle.
    #[cfg_attr(feature = "serde", serde(default))]
    pub high_latitude_rule: Option<HighLatitudeRule>,
    /// [Rounding] of the final instants
    #[cfg_attr(feature = "serde", serde(default))]
    pub rounding: Rounding,
    /// User [Adjustments]
    #[cfg_attr(feature = "serde", serde(default))]
    pub adjustments: Adjustments,
    /// Offset of the local wall clock to UTC, in minutes.
    /// Only used to determine "today" and to display local times.
    /// When not defined, the system time zone applies.
    #[cfg_attr(feature = "serde", serde(default))]
    pub utc_offset_minutes: Option<i32>,
    /// Next event polling period, in milliseconds
    #[cfg_attr(feature = "serde", serde(default = "default_tick_interval_ms"))]
    pub tick_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            method: Method::default(),
            madhab: Madhab::default(),
            high_latitude_rule: None,
            rounding: Rounding::default(),
            adjustments: Adjustments::default(),
            utc_offset_minutes: None,
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl Config {
    /// Returns [Config] with desired calculation [Method]
    pub fn with_method(&self, method: Method) -> Self {
        let mut s = self.clone();
        s.method = method;
        s
    }

    /// Returns [Config] with desired [Madhab]
    pub fn with_madhab(&self, madhab: Madhab) -> Self {
        let mut s = self.clone();
        s.madhab = madhab;
        s
    }

    /// Returns [Config] with desired [HighLatitudeRule]
    pub fn with_high_latitude_rule(&self, rule: HighLatitudeRule) -> Self {
        let mut s = self.clone();
        s.high_latitude_rule = Some(rule);
        s
    }

    /// Returns [Config] with desired [Rounding]
    pub fn with_rounding(&self, rounding: Rounding) -> Self {
        let mut s = self.clone();
        s.rounding = rounding;
        s
    }

    /// Returns [Config] with desired user [Adjustments]
    pub fn with_adjustments(&self, adjustments: Adjustments) -> Self {
        let mut s = self.clone();
        s.adjustments = adjustments;
        s
    }

    /// Returns [Config] with a fixed local wall clock offset to UTC, in minutes,
    /// instead of the system time zone.
    pub fn with_utc_offset_minutes(&self, minutes: i32) -> Self {
        let mut s = self.clone();
        s.utc_offset_minutes = Some(minutes);
        s
    }

    /// Local wall clock offset to UTC, at that instant
    /// (the system time zone may observe daylight saving time).
    pub fn utc_offset_at(&self, t: Epoch) -> Duration {
        match self.utc_offset_minutes {
            Some(minutes) => f64::from(minutes) * Unit::Minute,
            None => local_utc_offset(t),
        }
    }

    /// Next event polling period
    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_interval_ms.max(1))
    }

    /// Total adjustment (method + user) for this [Prayer]
    pub(crate) fn adjustment(&self, prayer: Prayer) -> Duration {
        let minutes =
            self.method.parameters().adjustment_minutes(prayer) + self.adjustments.minutes(prayer);
        f64::from(minutes) * Unit::Minute
    }
}
