use crate::prelude::{Error, Prayer};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How Isha is defined by a [Method].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IshaRule {
    /// Sun depression angle below the horizon (degrees)
    Angle(f64),
    /// Fixed interval after Maghrib (minutes)
    Interval(u32),
}

/// Parameters a [Method] stands for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MethodParameters {
    /// Fajr sun depression angle (degrees)
    pub fajr_angle: f64,
    /// Isha definition
    pub isha: IshaRule,
    /// Maghrib sun depression angle (degrees), when it differs from sunset.
    pub maghrib_angle: Option<f64>,
    /// Built-in adjustments, in minutes, indexed like [Prayer::ALL].
    pub adjustments: [i32; 6],
}

impl MethodParameters {
    const fn angles(fajr_angle: f64, isha_angle: f64) -> Self {
        Self {
            fajr_angle,
            isha: IshaRule::Angle(isha_angle),
            maghrib_angle: None,
            adjustments: [0; 6],
        }
    }

    const fn interval(fajr_angle: f64, isha_minutes: u32) -> Self {
        Self {
            fajr_angle,
            isha: IshaRule::Interval(isha_minutes),
            maghrib_angle: None,
            adjustments: [0; 6],
        }
    }

    const fn with_adjustments(mut self, adjustments: [i32; 6]) -> Self {
        self.adjustments = adjustments;
        self
    }

    const fn with_maghrib_angle(mut self, angle: f64) -> Self {
        self.maghrib_angle = Some(angle);
        self
    }

    /// Built-in adjustment for this [Prayer], in minutes.
    pub fn adjustment_minutes(&self, prayer: Prayer) -> i32 {
        self.adjustments[prayer.index()]
    }
}

/// Calculation method: historical twilight angle conventions
/// for Fajr and Isha. The solar model itself does not depend on it.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Method {
    /// Muslim World League: Fajr 18°, Isha 17°
    #[default]
    MuslimWorldLeague,
    /// Egyptian General Authority of Survey: Fajr 19.5°, Isha 17.5°
    Egyptian,
    /// University of Islamic Sciences, Karachi: Fajr 18°, Isha 18°
    Karachi,
    /// Umm al-Qura University, Makkah: Fajr 18.5°, Isha 90 min after Maghrib
    UmmAlQura,
    /// UAE: Fajr 18.2°, Isha 18.2°
    Dubai,
    /// Moonsighting Committee: Fajr 18°, Isha 18°
    MoonsightingCommittee,
    /// ISNA: Fajr 15°, Isha 15°
    NorthAmerica,
    /// Kuwait: Fajr 18°, Isha 17.5°
    Kuwait,
    /// Qatar: Fajr 18°, Isha 90 min after Maghrib
    Qatar,
    /// Singapore: Fajr 20°, Isha 18°
    Singapore,
    /// Institute of Geophysics, University of Tehran: Fajr 17.7°, Isha 14°, Maghrib 4.5°
    Tehran,
    /// Diyanet İşleri Başkanlığı: Fajr 18°, Isha 17°
    Turkey,
}

impl Method {
    pub const ALL: [Self; 12] = [
        Self::MuslimWorldLeague,
        Self::Egyptian,
        Self::Karachi,
        Self::UmmAlQura,
        Self::Dubai,
        Self::MoonsightingCommittee,
        Self::NorthAmerica,
        Self::Kuwait,
        Self::Qatar,
        Self::Singapore,
        Self::Tehran,
        Self::Turkey,
    ];

    /// [MethodParameters] of this [Method].
    /// Adjustments are [Fajr, Sunrise, Dhuhr, Asr, Maghrib, Isha] in minutes.
    pub const fn parameters(&self) -> MethodParameters {
        match self {
            Self::MuslimWorldLeague => {
                MethodParameters::angles(18.0, 17.0).with_adjustments([0, 0, 1, 0, 0, 0])
            },
            Self::Egyptian => {
                MethodParameters::angles(19.5, 17.5).with_adjustments([0, 0, 1, 0, 0, 0])
            },
            Self::Karachi => {
                MethodParameters::angles(18.0, 18.0).with_adjustments([0, 0, 1, 0, 0, 0])
            },
            Self::UmmAlQura => MethodParameters::interval(18.5, 90),
            Self::Dubai => {
                MethodParameters::angles(18.2, 18.2).with_adjustments([0, -3, 3, 3, 3, 0])
            },
            Self::MoonsightingCommittee => {
                MethodParameters::angles(18.0, 18.0).with_adjustments([0, 0, 5, 0, 3, 0])
            },
            Self::NorthAmerica => {
                MethodParameters::angles(15.0, 15.0).with_adjustments([0, 0, 1, 0, 0, 0])
            },
            Self::Kuwait => MethodParameters::angles(18.0, 17.5),
            Self::Qatar => MethodParameters::interval(18.0, 90),
            Self::Singapore => {
                MethodParameters::angles(20.0, 18.0).with_adjustments([0, 0, 1, 0, 0, 0])
            },
            Self::Tehran => MethodParameters::angles(17.7, 14.0).with_maghrib_angle(4.5),
            Self::Turkey => {
                MethodParameters::angles(18.0, 17.0).with_adjustments([0, -7, 5, 4, 7, 0])
            },
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::MuslimWorldLeague => write!(fmt, "MWL"),
            Self::Egyptian => write!(fmt, "Egyptian"),
            Self::Karachi => write!(fmt, "Karachi"),
            Self::UmmAlQura => write!(fmt, "UmmAlQura"),
            Self::Dubai => write!(fmt, "Dubai"),
            Self::MoonsightingCommittee => write!(fmt, "MoonsightingCommittee"),
            Self::NorthAmerica => write!(fmt, "ISNA"),
            Self::Kuwait => write!(fmt, "Kuwait"),
            Self::Qatar => write!(fmt, "Qatar"),
            Self::Singapore => write!(fmt, "Singapore"),
            Self::Tehran => write!(fmt, "Tehran"),
            Self::Turkey => write!(fmt, "Turkey"),
        }
    }
}

impl std::str::FromStr for Method {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mwl" | "muslimworldleague" | "muslim world league" => Ok(Self::MuslimWorldLeague),
            "egyptian" | "egypt" => Ok(Self::Egyptian),
            "karachi" => Ok(Self::Karachi),
            "ummalqura" | "umm al-qura" | "makkah" => Ok(Self::UmmAlQura),
            "dubai" => Ok(Self::Dubai),
            "moonsightingcommittee" | "moonsighting" => Ok(Self::MoonsightingCommittee),
            "isna" | "northamerica" | "north america" => Ok(Self::NorthAmerica),
            "kuwait" => Ok(Self::Kuwait),
            "qatar" => Ok(Self::Qatar),
            "singapore" => Ok(Self::Singapore),
            "tehran" => Ok(Self::Tehran),
            "turkey" | "diyanet" => Ok(Self::Turkey),
            _ => Err(Error::UnknownCalculationMethod),
        }
    }
}
