#![doc = include_str!("../README.md")]
#![cfg_attr(docrs, feature(doc_cfg))]

// private modules
mod cfg;
mod compass;
mod constants;
mod engine;
mod error;
mod geodesy;
mod prayer;
mod solar;
mod time;
mod tracker;

#[cfg(feature = "runtime")]
mod runtime;

#[cfg(test)]
mod tests;

// prelude
pub mod prelude {
    pub use crate::cfg::{
        Adjustments, Config, HighLatitudeRule, IshaRule, Madhab, Method, MethodParameters,
        Rounding,
    };
    pub use crate::compass::{BearingResult, HeadingSample, QiblaCompass};
    pub use crate::engine::{Engine, Event, LocationState, Snapshot};
    pub use crate::error::{Error, LocationFailure};
    pub use crate::geodesy::{
        bearing, distance_km, normalize_degrees, project, CompassPoint, GeoPoint, KAABA,
    };
    pub use crate::prayer::{Calculator, Prayer, PrayerEntry, PrayerSchedule};
    pub use crate::solar::{SolarEvent, SolarPosition, SolarRoutine};
    pub use crate::time::{local_utc_offset, Clock, Countdown, Date, LocalTime, SystemClock};
    pub use crate::tracker::{
        NextDayRequest, NextEvent, NextEventState, NextEventTracker, TrackerStatus,
    };

    #[cfg(feature = "runtime")]
    pub use crate::runtime::{run, Sources};

    // re-export
    pub use hifitime::{Duration, Epoch, TimeScale, Unit};
}

// pub export
pub use error::Error;
