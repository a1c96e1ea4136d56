use thiserror::Error;

use crate::prelude::Prayer;

/// Reason why the location provider could not deliver a fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationFailure {
    /// User (or platform) refused access to the location service.
    PermissionDenied,
    /// The provider is present but could not determine a position.
    PositionUnavailable,
    /// No location provider on this platform.
    Unsupported,
}

impl std::fmt::Display for LocationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "permission denied"),
            Self::PositionUnavailable => write!(f, "position unavailable"),
            Self::Unsupported => write!(f, "unsupported"),
        }
    }
}

#[derive(Debug, PartialEq, Error)]
pub enum Error {
    /// Coordinates out of range (or not a number). Rejected before any computation.
    #[error("invalid location: latitude={0}° longitude={1}°")]
    InvalidLocation(f64, f64),

    /// Location provider denied or failed. The [Engine](crate::prelude::Engine)
    /// stays in a displayable "no data" state.
    #[error("location unavailable: {0}")]
    LocationUnavailable(LocationFailure),

    /// No location outcome yet: the provider has not answered.
    #[error("waiting for location")]
    LocationPending,

    /// The sun never reaches the requested depression on that day
    /// (polar regions close to the solstices). Only this [Prayer] is affected.
    #[error("{0}: solar calculation undefined")]
    SolarCalculationUndefined(Prayer),

    #[error("invalid calendar date")]
    InvalidDate,

    #[error("unknown calculation method")]
    UnknownCalculationMethod,

    #[error("unknown madhab")]
    UnknownMadhab,

    #[error("unknown high latitude rule")]
    UnknownHighLatitudeRule,

    #[error("unknown rounding policy")]
    UnknownRounding,

    #[error("unknown prayer")]
    UnknownPrayer,

    /// System time could not be determined.
    #[error("system clock error")]
    SystemClock,
}
