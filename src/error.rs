//! Error types for mount-motion.
//!
//! Provides unified error handling across configuration loading and the mount
//! command contract.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Result of a mount command.
pub type CommandResult<T = ()> = core::result::Result<T, CommandError>;

/// Unified error type for all mount-motion operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Mount command rejected
    Command(CommandError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Invalid microstep value (must be power of 2: 1, 2, 4, 8, 16, 32, 64, 128, 256)
    InvalidMicrosteps(u16),
    /// Invalid gear ratio (must be > 0)
    InvalidGearRatio(f64),
    /// Invalid slew rate (must be > 0)
    InvalidSlewRate(f64),
    /// Invalid axis travel limits (min must be < max)
    InvalidAxisLimits {
        /// Axis number (1 or 2)
        axis: u8,
        /// Minimum limit value in degrees
        min: f64,
        /// Maximum limit value in degrees
        max: f64,
    },
    /// Invalid altitude limits (min must be < max, both within ±90°)
    InvalidAltitudeLimits {
        /// Minimum altitude in degrees
        min: f64,
        /// Maximum altitude in degrees
        max: f64,
    },
    /// Meridian allowance outside 0..=90 degrees
    InvalidMeridianAllowance(f64),
    /// Custom guide rate must be > 0
    InvalidGuideRate(f64),
    /// PEC worm period must be 1..=1024 seconds
    InvalidWormPeriod(u32),
    /// Site latitude or longitude out of range
    InvalidSite {
        /// Latitude in degrees
        latitude: f64,
        /// Longitude in degrees
        longitude: f64,
    },
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Command rejections surfaced through the mount command contract.
///
/// Validation failures are returned synchronously and never mutate mount
/// state. Failures discovered after a command was accepted are reported
/// through status instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// No reference alignment exists and one is required
    Alignment,
    /// Target altitude below the minimum altitude limit
    BelowHorizon,
    /// Target altitude above the maximum altitude limit
    AboveOverhead,
    /// Axis1 travel or east meridian limit exceeded
    LimitEast,
    /// Axis1 travel or west meridian limit exceeded
    LimitWest,
    /// Axis2 upper travel limit exceeded
    LimitNorth,
    /// Axis2 lower travel limit exceeded
    LimitSouth,
    /// A goto is already in progress
    GotoInProgress,
    /// Last park failed; reset required
    ParkFailed,
    /// A park is in progress
    ParkInProgress,
    /// Mount is not parked
    NotParked,
    /// Mount is parked
    Parked,
    /// Guiding is rejected while a goto is in progress
    GuideDuringGoto,
    /// A pulse guide is running and cannot be interrupted
    GuideBusy,
    /// Time and location are not yet available
    TimeLocationNotReady,
    /// PEC transition not allowed from the current state
    PecTransition,
    /// PEC playback requested without recorded data
    PecNotRecorded,
    /// Capability disabled in configuration
    Unsupported,
    /// A latched general fault must be reset first
    Fault,
    /// Parameter missing or out of range
    ParameterRange,
    /// Unknown command code
    UnknownCommand,
}

impl CommandError {
    /// Stable numeric code for the command contract. Zero means success.
    pub const fn code(self) -> u8 {
        match self {
            CommandError::Alignment => 1,
            CommandError::BelowHorizon => 2,
            CommandError::AboveOverhead => 3,
            CommandError::LimitEast => 4,
            CommandError::LimitWest => 5,
            CommandError::LimitNorth => 6,
            CommandError::LimitSouth => 7,
            CommandError::GotoInProgress => 8,
            CommandError::ParkFailed => 9,
            CommandError::ParkInProgress => 10,
            CommandError::NotParked => 11,
            CommandError::Parked => 12,
            CommandError::GuideDuringGoto => 13,
            CommandError::GuideBusy => 14,
            CommandError::TimeLocationNotReady => 15,
            CommandError::PecTransition => 16,
            CommandError::PecNotRecorded => 17,
            CommandError::Unsupported => 18,
            CommandError::Fault => 19,
            CommandError::ParameterRange => 20,
            CommandError::UnknownCommand => 21,
        }
    }

    /// True for the axis travel / meridian limit family.
    pub const fn is_limit(self) -> bool {
        matches!(
            self,
            CommandError::LimitEast
                | CommandError::LimitWest
                | CommandError::LimitNorth
                | CommandError::LimitSouth
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Command(e) => write!(f, "Command rejected: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidMicrosteps(v) => {
                write!(f, "Invalid microsteps: {}. Valid values: 1, 2, 4, 8, 16, 32, 64, 128, 256", v)
            }
            ConfigError::InvalidGearRatio(v) => write!(f, "Invalid gear ratio: {}. Must be > 0", v),
            ConfigError::InvalidSlewRate(v) => write!(f, "Invalid slew rate: {}. Must be > 0", v),
            ConfigError::InvalidAxisLimits { axis, min, max } => {
                write!(f, "Invalid axis{} limits: min ({}) must be < max ({})", axis, min, max)
            }
            ConfigError::InvalidAltitudeLimits { min, max } => {
                write!(f, "Invalid altitude limits: min ({}) must be < max ({}) within ±90", min, max)
            }
            ConfigError::InvalidMeridianAllowance(v) => {
                write!(f, "Invalid meridian allowance: {}. Must be 0-90 degrees", v)
            }
            ConfigError::InvalidGuideRate(v) => write!(f, "Invalid guide rate: {}. Must be > 0", v),
            ConfigError::InvalidWormPeriod(v) => write!(f, "Invalid worm period: {} s. Must be 1-1024", v),
            ConfigError::InvalidSite { latitude, longitude } => {
                write!(f, "Invalid site: latitude {} longitude {}", latitude, longitude)
            }
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            CommandError::Alignment => "alignment not ready",
            CommandError::BelowHorizon => "target below horizon limit",
            CommandError::AboveOverhead => "target above overhead limit",
            CommandError::LimitEast => "east limit exceeded",
            CommandError::LimitWest => "west limit exceeded",
            CommandError::LimitNorth => "north limit exceeded",
            CommandError::LimitSouth => "south limit exceeded",
            CommandError::GotoInProgress => "goto in progress",
            CommandError::ParkFailed => "park failed",
            CommandError::ParkInProgress => "park in progress",
            CommandError::NotParked => "not parked",
            CommandError::Parked => "parked",
            CommandError::GuideDuringGoto => "guide rejected during goto",
            CommandError::GuideBusy => "pulse guide in progress",
            CommandError::TimeLocationNotReady => "time/location not ready",
            CommandError::PecTransition => "PEC transition not allowed",
            CommandError::PecNotRecorded => "no PEC data recorded",
            CommandError::Unsupported => "not supported",
            CommandError::Fault => "general fault latched",
            CommandError::ParameterRange => "parameter out of range",
            CommandError::UnknownCommand => "unknown command",
        };
        write!(f, "{} (code {})", msg, self.code())
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<CommandError> for Error {
    fn from(e: CommandError) -> Self {
        Error::Command(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for CommandError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_codes_unique() {
        let all = [
            CommandError::Alignment,
            CommandError::BelowHorizon,
            CommandError::AboveOverhead,
            CommandError::LimitEast,
            CommandError::LimitWest,
            CommandError::LimitNorth,
            CommandError::LimitSouth,
            CommandError::GotoInProgress,
            CommandError::ParkFailed,
            CommandError::ParkInProgress,
            CommandError::NotParked,
            CommandError::Parked,
            CommandError::GuideDuringGoto,
            CommandError::GuideBusy,
            CommandError::TimeLocationNotReady,
            CommandError::PecTransition,
            CommandError::PecNotRecorded,
            CommandError::Unsupported,
            CommandError::Fault,
            CommandError::ParameterRange,
            CommandError::UnknownCommand,
        ];
        for (i, a) in all.iter().enumerate() {
            assert_ne!(a.code(), 0);
            for b in &all[i + 1..] {
                assert_ne!(a.code(), b.code());
            }
        }
    }

    #[test]
    fn test_limit_family() {
        assert!(CommandError::LimitNorth.is_limit());
        assert!(!CommandError::BelowHorizon.is_limit());
    }
}
