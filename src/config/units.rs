//! Unit types for physical quantities.
//!
//! Provides type-safe representations of angles, angular rates and motor
//! steps to prevent unit confusion at compile time.

use serde::Deserialize;

use crate::error::ConfigError;

/// Sidereal rate in degrees per second (360° per sidereal day).
pub const SIDEREAL_DEG_PER_SEC: f64 = 360.0 / 86_164.0905;

/// Arcseconds per degree.
pub const ARCSEC_PER_DEG: f64 = 3600.0;

/// Angle in degrees.
///
/// Used for configuration and the user-facing API. Axis positions are
/// converted to [`Steps`] at the axis boundary.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[serde(transparent)]
pub struct Degrees(pub f64);

impl Degrees {
    /// Create from arcseconds.
    #[inline]
    pub fn from_arcsec(arcsec: f64) -> Self {
        Self(arcsec / ARCSEC_PER_DEG)
    }

    /// The angle in arcseconds.
    #[inline]
    pub fn to_arcsec(self) -> f64 {
        self.0 * ARCSEC_PER_DEG
    }
}

/// Angular velocity in degrees per second.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[serde(transparent)]
pub struct DegreesPerSec(pub f64);

impl DegreesPerSec {
    /// Express this rate as a multiple of the sidereal rate.
    #[inline]
    pub fn as_sidereal(self) -> f64 {
        self.0 / SIDEREAL_DEG_PER_SEC
    }
}

/// Axis position in steps (absolute from the power-on origin).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Steps(pub i64);

impl Steps {
    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> i64 {
        self.0
    }
}

/// Microstep divisor (1, 2, 4, 8, 16, 32, 64, 128, 256).
///
/// Validated at construction to be a power of 2 within the valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Microsteps(u16);

impl Microsteps {
    /// Full step (no microstepping).
    pub const FULL: Self = Self(1);
    /// Sixteenth step.
    pub const SIXTEENTH: Self = Self(16);
    /// Thirty-second step.
    pub const THIRTY_SECOND: Self = Self(32);

    /// Valid microstep values.
    const VALID_VALUES: [u16; 9] = [1, 2, 4, 8, 16, 32, 64, 128, 256];

    /// Create a new Microsteps value with validation.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidMicrosteps` if the value is not a valid power of 2.
    pub fn new(value: u16) -> Result<Self, ConfigError> {
        if Self::VALID_VALUES.contains(&value) {
            Ok(Self(value))
        } else {
            Err(ConfigError::InvalidMicrosteps(value))
        }
    }

    /// Get the raw divisor value.
    #[inline]
    pub const fn value(self) -> u16 {
        self.0
    }
}

impl Default for Microsteps {
    fn default() -> Self {
        Self::FULL
    }
}

impl TryFrom<u16> for Microsteps {
    type Error = ConfigError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for Microsteps {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use core::fmt::Write;
        let value = u16::deserialize(deserializer)?;
        Microsteps::new(value).map_err(|e| {
            let mut buf = heapless::String::<128>::new();
            let _ = write!(buf, "{}", e);
            serde::de::Error::custom(buf.as_str())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_microsteps_valid_values() {
        for &v in &Microsteps::VALID_VALUES {
            assert!(Microsteps::new(v).is_ok());
        }
    }

    #[test]
    fn test_microsteps_invalid_values() {
        assert!(Microsteps::new(0).is_err());
        assert!(Microsteps::new(3).is_err());
        assert!(Microsteps::new(512).is_err());
    }

    #[test]
    fn test_arcsec_round_trip() {
        let d = Degrees::from_arcsec(90.0);
        assert!((d.0 - 0.025).abs() < 1e-12);
        assert!((d.to_arcsec() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_sidereal_multiple() {
        let rate = DegreesPerSec(SIDEREAL_DEG_PER_SEC * 20.0);
        assert!((rate.as_sidereal() - 20.0).abs() < 1e-9);
    }
}
