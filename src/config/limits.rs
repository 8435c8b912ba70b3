//! Limit configuration and the runtime limit set.

use serde::Deserialize;

use super::mount::MountConfig;
use super::units::Degrees;

/// Mechanical travel of one axis in instrument degrees (from configuration).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct AxisTravel {
    /// Minimum allowed instrument angle in degrees.
    #[serde(rename = "min_degrees")]
    pub min: Degrees,

    /// Maximum allowed instrument angle in degrees.
    #[serde(rename = "max_degrees")]
    pub max: Degrees,
}

impl AxisTravel {
    /// Create new axis travel limits.
    pub const fn new(min: Degrees, max: Degrees) -> Self {
        Self { min, max }
    }

    /// Check if limits are valid (min < max).
    pub fn is_valid(&self) -> bool {
        self.min.0 < self.max.0
    }

    /// Check if an instrument angle is within travel.
    pub fn contains(&self, angle: f64) -> bool {
        angle >= self.min.0 && angle <= self.max.0
    }
}

/// Default axis1 travel: a half turn either side of the counterweight-down position.
pub const DEFAULT_AXIS1_TRAVEL: AxisTravel = AxisTravel::new(Degrees(-180.0), Degrees(180.0));

/// Default axis2 travel: both pier sides, pole to pole.
pub const DEFAULT_AXIS2_TRAVEL: AxisTravel = AxisTravel::new(Degrees(-90.0), Degrees(270.0));

/// Horizon, overhead and meridian limits from configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Lowest altitude a goto or tracking may reach.
    #[serde(default = "default_min_altitude", rename = "min_altitude_degrees")]
    pub min_altitude: Degrees,

    /// Highest altitude a goto or tracking may reach.
    #[serde(default = "default_max_altitude", rename = "max_altitude_degrees")]
    pub max_altitude: Degrees,

    /// How far past the meridian the east pier side may track.
    #[serde(default = "default_past_meridian", rename = "past_meridian_east_degrees")]
    pub past_meridian_east: Degrees,

    /// How far past the meridian the west pier side may track.
    #[serde(default = "default_past_meridian", rename = "past_meridian_west_degrees")]
    pub past_meridian_west: Degrees,

    /// Flip automatically when tracking reaches the meridian limit.
    #[serde(default)]
    pub auto_meridian_flip: bool,

    /// Enforce limits at all.
    #[serde(default = "default_true")]
    pub safety_limits: bool,
}

fn default_min_altitude() -> Degrees {
    Degrees(-10.0)
}

fn default_max_altitude() -> Degrees {
    Degrees(85.0)
}

fn default_past_meridian() -> Degrees {
    Degrees(15.0)
}

fn default_true() -> bool {
    true
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            min_altitude: default_min_altitude(),
            max_altitude: default_max_altitude(),
            past_meridian_east: default_past_meridian(),
            past_meridian_west: default_past_meridian(),
            auto_meridian_flip: false,
            safety_limits: true,
        }
    }
}

/// Runtime limit set, read on every goto validation and every tracking tick.
///
/// Built once from configuration; only [`crate::Mount::set_limits`] replaces it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    /// Axis1 instrument travel.
    pub axis1: AxisTravel,
    /// Axis2 instrument travel.
    pub axis2: AxisTravel,
    /// Minimum altitude in degrees.
    pub min_altitude: f64,
    /// Maximum altitude in degrees.
    pub max_altitude: f64,
    /// East pier side allowance past the meridian, degrees of hour angle.
    pub past_meridian_e: f64,
    /// West pier side allowance past the meridian, degrees of hour angle.
    pub past_meridian_w: f64,
    /// Flip automatically at the meridian limit while tracking.
    pub auto_meridian_flip: bool,
}

impl Limits {
    /// Build the runtime limits from a mount configuration.
    pub fn from_config(config: &MountConfig) -> Self {
        Self {
            axis1: config.axis1.limits.unwrap_or(DEFAULT_AXIS1_TRAVEL),
            axis2: config.axis2.limits.unwrap_or(DEFAULT_AXIS2_TRAVEL),
            min_altitude: config.limits.min_altitude.0,
            max_altitude: config.limits.max_altitude.0,
            past_meridian_e: config.limits.past_meridian_east.0,
            past_meridian_w: config.limits.past_meridian_west.0,
            auto_meridian_flip: config.limits.auto_meridian_flip,
        }
    }

    /// Check an altitude against the horizon and overhead limits.
    pub fn altitude_ok(&self, alt: f64) -> bool {
        alt >= self.min_altitude && alt <= self.max_altitude
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            axis1: DEFAULT_AXIS1_TRAVEL,
            axis2: DEFAULT_AXIS2_TRAVEL,
            min_altitude: default_min_altitude().0,
            max_altitude: default_max_altitude().0,
            past_meridian_e: default_past_meridian().0,
            past_meridian_w: default_past_meridian().0,
            auto_meridian_flip: false,
        }
    }
}
