//! Mount configuration - root configuration structure.

use serde::Deserialize;

use super::axis::AxisConfig;
use super::limits::LimitsConfig;
use super::units::{Degrees, DegreesPerSec};
use crate::coords::PierSide;
use crate::mount::state::{GuideRate, MeridianFlip, PreferredPierSide, RateCompensation};

/// Root configuration structure from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct MountConfig {
    /// Right ascension / hour angle axis.
    pub axis1: AxisConfig,

    /// Declination axis.
    pub axis2: AxisConfig,

    /// Horizon, overhead and meridian limits.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Goto behavior.
    #[serde(default)]
    pub goto: GotoConfig,

    /// Tracking behavior.
    #[serde(default)]
    pub tracking: TrackingConfig,

    /// Guide rates.
    #[serde(default)]
    pub guide: GuideConfig,

    /// Periodic error correction.
    #[serde(default)]
    pub pec: PecConfig,

    /// Stored park position, home when absent.
    #[serde(default)]
    pub park: Option<ParkPosition>,

    /// Last known site, used until the time/location source is ready.
    #[serde(default)]
    pub site: SiteConfig,

    /// Polar alignment error used by full rate compensation.
    #[serde(default)]
    pub pointing_model: PointingModelConfig,

    /// Capability flags checked at runtime.
    #[serde(default)]
    pub features: FeaturesConfig,
}

/// Goto configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GotoConfig {
    /// Nominal slew rate for both axes.
    #[serde(default = "default_slew_rate", rename = "slew_rate_deg_per_sec")]
    pub slew_rate: DegreesPerSec,

    /// Fastest step period the step generator sustains, in microseconds.
    #[serde(default = "default_min_us_per_step")]
    pub min_us_per_step: f64,

    /// Distance from a target inside which the slew rate ramps down.
    #[serde(default = "default_approach", rename = "approach_degrees")]
    pub approach: Degrees,

    /// Allowed final position error when verifying a park.
    #[serde(default = "default_tolerance")]
    pub arrival_tolerance_arcsec: f64,

    /// Whether the mount may change pier side at all.
    #[serde(default)]
    pub meridian_flip: MeridianFlip,

    /// Pier side used when the mount is free to choose.
    #[serde(default)]
    pub preferred_pier_side: PreferredPierSide,

    /// Hold a meridian flip at the home position until continued.
    #[serde(default)]
    pub pause_at_home: bool,
}

fn default_slew_rate() -> DegreesPerSec {
    DegreesPerSec(1.0)
}

fn default_min_us_per_step() -> f64 {
    8.0
}

fn default_approach() -> Degrees {
    Degrees(1.0)
}

fn default_tolerance() -> f64 {
    30.0
}

impl Default for GotoConfig {
    fn default() -> Self {
        Self {
            slew_rate: default_slew_rate(),
            min_us_per_step: default_min_us_per_step(),
            approach: default_approach(),
            arrival_tolerance_arcsec: default_tolerance(),
            meridian_flip: MeridianFlip::default(),
            preferred_pier_side: PreferredPierSide::default(),
            pause_at_home: false,
        }
    }
}

/// Tracking configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackingConfig {
    /// Differential rate compensation applied while tracking.
    #[serde(default)]
    pub rate_compensation: RateCompensation,
}

/// Guide configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GuideConfig {
    /// Rate for continuous guiding.
    #[serde(default = "default_guide_rate")]
    pub rate: GuideRate,

    /// Rate for pulse guiding.
    #[serde(default = "default_pulse_rate")]
    pub pulse_rate: GuideRate,

    /// Axis1 rate in multiples of sidereal when `custom` is selected.
    #[serde(default = "default_custom_rate")]
    pub custom_rate_axis1: f64,

    /// Axis2 rate in multiples of sidereal when `custom` is selected.
    #[serde(default = "default_custom_rate")]
    pub custom_rate_axis2: f64,
}

fn default_guide_rate() -> GuideRate {
    GuideRate::X20
}

fn default_pulse_rate() -> GuideRate {
    GuideRate::X1
}

fn default_custom_rate() -> f64 {
    1.0
}

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            rate: default_guide_rate(),
            pulse_rate: default_pulse_rate(),
            custom_rate_axis1: default_custom_rate(),
            custom_rate_axis2: default_custom_rate(),
        }
    }
}

/// Periodic error correction configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PecConfig {
    /// Worm period in seconds (one correction bin per second).
    #[serde(default = "default_worm_period")]
    pub worm_period_seconds: u32,
}

fn default_worm_period() -> u32 {
    480
}

impl Default for PecConfig {
    fn default() -> Self {
        Self {
            worm_period_seconds: default_worm_period(),
        }
    }
}

/// A park position in instrument coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ParkPosition {
    /// Axis1 instrument angle.
    #[serde(rename = "axis1_degrees")]
    pub axis1: Degrees,

    /// Axis2 instrument angle.
    #[serde(rename = "axis2_degrees")]
    pub axis2: Degrees,

    /// Pier side at the park position.
    #[serde(default)]
    pub pier_side: PierSide,
}

/// Site configuration. Longitude is positive east.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct SiteConfig {
    /// Latitude in degrees.
    #[serde(default)]
    pub latitude_degrees: f64,

    /// Longitude in degrees, positive east.
    #[serde(default)]
    pub longitude_degrees: f64,

    /// Elevation in meters.
    #[serde(default)]
    pub elevation_meters: f64,
}

/// Polar misalignment terms.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PointingModelConfig {
    /// Elevation error of the polar axis, arcseconds.
    #[serde(default)]
    pub polar_altitude_error_arcsec: f64,

    /// Azimuth error of the polar axis, arcseconds.
    #[serde(default)]
    pub polar_azimuth_error_arcsec: f64,
}

/// Capability flags.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct FeaturesConfig {
    /// Periodic error correction available.
    #[serde(default)]
    pub pec: bool,

    /// Refuse gotos until an alignment (sync) exists.
    #[serde(default)]
    pub require_alignment: bool,
}

impl MountConfig {
    /// Create a configuration from two axes with every other section defaulted.
    pub fn with_axes(axis1: AxisConfig, axis2: AxisConfig) -> Self {
        Self {
            axis1,
            axis2,
            limits: LimitsConfig::default(),
            goto: GotoConfig::default(),
            tracking: TrackingConfig::default(),
            guide: GuideConfig::default(),
            pec: PecConfig::default(),
            park: None,
            site: SiteConfig::default(),
            pointing_model: PointingModelConfig::default(),
            features: FeaturesConfig::default(),
        }
    }

    /// Get an axis configuration by number (1 or 2).
    pub fn axis(&self, index: u8) -> Option<&AxisConfig> {
        match index {
            1 => Some(&self.axis1),
            2 => Some(&self.axis2),
            _ => None,
        }
    }
}
