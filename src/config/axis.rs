//! Axis configuration from TOML.

use heapless::String;
use serde::Deserialize;

use super::limits::AxisTravel;
use super::units::Microsteps;

/// Mechanical configuration of one mount axis.
#[derive(Debug, Clone, Deserialize)]
pub struct AxisConfig {
    /// Human-readable name (max 32 chars).
    pub name: String<32>,

    /// Base steps per motor revolution (typically 200 for 1.8° motors).
    pub steps_per_revolution: u16,

    /// Microstep setting (1, 2, 4, 8, 16, 32, etc.).
    pub microsteps: Microsteps,

    /// Total reduction between motor and axis (worm ratio times belt/gearbox).
    #[serde(default = "default_gear_ratio")]
    pub gear_ratio: f64,

    /// Mechanical travel of the axis in instrument degrees.
    #[serde(default)]
    pub limits: Option<AxisTravel>,

    /// Steps in one worm rotation, used for PEC phase (axis1 only).
    #[serde(default)]
    pub steps_per_worm_rotation: Option<u32>,
}

fn default_gear_ratio() -> f64 {
    1.0
}

impl AxisConfig {
    /// Calculate total steps per axis revolution.
    pub fn total_steps_per_revolution(&self) -> f64 {
        self.steps_per_revolution as f64 * self.microsteps.value() as f64 * self.gear_ratio
    }

    /// Calculate steps per degree of axis rotation.
    pub fn steps_per_degree(&self) -> f64 {
        self.total_steps_per_revolution() / 360.0
    }
}
