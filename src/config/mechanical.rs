//! Mechanical constraints derived from axis configuration.

use super::axis::AxisConfig;
use super::limits::{AxisTravel, DEFAULT_AXIS1_TRAVEL, DEFAULT_AXIS2_TRAVEL};
use super::units::{DegreesPerSec, SIDEREAL_DEG_PER_SEC};

/// Derived mechanical parameters computed from axis configuration.
///
/// These are computed once at initialization and used for all rate and
/// position conversions at the axis boundary.
#[derive(Debug, Clone)]
pub struct AxisConstraints {
    /// Total steps per axis revolution (steps × microsteps × gear_ratio).
    pub steps_per_revolution: f64,

    /// Steps per degree of axis rotation.
    pub steps_per_degree: f64,

    /// Nominal slew velocity in steps per second.
    pub slew_steps_per_sec: f64,

    /// Sidereal rate in steps per second.
    pub sidereal_steps_per_sec: f64,

    /// Mechanical travel in instrument degrees.
    pub travel: AxisTravel,

    /// Steps in one worm rotation, if configured.
    pub steps_per_worm_rotation: Option<u32>,
}

impl AxisConstraints {
    /// Compute constraints for axis `index` (1 or 2) at the given slew rate.
    pub fn from_config(config: &AxisConfig, index: u8, slew_rate: DegreesPerSec) -> Self {
        let steps_per_revolution = config.total_steps_per_revolution();
        let steps_per_degree = steps_per_revolution / 360.0;

        let travel = config.limits.unwrap_or(if index == 1 {
            DEFAULT_AXIS1_TRAVEL
        } else {
            DEFAULT_AXIS2_TRAVEL
        });

        Self {
            steps_per_revolution,
            steps_per_degree,
            slew_steps_per_sec: slew_rate.0 * steps_per_degree,
            sidereal_steps_per_sec: SIDEREAL_DEG_PER_SEC * steps_per_degree,
            travel,
            steps_per_worm_rotation: config.steps_per_worm_rotation,
        }
    }

    /// Convert degrees to steps (rounded to nearest).
    #[inline]
    pub fn degrees_to_steps(&self, degrees: f64) -> i64 {
        libm::round(degrees * self.steps_per_degree) as i64
    }

    /// Convert steps to degrees.
    #[inline]
    pub fn steps_to_degrees(&self, steps: i64) -> f64 {
        steps as f64 / self.steps_per_degree
    }

    /// Convert a multiple of the sidereal rate to steps/sec.
    #[inline]
    pub fn sidereal_to_steps(&self, multiple: f64) -> f64 {
        multiple * self.sidereal_steps_per_sec
    }

    /// Step period in microseconds for a velocity in steps/sec.
    #[inline]
    pub fn velocity_to_us_per_step(&self, steps_per_sec: f64) -> f64 {
        if steps_per_sec > 0.0 {
            1_000_000.0 / steps_per_sec
        } else {
            f64::MAX
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::units::Microsteps;

    fn make_test_config() -> AxisConfig {
        AxisConfig {
            name: heapless::String::try_from("ra").unwrap(),
            steps_per_revolution: 200,
            microsteps: Microsteps::SIXTEENTH,
            gear_ratio: 180.0,
            limits: None,
            steps_per_worm_rotation: Some(3200),
        }
    }

    #[test]
    fn test_steps_per_degree() {
        let constraints = AxisConstraints::from_config(&make_test_config(), 1, DegreesPerSec(2.0));

        // 200 * 16 * 180 / 360 = 1600
        assert!((constraints.steps_per_degree - 1600.0).abs() < 1e-9);
        assert!((constraints.slew_steps_per_sec - 3200.0).abs() < 1e-9);
    }

    #[test]
    fn test_default_travel_by_axis() {
        let c1 = AxisConstraints::from_config(&make_test_config(), 1, DegreesPerSec(2.0));
        let c2 = AxisConstraints::from_config(&make_test_config(), 2, DegreesPerSec(2.0));
        assert_eq!(c1.travel, DEFAULT_AXIS1_TRAVEL);
        assert_eq!(c2.travel, DEFAULT_AXIS2_TRAVEL);
    }

    #[test]
    fn test_sidereal_steps() {
        let constraints = AxisConstraints::from_config(&make_test_config(), 1, DegreesPerSec(2.0));
        // 1600 steps/deg * 0.004178 deg/s ≈ 6.685 steps/s
        assert!((constraints.sidereal_to_steps(1.0) - 6.685).abs() < 0.01);
    }
}
