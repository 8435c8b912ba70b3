//! Goto slew rate profile.
//!
//! A goto moves each axis fast while far from its target and ramps down on
//! approach. Rates are expressed as step periods (`us_per_step`) referred to
//! axis1, the way step timers are programmed, and converted to per-axis
//! steps per second at the axis boundary.

use libm::sqrt;

use crate::config::AxisConstraints;

/// Fraction of the fast rate kept at the very end of an approach.
pub const APPROACH_FLOOR: f64 = 0.05;

/// Phase of a slew for one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlewPhase {
    /// Far from target, full slew rate.
    Fast,
    /// Inside the approach distance, rate ramping down.
    Approach,
    /// At target.
    Arrived,
}

/// Goto rate selection relative to the configured slew rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GotoRateMultiplier {
    /// 0.5×
    Slowest,
    /// 0.66×
    Slower,
    /// 1×
    #[default]
    Default,
    /// 1.5×
    Faster,
    /// 2×
    Fastest,
}

impl GotoRateMultiplier {
    /// The multiplier value.
    pub fn value(self) -> f64 {
        match self {
            GotoRateMultiplier::Slowest => 0.5,
            GotoRateMultiplier::Slower => 0.66,
            GotoRateMultiplier::Default => 1.0,
            GotoRateMultiplier::Faster => 1.5,
            GotoRateMultiplier::Fastest => 2.0,
        }
    }
}

/// Slew rates for gotos.
#[derive(Debug, Clone)]
pub struct GotoRates {
    /// Step period at the configured slew rate, microseconds (axis1).
    pub us_per_step_default: f64,

    /// Step period in use after the rate multiplier, microseconds (axis1).
    pub us_per_step_current: f64,

    /// Fastest step period the step generator sustains at a timer ratio of 1.
    pub min_us_per_step: f64,

    /// Step timer rate ratio (1.0 nominal).
    pub timer_rate_ratio: f64,

    /// Distance inside which an axis ramps down, degrees.
    pub approach_degrees: f64,

    /// Axis1 steps per degree, the reference for step periods.
    steps_per_degree_axis1: f64,

    multiplier: GotoRateMultiplier,
}

impl GotoRates {
    /// Rates from axis1 constraints.
    pub fn new(axis1: &AxisConstraints, min_us_per_step: f64, approach_degrees: f64) -> Self {
        let us_per_step_default = axis1.velocity_to_us_per_step(axis1.slew_steps_per_sec);
        let mut rates = Self {
            us_per_step_default,
            us_per_step_current: us_per_step_default,
            min_us_per_step,
            timer_rate_ratio: 1.0,
            approach_degrees,
            steps_per_degree_axis1: axis1.steps_per_degree,
            multiplier: GotoRateMultiplier::Default,
        };
        rates.apply();
        rates
    }

    /// Fastest allowed step period at the current timer ratio.
    #[inline]
    pub fn us_per_step_lower_limit(&self) -> f64 {
        self.min_us_per_step * self.timer_rate_ratio
    }

    /// Select a goto rate multiplier.
    pub fn set_rate_multiplier(&mut self, multiplier: GotoRateMultiplier) {
        self.multiplier = multiplier;
        self.apply();
    }

    /// The selected multiplier.
    pub fn rate_multiplier(&self) -> GotoRateMultiplier {
        self.multiplier
    }

    /// Change the step timer ratio.
    pub fn set_timer_rate_ratio(&mut self, ratio: f64) {
        if ratio > 0.0 {
            self.timer_rate_ratio = ratio;
            self.apply();
        }
    }

    fn apply(&mut self) {
        let wanted = self.us_per_step_default / self.multiplier.value();
        self.us_per_step_current = wanted.max(self.us_per_step_lower_limit());
    }

    /// Current slew rate in degrees per second.
    pub fn slew_degrees_per_sec(&self) -> f64 {
        1_000_000.0 / (self.us_per_step_current * self.steps_per_degree_axis1)
    }

    /// Phase for an axis `distance` degrees from its target.
    pub fn phase_for(&self, distance: f64) -> SlewPhase {
        let distance = libm::fabs(distance);
        if distance == 0.0 {
            SlewPhase::Arrived
        } else if distance >= self.approach_degrees {
            SlewPhase::Fast
        } else {
            SlewPhase::Approach
        }
    }

    /// Rate in steps per second for an axis `distance` degrees from target.
    pub fn rate_for_distance(&self, distance: f64, steps_per_degree: f64) -> f64 {
        let fast = self.slew_degrees_per_sec() * steps_per_degree;
        let ceiling = 1_000_000.0 / self.us_per_step_lower_limit();
        let fast = fast.min(ceiling);

        match self.phase_for(distance) {
            SlewPhase::Fast => fast,
            SlewPhase::Approach => {
                let ramp = sqrt(libm::fabs(distance) / self.approach_degrees);
                fast * ramp.max(APPROACH_FLOOR)
            }
            SlewPhase::Arrived => fast * APPROACH_FLOOR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::units::{DegreesPerSec, Microsteps};
    use crate::config::AxisConfig;

    fn rates() -> GotoRates {
        let axis = AxisConfig {
            name: heapless::String::try_from("ra").unwrap(),
            steps_per_revolution: 200,
            microsteps: Microsteps::SIXTEENTH,
            gear_ratio: 180.0,
            limits: None,
            steps_per_worm_rotation: None,
        };
        // 1600 steps/deg at 2 deg/s = 3200 steps/s
        let c = AxisConstraints::from_config(&axis, 1, DegreesPerSec(2.0));
        GotoRates::new(&c, 8.0, 1.0)
    }

    #[test]
    fn test_default_period() {
        let r = rates();
        assert!((r.us_per_step_default - 312.5).abs() < 1e-9);
        assert!((r.slew_degrees_per_sec() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_ramp_down_on_approach() {
        let r = rates();
        assert_eq!(r.phase_for(10.0), SlewPhase::Fast);
        assert_eq!(r.phase_for(-0.25), SlewPhase::Approach);
        let fast = r.rate_for_distance(10.0, 1600.0);
        let near = r.rate_for_distance(0.25, 1600.0);
        assert!((fast - 3200.0).abs() < 1e-6);
        assert!((near - 1600.0).abs() < 1e-6);
        assert!(r.rate_for_distance(1e-9, 1600.0) >= fast * APPROACH_FLOOR);
    }

    #[test]
    fn test_multiplier_bounded_by_lower_limit() {
        let mut r = rates();
        r.set_rate_multiplier(GotoRateMultiplier::Fastest);
        assert!((r.slew_degrees_per_sec() - 4.0).abs() < 1e-9);

        r.set_timer_rate_ratio(100.0);
        // 800 us lower limit is slower than the 156.25 us wanted
        assert!((r.us_per_step_current - 800.0).abs() < 1e-9);
    }
}
