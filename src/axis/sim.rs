//! In-process axis simulation.

use libm::{fabs, round, sqrt};

use super::Axis;
use crate::config::units::Steps;

/// Simulated axis driven by [`SimAxis::advance`].
///
/// Position is integrated with sub-step resolution. An optional acceleration
/// limit ramps the velocity; without one, velocity changes instantly.
#[derive(Debug, Clone)]
pub struct SimAxis {
    position: f64,
    velocity: f64,
    rate: f64,
    target: Option<f64>,
    reached: bool,
    acceleration: Option<f64>,
    jammed: bool,
}

impl SimAxis {
    /// A stopped axis at a position.
    pub fn new(position: Steps) -> Self {
        Self {
            position: position.value() as f64,
            velocity: 0.0,
            rate: 0.0,
            target: None,
            reached: false,
            acceleration: None,
            jammed: false,
        }
    }

    /// Limit acceleration to `steps_per_sec2`.
    pub fn with_acceleration(mut self, steps_per_sec2: f64) -> Self {
        self.acceleration = Some(steps_per_sec2);
        self
    }

    /// Seize the axis: it stops at once and ignores further targets and rates.
    pub fn jam(&mut self) {
        self.jammed = true;
        self.target = None;
        self.rate = 0.0;
        self.velocity = 0.0;
        self.reached = false;
    }

    /// Free a jammed axis.
    pub fn release(&mut self) {
        self.jammed = false;
    }

    /// Current velocity in steps per second.
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Commanded rate in steps per second.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Pending target, if any.
    pub fn target(&self) -> Option<Steps> {
        self.target.map(|t| Steps(t as i64))
    }

    /// Advance the simulation by `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        if self.jammed || dt <= 0.0 {
            return;
        }

        let desired = match self.target {
            Some(target) => {
                let distance = target - self.position;
                let mut speed = fabs(self.rate);
                if let Some(accel) = self.acceleration {
                    // Leave room to decelerate, with one tick of slack so the
                    // approach does not stall short of the target.
                    speed = speed.min(sqrt(2.0 * accel * fabs(distance)) + accel * dt);
                }
                if distance < 0.0 {
                    -speed
                } else {
                    speed
                }
            }
            None => self.rate,
        };

        self.velocity = match self.acceleration {
            Some(accel) => {
                let max_change = accel * dt;
                self.velocity + (desired - self.velocity).clamp(-max_change, max_change)
            }
            None => desired,
        };

        let before = self.position;
        self.position += self.velocity * dt;

        if let Some(target) = self.target {
            let crossed = (before - target) * (self.position - target) <= 0.0;
            if crossed || fabs(target - self.position) < 0.5 {
                self.position = target;
                self.target = None;
                self.rate = 0.0;
                self.velocity = 0.0;
                self.reached = true;
            }
        }
    }
}

impl Default for SimAxis {
    fn default() -> Self {
        Self::new(Steps(0))
    }
}

impl Axis for SimAxis {
    fn set_target(&mut self, target: Steps) {
        if self.jammed {
            return;
        }
        let target = target.value() as f64;
        if fabs(target - self.position) < 0.5 {
            self.position = target;
            self.target = None;
            self.rate = 0.0;
            self.reached = true;
        } else {
            self.target = Some(target);
            self.reached = false;
        }
    }

    fn set_rate(&mut self, steps_per_sec: f64) {
        if !self.jammed {
            self.rate = steps_per_sec;
        }
    }

    fn position(&self) -> Steps {
        Steps(round(self.position) as i64)
    }

    fn at_target(&self) -> bool {
        self.reached && self.target.is_none()
    }

    fn stop(&mut self) {
        self.target = None;
        self.rate = 0.0;
        self.reached = false;
        if self.acceleration.is_none() {
            self.velocity = 0.0;
        }
    }

    fn is_stopped(&self) -> bool {
        self.target.is_none() && self.velocity == 0.0 && self.rate == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slew_to_target() {
        let mut axis = SimAxis::default();
        axis.set_target(Steps(1000));
        axis.set_rate(400.0);
        assert!(!axis.at_target());

        for _ in 0..30 {
            axis.advance(0.1);
        }
        assert!(axis.at_target());
        assert!(axis.is_stopped());
        assert_eq!(axis.position(), Steps(1000));
    }

    #[test]
    fn test_drift_without_target() {
        let mut axis = SimAxis::default();
        axis.set_rate(-10.0);
        axis.advance(2.0);
        assert_eq!(axis.position(), Steps(-20));
        assert!(!axis.is_stopped());
    }

    #[test]
    fn test_stop_with_ramp_takes_time() {
        let mut axis = SimAxis::default().with_acceleration(100.0);
        axis.set_rate(100.0);
        for _ in 0..20 {
            axis.advance(0.1);
        }
        axis.stop();
        assert!(!axis.is_stopped());
        for _ in 0..20 {
            axis.advance(0.1);
        }
        assert!(axis.is_stopped());
        assert!(!axis.at_target());
    }

    #[test]
    fn test_jammed_axis_ignores_targets() {
        let mut axis = SimAxis::default();
        axis.jam();
        axis.set_target(Steps(500));
        axis.set_rate(100.0);
        axis.advance(1.0);
        assert_eq!(axis.position(), Steps(0));
        assert!(axis.is_stopped());
        assert!(!axis.at_target());
    }
}
