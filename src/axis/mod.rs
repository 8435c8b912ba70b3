//! Axis contract.
//!
//! An axis generates its own steps on a real-time path. The mount only issues
//! targets and rates and polls the arrival and stopped flags once per tick.

mod sim;

pub use sim::SimAxis;

use crate::config::units::Steps;

/// One motorized axis.
///
/// With a target pending the axis slews toward it at `|rate|` and, on
/// arrival, clears both target and rate so it holds position. With no target
/// the rate is a continuous signed drift (tracking, guiding).
pub trait Axis {
    /// Move to an absolute position.
    fn set_target(&mut self, target: Steps);

    /// Commanded rate in steps per second.
    fn set_rate(&mut self, steps_per_sec: f64);

    /// Current position.
    fn position(&self) -> Steps;

    /// True when the last target was reached and no new target is pending.
    fn at_target(&self) -> bool;

    /// Clear target and rate; the axis decelerates to a halt.
    fn stop(&mut self);

    /// True once motionless with no target and no rate.
    fn is_stopped(&self) -> bool;
}

impl<T: Axis + ?Sized> Axis for &mut T {
    fn set_target(&mut self, target: Steps) {
        (**self).set_target(target)
    }

    fn set_rate(&mut self, steps_per_sec: f64) {
        (**self).set_rate(steps_per_sec)
    }

    fn position(&self) -> Steps {
        (**self).position()
    }

    fn at_target(&self) -> bool {
        (**self).at_target()
    }

    fn stop(&mut self) {
        (**self).stop()
    }

    fn is_stopped(&self) -> bool {
        (**self).is_stopped()
    }
}
