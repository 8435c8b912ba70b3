//! Continuous and pulse guiding.
//!
//! Guide rates are offsets added to the drift rates in multiples of sidereal.
//! A pulse reverts on its own when its duration expires; nothing else ends it.

use super::state::{GuideAxis, GuideDirection, GuideRate, GuideState};
use super::Mount;
use crate::axis::Axis;
use crate::config::units::DegreesPerSec;
use crate::coords::Transform;
use crate::error::{CommandError, CommandResult};
use crate::tls::TimeLocationSource;

/// Longest accepted pulse guide, milliseconds.
pub const MAX_PULSE_GUIDE_MS: u32 = 30_000;

#[derive(Debug, Clone)]
pub(crate) struct GuideMachine {
    pub(crate) state: GuideState,
    pub(crate) rate: GuideRate,
    pub(crate) pulse_rate: GuideRate,
    // Offsets in multiples of sidereal, West and North positive
    pub(crate) axis1: f64,
    pub(crate) axis2: f64,
    pulse_end_ms: u64,
}

impl GuideMachine {
    pub(crate) fn new(rate: GuideRate, pulse_rate: GuideRate) -> Self {
        Self {
            state: GuideState::None,
            rate,
            pulse_rate,
            axis1: 0.0,
            axis2: 0.0,
            pulse_end_ms: 0,
        }
    }

    pub(crate) fn is_idle(&self) -> bool {
        self.state == GuideState::None
    }

    fn set(&mut self, axis: GuideAxis, value: f64) {
        match axis {
            GuideAxis::Axis1 => self.axis1 = value,
            GuideAxis::Axis2 => self.axis2 = value,
            GuideAxis::Both => {
                self.axis1 = value;
                self.axis2 = value;
            }
        }
    }

    fn clear(&mut self) {
        self.state = GuideState::None;
        self.axis1 = 0.0;
        self.axis2 = 0.0;
    }
}

impl<A, S, T> Mount<A, S, T>
where
    A: Axis,
    S: TimeLocationSource,
    T: Transform,
{
    /// Start continuous guiding in a direction until stopped.
    ///
    /// # Errors
    ///
    /// `GuideDuringGoto`, park refusals, `GuideBusy` during a pulse.
    pub fn guide(&mut self, direction: GuideDirection, rate: GuideRate) -> CommandResult {
        self.guide_allowed()?;
        if self.guide.state == GuideState::PulseGuide {
            return Err(CommandError::GuideBusy);
        }
        let multiple = self.guide_multiple(rate, direction.axis());
        self.guide.set(direction.axis(), direction.sign() * multiple);
        self.guide.state = GuideState::Guide;
        debug!("guide {:?} at {}x", direction, multiple);
        Ok(())
    }

    /// Stop continuous guiding on an axis.
    ///
    /// # Errors
    ///
    /// `GuideBusy` while a pulse runs; a pulse cannot be cut short.
    pub fn guide_stop(&mut self, axis: GuideAxis) -> CommandResult {
        if self.guide.state == GuideState::PulseGuide {
            return Err(CommandError::GuideBusy);
        }
        self.guide.set(axis, 0.0);
        if self.guide.axis1 == 0.0 && self.guide.axis2 == 0.0 {
            self.guide.state = GuideState::None;
        }
        Ok(())
    }

    /// Guide in a direction for `duration_ms` at the pulse guide rate.
    ///
    /// A new pulse replaces one in progress.
    ///
    /// # Errors
    ///
    /// `GuideDuringGoto`, park refusals, `ParameterRange` for a zero or
    /// overlong duration, `GuideBusy` during continuous guiding.
    pub fn pulse_guide(&mut self, direction: GuideDirection, duration_ms: u32) -> CommandResult {
        self.guide_allowed()?;
        if duration_ms == 0 || duration_ms > MAX_PULSE_GUIDE_MS {
            return Err(CommandError::ParameterRange);
        }
        if self.guide.state == GuideState::Guide {
            return Err(CommandError::GuideBusy);
        }
        let multiple = self.guide_multiple(self.guide.pulse_rate, direction.axis());
        self.guide.clear();
        self.guide.set(direction.axis(), direction.sign() * multiple);
        self.guide.state = GuideState::PulseGuide;
        self.guide.pulse_end_ms = self.now_ms + u64::from(duration_ms);
        debug!("pulse guide {:?} for {} ms", direction, duration_ms);
        Ok(())
    }

    /// Select the continuous guide rate.
    pub fn set_guide_rate(&mut self, rate: GuideRate) {
        self.guide.rate = rate;
    }

    /// Select the pulse guide rate.
    pub fn set_pulse_guide_rate(&mut self, rate: GuideRate) {
        self.guide.pulse_rate = rate;
    }

    /// The continuous guide rate.
    pub fn guide_rate(&self) -> GuideRate {
        self.guide.rate
    }

    /// Per-axis rates used by [`GuideRate::Custom`], multiples of sidereal.
    ///
    /// # Errors
    ///
    /// `ParameterRange` unless both rates are positive.
    pub fn set_custom_guide_rates(&mut self, axis1: f64, axis2: f64) -> CommandResult {
        if !(axis1 > 0.0 && axis2 > 0.0) {
            return Err(CommandError::ParameterRange);
        }
        self.guide_config.custom_rate_axis1 = axis1;
        self.guide_config.custom_rate_axis2 = axis2;
        Ok(())
    }

    fn guide_allowed(&self) -> CommandResult {
        if self.goto_state != super::state::GotoState::None {
            return Err(CommandError::GuideDuringGoto);
        }
        match self.park_state.motion_error() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn guide_multiple(&self, rate: GuideRate, axis: GuideAxis) -> f64 {
        let max_sidereal = DegreesPerSec(self.rates.slew_degrees_per_sec()).as_sidereal();
        match rate.multiplier(max_sidereal) {
            Some(multiple) => multiple,
            None if axis == GuideAxis::Axis2 => self.guide_config.custom_rate_axis2,
            None => self.guide_config.custom_rate_axis1,
        }
    }

    /// End an expired pulse. Called by the monitor.
    pub(crate) fn poll_pulse_guide(&mut self) {
        if self.guide.state == GuideState::PulseGuide && self.now_ms >= self.guide.pulse_end_ms {
            self.guide.clear();
            debug!("pulse guide done");
        }
    }

    /// Stop continuous guiding, leaving a pulse to expire.
    pub(crate) fn guide_stop_continuous(&mut self) {
        if self.guide.state == GuideState::Guide {
            self.guide.clear();
        }
    }

    /// Stop all guiding, pulses included.
    pub(crate) fn guide_cancel_all(&mut self) {
        if !self.guide.is_idle() {
            debug!("guiding canceled");
        }
        self.guide.clear();
    }
}
