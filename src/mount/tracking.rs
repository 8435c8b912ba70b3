//! Sidereal tracking and differential rate compensation.
//!
//! Compensation rates come from a finite difference of the apparent
//! (refracted, optionally modelled) instrument position half a minute either
//! side of the current hour angle. The result is a delta on top of the base
//! tracking rate, in multiples of sidereal.

use libm::fabs;

use super::state::{GotoState, MountFault, RateCompensation, TrackingState};
use super::{Mount, MountEvent};
use crate::axis::Axis;
use crate::coords::{normalize_degrees, Coordinate, Transform};
use crate::error::{CommandError, CommandResult};
use crate::tls::TimeLocationSource;

/// Half span of the finite difference in degrees of hour angle (30 s).
const HALF_SPAN: f64 = 0.125;

/// Compensation deltas are clamped to this many times sidereal.
const MAX_DELTA: f64 = 0.1;

/// Tracking rate multiplier range, exclusive of zero.
const MAX_TRACKING_RATE: f64 = 2.0;

impl<A, S, T> Mount<A, S, T>
where
    A: Axis,
    S: TimeLocationSource,
    T: Transform,
{
    /// Start or stop sidereal tracking.
    ///
    /// During a goto the request only decides whether tracking resumes when
    /// the goto completes.
    ///
    /// # Errors
    ///
    /// Park refusals when starting, and `Fault` while a general fault is
    /// latched.
    pub fn set_tracking_state(&mut self, state: TrackingState) -> CommandResult {
        match state {
            TrackingState::Sidereal => {
                if let Some(e) = self.park_state.motion_error() {
                    return Err(e);
                }
                if self.fault != MountFault::None {
                    return Err(CommandError::Fault);
                }
                if self.goto_state != GotoState::None {
                    self.tracking_before_goto = true;
                    return Ok(());
                }
                self.tracking_state = TrackingState::Sidereal;
                self.at_home = false;
                info!("tracking on");
            }
            TrackingState::None => {
                if self.goto_state != GotoState::None {
                    self.tracking_before_goto = false;
                    return Ok(());
                }
                self.tracking_state = TrackingState::None;
                self.flip_pending = false;
                self.delta_rate_axis1 = 0.0;
                self.delta_rate_axis2 = 0.0;
                info!("tracking off");
            }
        }
        Ok(())
    }

    /// Set the base tracking rate as a multiple of sidereal.
    ///
    /// # Errors
    ///
    /// `ParameterRange` outside `(0, 2]`.
    pub fn set_tracking_rate(&mut self, rate: f64) -> CommandResult {
        if !(rate > 0.0 && rate <= MAX_TRACKING_RATE) {
            return Err(CommandError::ParameterRange);
        }
        self.tracking_rate = rate;
        Ok(())
    }

    /// Select differential rate compensation.
    pub fn set_rate_compensation(&mut self, mode: RateCompensation) {
        self.rate_compensation = mode;
        if mode == RateCompensation::None {
            self.delta_rate_axis1 = 0.0;
            self.delta_rate_axis2 = 0.0;
        }
        debug!("rate compensation {:?}", mode);
    }

    /// Recompute the compensation deltas for the current position.
    pub(crate) fn update_tracking_rates(&mut self) {
        if self.tracking_state == TrackingState::None
            || self.rate_compensation == RateCompensation::None
        {
            self.delta_rate_axis1 = 0.0;
            self.delta_rate_axis2 = 0.0;
            return;
        }
        let (delta1, delta2) = self.compensation_deltas(&self.current);
        self.delta_rate_axis1 = delta1;
        self.delta_rate_axis2 = delta2;
        trace!("rate deltas {} {}", delta1, delta2);
    }

    /// Deltas `(axis1, axis2)` in multiples of sidereal at a coordinate.
    pub(crate) fn compensation_deltas(&self, coord: &Coordinate) -> (f64, f64) {
        let mode = self.rate_compensation;
        if mode == RateCompensation::None || self.transform.equ_to_hor(coord).alt < 0.0 {
            return (0.0, 0.0);
        }

        let ahead = Coordinate {
            h: coord.h + HALF_SPAN,
            ..*coord
        };
        let behind = Coordinate {
            h: coord.h - HALF_SPAN,
            ..*coord
        };
        let (a1_ahead, a2_ahead) = self.apparent_instrument(&ahead, mode);
        let (a1_behind, a2_behind) = self.apparent_instrument(&behind, mode);

        let span = 2.0 * HALF_SPAN;
        let delta1 = normalize_degrees(a1_ahead - a1_behind) / span - 1.0;
        let delta2 = if mode.both_axes() {
            (a2_ahead - a2_behind) / span
        } else {
            0.0
        };
        (clamp_delta(delta1), clamp_delta(delta2))
    }

    fn apparent_instrument(&self, coord: &Coordinate, mode: RateCompensation) -> (f64, f64) {
        let mut apparent = self.transform.refract(coord);
        if mode.uses_model() {
            apparent = self.transform.apply_model(&apparent);
        }
        self.transform.mount_to_instrument(&apparent)
    }

    /// Command drift rates from tracking, compensation, guiding and PEC.
    pub(crate) fn apply_rates(&mut self) {
        let tracking = self.tracking_state == TrackingState::Sidereal;
        let (base, delta1, delta2, pec) = if tracking {
            (
                self.tracking_rate,
                self.delta_rate_axis1,
                self.delta_rate_axis2,
                self.pec.rate(),
            )
        } else {
            (0.0, 0.0, 0.0, 0.0)
        };

        let direction2 = self.transform.axis2_direction(self.pier_side);
        let rate1 = self
            .constraints1
            .sidereal_to_steps(base + delta1 + self.guide.axis1 + pec);
        let rate2 = self
            .constraints2
            .sidereal_to_steps(delta2 + self.guide.axis2 * direction2);

        self.axis1.set_rate(rate1);
        self.axis2.set_rate(rate2);
        if fabs(rate1) > 0.0 || fabs(rate2) > 0.0 {
            trace!("axis rates {} {}", rate1, rate2);
        }
    }

    /// Start a flip scheduled by the tracking limit check.
    pub(crate) fn start_scheduled_flip(&mut self) {
        if !self.flip_pending {
            return;
        }
        self.flip_pending = false;
        let Some(equ) = self.current_equatorial() else {
            return;
        };
        if let Err(e) = self.request_goto(equ, GotoState::Goto) {
            let fault = self.tracking_limit_fault().unwrap_or(MountFault::GotoFailed);
            self.tracking_state = TrackingState::None;
            self.fault = fault;
            self.push_event(MountEvent::LimitFault(fault));
            warn!("meridian flip refused: {:?}", e);
        }
    }
}

fn clamp_delta(delta: f64) -> f64 {
    delta.clamp(-MAX_DELTA, MAX_DELTA)
}
