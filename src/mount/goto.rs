//! Goto, sync and abort.
//!
//! A goto is validated when requested and then staged by the monitor:
//! START captures the start position once both axes are stopped, WAYPOINT
//! routes a meridian flip through the pole, DESTINATION drives both axes to
//! the target and completes when both report arrival.

use super::state::{GotoStage, GotoState, GotoType, MountFault, TrackingState};
use super::Mount;
use crate::axis::Axis;
use crate::coords::{Coordinate, Equatorial, PierSide, Transform, HOME_AXIS1, HOME_AXIS2};
use crate::error::{CommandError, CommandResult};
use crate::motion::SlewPhase;
use crate::tls::TimeLocationSource;

/// Pier side decision for an accepted goto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GotoPlan {
    /// Pier side the destination is reached from.
    pub pier_side: PierSide,
    /// The goto changes pier side and passes through the waypoint.
    pub flip: bool,
}

/// What a goto is heading for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum GotoTarget {
    /// A sky position; its hour angle is refreshed every tick.
    Sky(Equatorial),
    /// Fixed instrument angles (home, park).
    Instrument { axis1: f64, axis2: f64 },
}

impl<A, S, T> Mount<A, S, T>
where
    A: Axis,
    S: TimeLocationSource,
    T: Transform,
{
    /// Slew to a sky position.
    ///
    /// # Errors
    ///
    /// Any validation failure; state is unchanged on error.
    pub fn goto_equ(&mut self, target: Equatorial) -> CommandResult {
        self.request_goto(target, GotoState::Goto)
    }

    /// Slew to a sky position, then sync to it on arrival.
    ///
    /// # Errors
    ///
    /// Any validation failure; state is unchanged on error.
    pub fn goto_equ_sync(&mut self, target: Equatorial) -> CommandResult {
        self.request_goto(target, GotoState::GotoSync)
    }

    /// Slew to the home position. Tracking stays off on arrival.
    ///
    /// # Errors
    ///
    /// `GotoInProgress`, or the park state refusing motion.
    pub fn goto_home(&mut self) -> CommandResult {
        if let Some(e) = self.park_state.motion_error() {
            return Err(e);
        }
        if self.goto_state.is_slewing() {
            return Err(CommandError::GotoInProgress);
        }
        let plan = GotoPlan {
            pier_side: PierSide::None,
            flip: false,
        };
        let target = GotoTarget::Instrument {
            axis1: HOME_AXIS1,
            axis2: HOME_AXIS2,
        };
        self.begin_goto(GotoState::Goto, GotoType::Home, target, plan);
        self.tracking_before_goto = false;
        Ok(())
    }

    /// Redefine the current position as `target` without moving.
    ///
    /// # Errors
    ///
    /// `TimeLocationNotReady`, `GotoInProgress`, park refusals, altitude and
    /// axis travel limits.
    pub fn sync_equ(&mut self, target: Equatorial) -> CommandResult {
        self.refresh_clock();
        let lst = self.clock.lst().ok_or(CommandError::TimeLocationNotReady)?;
        if let Some(e) = self.park_state.motion_error() {
            return Err(e);
        }
        if self.goto_state != GotoState::None {
            return Err(CommandError::GotoInProgress);
        }

        let side = match self.pier_side {
            PierSide::None => self.geometric_pier_side(),
            side => side,
        };
        let coord = target.to_mount(lst).on_side(side);
        self.check_altitude(&coord)?;
        self.check_travel(&coord)?;

        self.sync_to(&coord);
        info!("synced to h {} d {}", coord.h, coord.d);
        Ok(())
    }

    /// Release a meridian flip waiting at the home position. Does nothing
    /// when no goto is waiting.
    pub fn continue_goto(&mut self) {
        if self.waiting_home {
            self.waiting_home_continue = true;
            info!("continuing from home");
        }
    }

    /// Abort a goto and stop continuous guiding.
    ///
    /// The goto state stays `GotoAbort` until both axes report stopped. A
    /// pulse guide in progress is not interrupted.
    pub fn abort(&mut self) {
        self.guide_stop_continuous();
        self.flip_pending = false;
        if self.goto_state.is_slewing() {
            info!("goto abort requested");
            self.begin_abort();
        }
    }

    /// Check the mount can accept a goto at all.
    ///
    /// # Errors
    ///
    /// `TimeLocationNotReady`, `Alignment`, park refusals, `GotoInProgress`.
    pub fn validate_goto(&mut self) -> CommandResult {
        self.refresh_clock();
        if !self.clock.is_ready() {
            return Err(CommandError::TimeLocationNotReady);
        }
        if self.features.require_alignment && !self.aligned {
            return Err(CommandError::Alignment);
        }
        if let Some(e) = self.park_state.motion_error() {
            return Err(e);
        }
        if self.goto_state.is_slewing() {
            return Err(CommandError::GotoInProgress);
        }
        Ok(())
    }

    /// Check a destination against altitude and axis limits and choose its
    /// pier side.
    ///
    /// # Errors
    ///
    /// `BelowHorizon`, `AboveOverhead` or a `Limit*` error.
    pub fn validate_goto_coords(&self, coord: &Coordinate) -> CommandResult<GotoPlan> {
        self.check_altitude(coord)?;
        self.select_pier_side(coord)
    }

    pub(super) fn request_goto(&mut self, target: Equatorial, state: GotoState) -> CommandResult {
        self.validate_goto()?;
        let lst = self.clock.lst().ok_or(CommandError::TimeLocationNotReady)?;
        let plan = self.validate_goto_coords(&target.to_mount(lst))?;
        self.begin_goto(state, GotoType::None, GotoTarget::Sky(target), plan);
        Ok(())
    }

    /// Accept a goto. Axes are stopped; staging starts on the next tick.
    pub(crate) fn begin_goto(
        &mut self,
        state: GotoState,
        goto_type: GotoType,
        target: GotoTarget,
        plan: GotoPlan,
    ) {
        self.guide_cancel_all();
        if self.goto_state == GotoState::None {
            self.tracking_before_goto = self.tracking_state == TrackingState::Sidereal;
        }
        self.tracking_state = TrackingState::None;
        self.delta_rate_axis1 = 0.0;
        self.delta_rate_axis2 = 0.0;

        self.goto_state_last = self.goto_state;
        self.goto_state = state;
        self.goto_type = goto_type;
        self.goto_stage = GotoStage::Start;
        self.goto_target = Some(target);
        self.destination_side = plan.pier_side;
        self.flip = plan.flip;
        self.flip_pending = false;
        self.clear_waiting_home();

        self.axis1.stop();
        self.axis2.stop();
        info!(
            "goto accepted: {:?} {:?} side {:?} flip {}",
            state,
            goto_type,
            plan.pier_side,
            plan.flip
        );
    }

    /// Advance goto staging. Called by the monitor.
    pub(crate) fn poll_goto(&mut self) {
        match self.goto_state {
            GotoState::None => return,
            GotoState::GotoAbort => {
                if self.axes_stopped() {
                    self.finish_abort();
                }
                return;
            }
            GotoState::Goto | GotoState::GotoSync => {}
        }

        match self.goto_stage {
            GotoStage::None | GotoStage::Start => {
                if !self.axes_stopped() {
                    return;
                }
                self.start = self.current;
                if !self.plan_destination() {
                    self.fail_goto();
                    return;
                }
                self.goto_stage = self.goto_stage.advance(self.flip);
                debug!("goto stage {:?}", self.goto_stage);
                self.command_stage();
            }
            GotoStage::Waypoint | GotoStage::Destination => {
                if self.axes_arrived() {
                    if self.goto_stage == GotoStage::Waypoint {
                        if self.hold_at_home() {
                            return;
                        }
                        self.goto_stage = self.goto_stage.advance(self.flip);
                        debug!("goto stage {:?}", self.goto_stage);
                        self.plan_destination();
                        self.command_stage();
                    } else {
                        self.complete_goto();
                    }
                } else if self.axes_stalled() {
                    self.fail_goto();
                } else {
                    self.plan_destination();
                    self.command_stage();
                }
            }
        }
    }

    /// Whether a flip arriving at the waypoint has to wait there.
    fn hold_at_home(&mut self) -> bool {
        if !self.pause_at_home || self.goto_type != GotoType::None {
            return false;
        }
        if self.waiting_home_continue {
            self.clear_waiting_home();
            return false;
        }
        if !self.waiting_home {
            self.waiting_home = true;
            info!("flip paused at home");
        }
        true
    }

    pub(crate) fn clear_waiting_home(&mut self) {
        self.waiting_home = false;
        self.waiting_home_continue = false;
    }

    /// Recompute `destination` for the present time. False if a sky target
    /// can no longer be placed (time lost).
    fn plan_destination(&mut self) -> bool {
        let side = self.destination_side;
        match self.goto_target {
            Some(GotoTarget::Sky(equ)) => match self.clock.lst() {
                Some(lst) => {
                    self.destination = equ.to_mount(lst).on_side(side);
                    true
                }
                None => false,
            },
            Some(GotoTarget::Instrument { axis1, axis2 }) => {
                self.destination = self
                    .transform
                    .instrument_to_mount(axis1, axis2, side)
                    .on_side(side);
                true
            }
            None => false,
        }
    }

    /// Instrument angles the current stage heads for.
    fn stage_target(&self) -> (f64, f64) {
        match (self.goto_stage, self.goto_target) {
            (GotoStage::Waypoint, _) => (HOME_AXIS1, HOME_AXIS2),
            (_, Some(GotoTarget::Instrument { axis1, axis2 })) => (axis1, axis2),
            _ => self.transform.mount_to_instrument(&self.destination),
        }
    }

    fn command_stage(&mut self) {
        let (t1, t2) = self.stage_target();
        let (s1, s2) = self.instrument_to_steps(t1, t2);
        let (c1, c2) = self.instrument();
        let (d1, d2) = (t1 - c1, t2 - c2);

        let r1 = self.rates.rate_for_distance(d1, self.constraints1.steps_per_degree);
        let r2 = self.rates.rate_for_distance(d2, self.constraints2.steps_per_degree);
        self.move_fast_axis1 = self.rates.phase_for(d1) == SlewPhase::Fast;
        self.move_fast_axis2 = self.rates.phase_for(d2) == SlewPhase::Fast;

        // Rate first: arriving on set_target clears the rate.
        self.axis1.set_rate(r1);
        self.axis1.set_target(s1);
        self.axis2.set_rate(r2);
        self.axis2.set_target(s2);
        trace!("goto target {} {} rates {} {}", t1, t2, r1, r2);
    }

    fn axes_stopped(&self) -> bool {
        self.axis1.is_stopped() && self.axis2.is_stopped()
    }

    fn axes_arrived(&self) -> bool {
        self.axis1.at_target() && self.axis2.at_target()
    }

    // An axis that stopped without reaching its target will not get there.
    fn axes_stalled(&self) -> bool {
        (self.axis1.is_stopped() && !self.axis1.at_target())
            || (self.axis2.is_stopped() && !self.axis2.at_target())
    }

    fn complete_goto(&mut self) {
        let finished = self.goto_state;
        let goto_type = self.goto_type;
        let target = self.goto_target.take();

        self.goto_state_last = finished;
        self.goto_state = GotoState::None;
        self.goto_stage = GotoStage::Start;
        self.goto_type = GotoType::None;
        self.move_fast_axis1 = false;
        self.move_fast_axis2 = false;
        self.clear_waiting_home();

        match goto_type {
            GotoType::Park => {
                self.pier_side = self.destination_side;
                self.at_home = self.destination_side == PierSide::None;
                self.finish_park();
            }
            GotoType::Home => {
                self.pier_side = PierSide::None;
                self.at_home = true;
            }
            GotoType::None => {
                self.pier_side = self.destination_side;
                self.at_home = false;
                self.update_position();
                if finished == GotoState::GotoSync {
                    if let Some(GotoTarget::Sky(equ)) = target {
                        if let Some(lst) = self.clock.lst() {
                            let coord = equ.to_mount(lst).on_side(self.pier_side);
                            self.sync_to(&coord);
                        }
                    }
                }
                if self.tracking_before_goto && self.fault == MountFault::None {
                    self.tracking_state = TrackingState::Sidereal;
                }
            }
        }
        self.update_position();
        info!("goto complete: {:?}", goto_type);
    }

    fn fail_goto(&mut self) {
        warn!("goto stalled at stage {:?}", self.goto_stage);
        self.fault = MountFault::GotoFailed;
        self.push_event(super::MountEvent::LimitFault(MountFault::GotoFailed));
        self.tracking_before_goto = false;
        self.begin_abort();
    }

    pub(crate) fn begin_abort(&mut self) {
        self.goto_state_last = self.goto_state;
        self.goto_state = GotoState::GotoAbort;
        self.move_fast_axis1 = false;
        self.move_fast_axis2 = false;
        self.axis1.stop();
        self.axis2.stop();
        if self.goto_type == GotoType::Park {
            self.park_state = self.park_state.finish_parking(false);
            warn!("park failed");
        }
    }

    fn finish_abort(&mut self) {
        let goto_type = self.goto_type;
        self.goto_state = GotoState::None;
        self.goto_stage = GotoStage::Start;
        self.goto_type = GotoType::None;
        self.goto_target = None;
        self.clear_waiting_home();
        self.pier_side = self.geometric_pier_side();
        self.at_home = false;
        if goto_type == GotoType::None && self.tracking_before_goto && self.fault == MountFault::None {
            self.tracking_state = TrackingState::Sidereal;
        }
        self.update_position();
        info!("goto aborted, axes stopped");
    }

    /// Shift the index offsets so the current position reads `coord`.
    pub(crate) fn sync_to(&mut self, coord: &Coordinate) {
        let (t1, t2) = self.transform.mount_to_instrument(coord);
        let (c1, c2) = self.instrument();
        self.index1 += t1 - c1;
        self.index2 += t2 - c2;
        self.pier_side = coord.pier_side;
        self.at_home = false;
        self.aligned = true;
        self.update_position();
    }
}
