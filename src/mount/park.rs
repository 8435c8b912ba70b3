//! Park, unpark and home reset.

use libm::fabs;

use super::goto::{GotoPlan, GotoTarget};
use super::state::{GotoStage, GotoState, GotoType, MountFault, ParkState, PecState, TrackingState};
use super::{Mount, MountEvent};
use crate::axis::Axis;
use crate::config::units::Degrees;
use crate::config::ParkPosition;
use crate::coords::{PierSide, Transform, HOME_AXIS1, HOME_AXIS2};
use crate::error::{CommandError, CommandResult};
use crate::tls::TimeLocationSource;

impl<A, S, T> Mount<A, S, T>
where
    A: Axis,
    S: TimeLocationSource,
    T: Transform,
{
    /// Slew to the park position (home when none is stored) and park there.
    ///
    /// Tracking and guiding stop. The park state is `Parking` until the goto
    /// ends, then `Parked` or `ParkFailed`.
    ///
    /// # Errors
    ///
    /// `ParkInProgress`, `ParkFailed`, `GotoInProgress`.
    pub fn park(&mut self) -> CommandResult {
        let parking = self.park_state.begin_parking()?;
        if self.goto_state.is_slewing() {
            return Err(CommandError::GotoInProgress);
        }

        let position = self.park_target();
        let flip = position.pier_side != PierSide::None
            && self.pier_side != PierSide::None
            && position.pier_side != self.pier_side;
        let plan = GotoPlan {
            pier_side: position.pier_side,
            flip,
        };
        let target = GotoTarget::Instrument {
            axis1: position.axis1.0,
            axis2: position.axis2.0,
        };

        self.park_state = parking;
        self.begin_goto(GotoState::Goto, GotoType::Park, target, plan);
        self.tracking_before_goto = false;
        info!("parking");
        Ok(())
    }

    /// Leave the park position without moving; tracking resumes.
    ///
    /// # Errors
    ///
    /// `NotParked`, `ParkInProgress`, `ParkFailed`.
    pub fn unpark(&mut self) -> CommandResult {
        self.park_state = self.park_state.unpark()?;
        if self.fault == MountFault::None {
            self.tracking_state = TrackingState::Sidereal;
        }
        info!("unparked");
        Ok(())
    }

    /// Store the current position as the park position.
    ///
    /// # Errors
    ///
    /// `GotoInProgress` during a goto, `ParkFailed` after a failed park.
    pub fn set_park(&mut self) -> CommandResult {
        if self.goto_state != GotoState::None {
            return Err(CommandError::GotoInProgress);
        }
        if self.park_state == ParkState::ParkFailed {
            return Err(CommandError::ParkFailed);
        }
        let (axis1, axis2) = self.instrument();
        let position = ParkPosition {
            axis1: Degrees(axis1),
            axis2: Degrees(axis2),
            pier_side: self.pier_side,
        };
        self.park_position = Some(position);
        self.push_event(MountEvent::ParkPositionSet(position));
        info!("park position set: {} {}", axis1, axis2);
        Ok(())
    }

    /// Redefine the present axis positions as home and clear every motion
    /// state. This is the only way out of `ParkFailed`.
    ///
    /// # Errors
    ///
    /// `GotoInProgress` while a goto is active, including an abort whose
    /// axes have not yet stopped.
    pub fn reset_home(&mut self) -> CommandResult {
        if self.goto_state != GotoState::None {
            return Err(CommandError::GotoInProgress);
        }
        self.axis1.stop();
        self.axis2.stop();

        self.goto_state = GotoState::None;
        self.goto_stage = GotoStage::Start;
        self.goto_type = GotoType::None;
        self.goto_target = None;
        self.flip_pending = false;
        self.clear_waiting_home();
        self.tracking_before_goto = false;
        self.tracking_state = TrackingState::None;
        self.delta_rate_axis1 = 0.0;
        self.delta_rate_axis2 = 0.0;
        self.guide_cancel_all();
        self.pec.state = PecState::None;
        self.fault = MountFault::None;
        self.park_state = ParkState::Unparked;

        self.zero_at_home();
        info!("home reset");
        Ok(())
    }

    /// Clear a latched general fault.
    pub fn reset_general_errors(&mut self) {
        if self.fault != MountFault::None {
            info!("fault {:?} cleared", self.fault);
        }
        self.fault = MountFault::None;
    }

    fn park_target(&self) -> ParkPosition {
        self.park_position.unwrap_or(ParkPosition {
            axis1: Degrees(HOME_AXIS1),
            axis2: Degrees(HOME_AXIS2),
            pier_side: PierSide::None,
        })
    }

    /// Verify the final position of a park goto.
    pub(crate) fn finish_park(&mut self) {
        let target = self.park_target();
        let (axis1, axis2) = self.instrument();
        let ok = fabs(axis1 - target.axis1.0) <= self.arrival_tolerance
            && fabs(axis2 - target.axis2.0) <= self.arrival_tolerance;

        self.park_state = self.park_state.finish_parking(ok);
        if ok {
            self.tracking_state = TrackingState::None;
            self.push_event(MountEvent::ParkSaved(target));
            info!("parked");
        } else {
            warn!(
                "park failed: off by {} {} arcsec",
                Degrees(axis1 - target.axis1.0).to_arcsec(),
                Degrees(axis2 - target.axis2.0).to_arcsec()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mount::test_support::{mount_at, step_until};

    #[test]
    fn test_park_at_home_and_unpark() {
        let mut mount = mount_at(45.0);
        mount.set_tracking_state(TrackingState::Sidereal).unwrap();
        mount.park().unwrap();
        assert_eq!(mount.park_state(), ParkState::Parking);
        assert_eq!(mount.park(), Err(CommandError::ParkInProgress));

        step_until(&mut mount, 200, |m| m.park_state() != ParkState::Parking);
        assert_eq!(mount.park_state(), ParkState::Parked);
        assert_eq!(mount.status().tracking, TrackingState::None);
        assert!(matches!(mount.pop_event(), Some(MountEvent::ParkSaved(_))));

        mount.unpark().unwrap();
        assert_eq!(mount.park_state(), ParkState::Unparked);
        assert_eq!(mount.status().tracking, TrackingState::Sidereal);
        assert_eq!(mount.unpark(), Err(CommandError::NotParked));
    }

    #[test]
    fn test_reset_home_clears_fault_and_park_failure() {
        let mut mount = mount_at(45.0);
        mount.park_state = ParkState::ParkFailed;
        mount.fault = MountFault::GotoFailed;
        assert_eq!(mount.park(), Err(CommandError::ParkFailed));

        mount.reset_home().unwrap();
        assert_eq!(mount.park_state(), ParkState::Unparked);
        assert_eq!(mount.status().fault, MountFault::None);
        assert!(mount.status().at_home);
    }

    #[test]
    fn test_reset_home_refused_until_abort_settles() {
        let mut mount = mount_at(45.0);
        let lst = mount.local_sidereal_time().unwrap();
        mount
            .goto_equ(crate::coords::Equatorial::new(lst - 30.0, 20.0))
            .unwrap();
        step_until(&mut mount, 5, |_| false);
        mount.abort();
        assert_eq!(mount.goto_state(), GotoState::GotoAbort);
        assert_eq!(mount.reset_home(), Err(CommandError::GotoInProgress));
        assert_eq!(mount.goto_state(), GotoState::GotoAbort);

        step_until(&mut mount, 10, |m| m.goto_state() == GotoState::None);
        assert!(mount.reset_home().is_ok());
        assert!(mount.status().at_home);
    }

    #[test]
    fn test_set_park_emits_position() {
        let mut mount = mount_at(45.0);
        mount.set_park().unwrap();
        match mount.pop_event() {
            Some(MountEvent::ParkPositionSet(p)) => {
                assert!((p.axis2.0 - HOME_AXIS2).abs() < 1e-9);
                assert_eq!(p.pier_side, PierSide::None);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }
}
