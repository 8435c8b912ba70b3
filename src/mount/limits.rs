//! Limit enforcement and pier side selection.
//!
//! Axis travel is mechanical and always enforced. Altitude and meridian
//! allowances are soft limits, enforced while `safety_limits_on`.

use super::goto::GotoPlan;
use super::state::{GotoState, MeridianFlip, MountFault, PreferredPierSide, TrackingState};
use super::{Mount, MountEvent};
use crate::axis::Axis;
use crate::coords::{Coordinate, PierSide, Transform};
use crate::error::{CommandError, CommandResult};
use crate::tls::TimeLocationSource;

impl<A, S, T> Mount<A, S, T>
where
    A: Axis,
    S: TimeLocationSource,
    T: Transform,
{
    /// Whether the mount may change pier side on its own.
    pub(crate) fn flip_allowed(&self) -> bool {
        self.limits.auto_meridian_flip && self.meridian_flip == MeridianFlip::Always
    }

    pub(crate) fn check_altitude(&self, coord: &Coordinate) -> CommandResult {
        if !self.safety_limits_on {
            return Ok(());
        }
        let alt = self.transform.equ_to_hor(coord).alt;
        if alt < self.limits.min_altitude {
            Err(CommandError::BelowHorizon)
        } else if alt > self.limits.max_altitude {
            Err(CommandError::AboveOverhead)
        } else {
            Ok(())
        }
    }

    /// Mechanical travel of both axes for a coordinate on its pier side.
    pub(crate) fn check_travel(&self, coord: &Coordinate) -> CommandResult {
        let (a1, a2) = self.transform.mount_to_instrument(coord);
        if a1 < self.limits.axis1.min.0 {
            return Err(CommandError::LimitEast);
        }
        if a1 > self.limits.axis1.max.0 {
            return Err(CommandError::LimitWest);
        }
        if a2 < self.limits.axis2.min.0 {
            return Err(CommandError::LimitSouth);
        }
        if a2 > self.limits.axis2.max.0 {
            return Err(CommandError::LimitNorth);
        }
        Ok(())
    }

    /// Meridian allowance for a coordinate on its pier side.
    fn check_meridian(&self, coord: &Coordinate) -> CommandResult {
        if !self.safety_limits_on {
            return Ok(());
        }
        let (a1, _) = self.transform.mount_to_instrument(coord);
        match coord.pier_side {
            PierSide::East if a1 < -90.0 - self.limits.past_meridian_e => {
                Err(CommandError::LimitEast)
            }
            PierSide::West if a1 > 90.0 + self.limits.past_meridian_w => {
                Err(CommandError::LimitWest)
            }
            _ => Ok(()),
        }
    }

    /// Check a destination against every limit on one pier side.
    pub(crate) fn check_destination(&self, coord: &Coordinate, side: PierSide) -> CommandResult {
        let on_side = coord.on_side(side);
        self.check_travel(&on_side)?;
        self.check_meridian(&on_side)
    }

    /// Pick the pier side a destination is reached from.
    ///
    /// At home the preferred side wins when reachable, otherwise the other
    /// side. Away from home the mount stays on its side unless a flip is both
    /// wanted (or required) and allowed.
    pub(crate) fn select_pier_side(&self, coord: &Coordinate) -> CommandResult<GotoPlan> {
        let natural = self.transform.pier_side_for(coord.h);
        let preferred = match self.preferred_pier_side {
            PreferredPierSide::East => PierSide::East,
            PreferredPierSide::West => PierSide::West,
            PreferredPierSide::Best => natural,
        };

        let current = self.pier_side;
        if current == PierSide::None {
            return match self.check_destination(coord, preferred) {
                Ok(()) => Ok(stay(preferred)),
                Err(e) => self
                    .check_destination(coord, preferred.other())
                    .map(|()| stay(preferred.other()))
                    .map_err(|_| e),
            };
        }

        let want = match self.preferred_pier_side {
            PreferredPierSide::Best => current,
            _ => preferred,
        };
        let flip_allowed = self.flip_allowed();

        if want != current && flip_allowed && self.check_destination(coord, want).is_ok() {
            return Ok(GotoPlan {
                pier_side: want,
                flip: true,
            });
        }
        match self.check_destination(coord, current) {
            Ok(()) => Ok(stay(current)),
            Err(e) => {
                let other = current.other();
                if flip_allowed && self.check_destination(coord, other).is_ok() {
                    Ok(GotoPlan {
                        pier_side: other,
                        flip: true,
                    })
                } else {
                    Err(e)
                }
            }
        }
    }

    /// The limit the current position violates while tracking, if any.
    ///
    /// Checked against the position at this tick; at tracking and guide
    /// rates the axes move a few arcseconds per tick at most.
    pub(crate) fn tracking_limit_fault(&self) -> Option<MountFault> {
        let (a1, a2) = self.instrument();
        if !self.limits.axis1.contains(a1) {
            return Some(MountFault::Axis1Limit);
        }
        if !self.limits.axis2.contains(a2) {
            return Some(MountFault::Axis2Limit);
        }
        if !self.safety_limits_on {
            return None;
        }

        let alt = self.transform.equ_to_hor(&self.current).alt;
        if alt < self.limits.min_altitude {
            return Some(MountFault::AltitudeMin);
        }
        if alt > self.limits.max_altitude {
            return Some(MountFault::AltitudeMax);
        }
        match self.pier_side {
            PierSide::East if a1 < -90.0 - self.limits.past_meridian_e => {
                Some(MountFault::MeridianEast)
            }
            PierSide::West if a1 > 90.0 + self.limits.past_meridian_w => {
                Some(MountFault::MeridianWest)
            }
            _ => None,
        }
    }

    /// Enforce limits while tracking or guiding. A meridian limit on the
    /// current side schedules a flip when allowed; anything else stops
    /// tracking and latches a fault.
    pub(crate) fn check_tracking_limits(&mut self) {
        if self.goto_state != GotoState::None || self.flip_pending {
            return;
        }
        if self.tracking_state == TrackingState::None && self.guide.is_idle() {
            return;
        }
        let Some(fault) = self.tracking_limit_fault() else {
            return;
        };

        let meridian = matches!(fault, MountFault::MeridianEast | MountFault::MeridianWest);
        if meridian && self.flip_allowed() && self.clock.is_ready() {
            self.flip_pending = true;
            self.push_event(MountEvent::MeridianFlipScheduled);
            info!("meridian limit reached, flip scheduled");
            return;
        }

        self.tracking_state = TrackingState::None;
        self.guide_cancel_all();
        if self.fault != fault {
            self.fault = fault;
            self.push_event(MountEvent::LimitFault(fault));
            warn!("limit fault {:?}, tracking stopped", fault);
        }
    }
}

fn stay(pier_side: PierSide) -> GotoPlan {
    GotoPlan {
        pier_side,
        flip: false,
    }
}
