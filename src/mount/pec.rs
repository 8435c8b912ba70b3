//! Periodic error correction.
//!
//! One correction bin per second of worm period. Recording integrates axis1
//! guide corrections into the bins over exactly one worm rotation, starting
//! and ending at the worm index; playback adds the recorded correction to
//! axis1's rate.
//!
//! The worm phase comes from axis1's step count when the steps per worm
//! rotation are configured, otherwise from time spent tracking.

use heapless::Vec;
use libm::fmod;

use super::state::{GotoState, PecState, TrackingState};
use super::{Mount, MountEvent};
use crate::axis::Axis;
use crate::coords::Transform;
use crate::error::{CommandError, CommandResult};
use crate::tls::TimeLocationSource;

/// Largest supported worm period, in seconds (one bin each).
pub const PEC_MAX_BINS: usize = 1024;

#[derive(Debug, Clone)]
pub(crate) struct Pec {
    pub(crate) state: PecState,
    pub(crate) recorded: bool,
    bins: Vec<f32, PEC_MAX_BINS>,
    worm_period: f64,
    steps_per_worm: Option<u32>,
    last_steps: i64,
    elapsed: f64,
    bin: usize,
}

impl Pec {
    pub(crate) fn new(worm_period_seconds: u32, steps_per_worm: Option<u32>) -> Self {
        let len = (worm_period_seconds as usize).clamp(1, PEC_MAX_BINS);
        let mut bins = Vec::new();
        // Cannot fail, len is bounded by the capacity
        let _ = bins.resize(len, 0.0);
        Self {
            state: PecState::None,
            recorded: false,
            bins,
            worm_period: len as f64,
            steps_per_worm: steps_per_worm.filter(|&n| n > 0),
            last_steps: 0,
            elapsed: 0.0,
            bin: 0,
        }
    }

    /// Advance the worm phase. Returns the phase in `[0, 1)` and whether the
    /// worm index was crossed going forward.
    ///
    /// A move of more than half a worm rotation in one tick cannot be told
    /// apart from a move the other way and never counts as a crossing.
    fn advance_phase(&mut self, axis1_steps: i64, dt: f64, tracking: bool) -> (f64, bool) {
        match self.steps_per_worm {
            Some(n) => {
                let n = i64::from(n);
                let moved = axis1_steps - self.last_steps;
                let crossed = tracking
                    && moved > 0
                    && moved <= n / 2
                    && axis1_steps.div_euclid(n) != self.last_steps.div_euclid(n);
                self.last_steps = axis1_steps;
                (axis1_steps.rem_euclid(n) as f64 / n as f64, crossed)
            }
            None => {
                let mut crossed = false;
                if tracking {
                    let elapsed = self.elapsed + dt;
                    crossed = elapsed >= self.worm_period && dt <= self.worm_period / 2.0;
                    self.elapsed = fmod(elapsed, self.worm_period);
                }
                (self.elapsed / self.worm_period, crossed)
            }
        }
    }

    /// Advance one tick. Returns true when a recording just completed.
    ///
    /// Index transitions only happen while tracking. When tracking stops a
    /// recording is abandoned and playback suspended; both re-arm for the
    /// next index crossing.
    pub(crate) fn poll(&mut self, axis1_steps: i64, dt: f64, tracking: bool, guide_axis1: f64) -> bool {
        let (phase, crossed) = self.advance_phase(axis1_steps, dt, tracking);
        let len = self.bins.len();
        self.bin = ((phase * len as f64) as usize).min(len - 1);

        if !tracking {
            let suspended = self.state.suspend();
            if suspended != self.state {
                debug!("PEC {:?} -> {:?}, not tracking", self.state, suspended);
                self.state = suspended;
            }
            return false;
        }

        let mut completed = false;
        if crossed {
            let next = self.state.on_index();
            if next == PecState::Record && self.state != PecState::Record {
                self.bins.iter_mut().for_each(|b| *b = 0.0);
            }
            if self.state == PecState::Record && next != PecState::Record {
                self.recorded = true;
                completed = true;
            }
            if next != self.state {
                debug!("PEC {:?} -> {:?} at worm index", self.state, next);
            }
            self.state = next;
        }

        if self.state == PecState::Record {
            if let Some(bin) = self.bins.get_mut(self.bin) {
                *bin += (guide_axis1 * dt) as f32;
            }
        }
        completed
    }

    /// Playback correction in multiples of sidereal.
    pub(crate) fn rate(&self) -> f64 {
        if self.state != PecState::Play {
            return 0.0;
        }
        self.bins.get(self.bin).map_or(0.0, |&b| f64::from(b))
    }

    fn clear(&mut self) {
        self.bins.iter_mut().for_each(|b| *b = 0.0);
        self.recorded = false;
    }
}

impl<A, S, T> Mount<A, S, T>
where
    A: Axis,
    S: TimeLocationSource,
    T: Transform,
{
    /// Arm playback from the next worm index.
    ///
    /// # Errors
    ///
    /// `Unsupported`, `PecNotRecorded`, or `PecTransition` while recording.
    pub fn pec_ready_play(&mut self) -> CommandResult {
        self.pec_enabled()?;
        self.pec.state = self.pec.state.ready_play(self.pec.recorded)?;
        info!("PEC ready to play");
        Ok(())
    }

    /// Arm recording from the next worm index.
    ///
    /// # Errors
    ///
    /// `Unsupported`, or `PecTransition` while playing or recording.
    pub fn pec_ready_record(&mut self) -> CommandResult {
        self.pec_enabled()?;
        self.pec.state = self.pec.state.ready_record()?;
        info!("PEC ready to record");
        Ok(())
    }

    /// Stop PEC. A recording in progress is discarded.
    ///
    /// # Errors
    ///
    /// `Unsupported`.
    pub fn pec_stop(&mut self) -> CommandResult {
        self.pec_enabled()?;
        self.pec.state = PecState::None;
        Ok(())
    }

    /// Erase recorded data.
    ///
    /// # Errors
    ///
    /// `Unsupported`, or `PecTransition` unless PEC is off.
    pub fn pec_clear(&mut self) -> CommandResult {
        self.pec_enabled()?;
        self.pec.state = self.pec.state.clear()?;
        self.pec.clear();
        Ok(())
    }

    /// Recorded correction bins, for the host to persist.
    pub fn pec_data(&self) -> &[f32] {
        &self.pec.bins
    }

    /// Restore correction bins saved by the host.
    ///
    /// # Errors
    ///
    /// `Unsupported`, `PecTransition` unless PEC is off, `ParameterRange` if
    /// the length does not match the worm period.
    pub fn load_pec_data(&mut self, data: &[f32]) -> CommandResult {
        self.pec_enabled()?;
        self.pec.state.clear()?;
        if data.len() != self.pec.bins.len() {
            return Err(CommandError::ParameterRange);
        }
        self.pec.bins.copy_from_slice(data);
        self.pec.recorded = true;
        Ok(())
    }

    fn pec_enabled(&self) -> CommandResult {
        if self.features.pec {
            Ok(())
        } else {
            Err(CommandError::Unsupported)
        }
    }

    /// Track the worm phase, record or play. Called by the monitor.
    pub(crate) fn poll_pec(&mut self, dt: f64) {
        if !self.features.pec {
            return;
        }
        let tracking =
            self.tracking_state == TrackingState::Sidereal && self.goto_state == GotoState::None;
        let steps = self.axis1.position().value();
        if self.pec.poll(steps, dt, tracking, self.guide.axis1) {
            self.push_event(MountEvent::PecRecorded);
            info!("PEC recorded");
        }
    }
}
