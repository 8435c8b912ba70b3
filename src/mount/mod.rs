//! The mount orchestrator.
//!
//! [`Mount`] owns both axes, the time/location source and the coordinate
//! transform, and runs the goto, tracking, limit, park, guide and PEC state
//! machines. It has two entry points: command handlers (called when a command
//! arrives) and [`Mount::monitor`] (called at a fixed cadence). Neither blocks;
//! long operations advance one step per monitor tick.
//!
//! # Example
//!
//! ```rust,ignore
//! use mount_motion::{Mount, SimAxis, ManualTimeLocation, Equatorial};
//!
//! let mut mount = Mount::new(&config, SimAxis::default(), SimAxis::default(), tls)?;
//! mount.goto_equ(Equatorial::new(83.8, -5.4))?;
//! loop {
//!     mount.monitor(now_ms());
//! }
//! ```

mod clock;
mod command;
mod goto;
mod guide;
mod limits;
mod monitor;
mod park;
mod pec;
#[cfg(feature = "std")]
mod shared;
pub mod state;
#[cfg(test)]
pub(crate) mod test_support;
mod tracking;

pub use command::CommandReply;
pub use goto::GotoPlan;
pub use guide::MAX_PULSE_GUIDE_MS;
pub use pec::PEC_MAX_BINS;
#[cfg(feature = "std")]
pub use shared::SharedMount;

use heapless::Deque;

use crate::axis::Axis;
use crate::config::units::{Degrees, Steps};
use crate::config::{
    validate_config, AxisConstraints, FeaturesConfig, GuideConfig, Limits, MountConfig,
    ParkPosition,
};
use crate::coords::{
    Coordinate, Equatorial, GemTransform, PierSide, PointingModel, Transform, HOME_AXIS1,
    HOME_AXIS2,
};
use crate::error::{CommandError, CommandResult, Result};
use crate::motion::GotoRates;
use crate::tls::TimeLocationSource;

use clock::SiteClock;
use goto::GotoTarget;
use guide::GuideMachine;
use pec::Pec;
use state::{
    GotoStage, GotoState, GotoType, GuideState, MeridianFlip, MountFault, ParkState, PecState,
    PreferredPierSide, RateCompensation, TrackingState,
};

/// Capacity of the outbound event queue.
pub const EVENT_QUEUE_LEN: usize = 8;

/// Something the host should act on, typically by persisting state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MountEvent {
    /// A park completed at this position.
    ParkSaved(ParkPosition),
    /// The park position was redefined.
    ParkPositionSet(ParkPosition),
    /// A full worm rotation of PEC data was recorded.
    PecRecorded,
    /// Tracking reached the meridian limit; a flip will start next tick.
    MeridianFlipScheduled,
    /// Tracking stopped on a limit.
    LimitFault(MountFault),
}

/// Snapshot of mount state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MountStatus {
    /// Tracking state.
    pub tracking: TrackingState,
    /// Goto state.
    pub goto_state: GotoState,
    /// Goto state before the last transition out of a goto.
    pub goto_state_last: GotoState,
    /// Goto stage.
    pub goto_stage: GotoStage,
    /// Goto type.
    pub goto_type: GotoType,
    /// Guide state.
    pub guide_state: GuideState,
    /// Park state.
    pub park_state: ParkState,
    /// PEC state.
    pub pec_state: PecState,
    /// PEC data available.
    pub pec_recorded: bool,
    /// Rate compensation mode.
    pub rate_compensation: RateCompensation,
    /// Current position in the mount frame.
    pub current: Coordinate,
    /// Pier side.
    pub pier_side: PierSide,
    /// Latched fault.
    pub fault: MountFault,
    /// At the home position.
    pub at_home: bool,
    /// A reference alignment exists.
    pub aligned: bool,
    /// Time and location available.
    pub time_location_ready: bool,
    /// A meridian flip is scheduled for the next tick.
    pub flip_pending: bool,
    /// Meridian flips pause at the home position.
    pub pause_at_home: bool,
    /// A flip is paused at the home position, waiting to be continued.
    pub waiting_home: bool,
    /// Axis1 instrument angle, degrees.
    pub axis1_degrees: f64,
    /// Axis2 instrument angle, degrees.
    pub axis2_degrees: f64,
    /// Axis1 rate compensation, multiple of sidereal.
    pub delta_rate_axis1: f64,
    /// Axis2 rate compensation, multiple of sidereal.
    pub delta_rate_axis2: f64,
    /// Axis1 tracking base rate, steps per second.
    pub steps_per_second_axis1: f64,
    /// Axis1 is slewing at full goto rate.
    pub move_fast_axis1: bool,
    /// Axis2 is slewing at full goto rate.
    pub move_fast_axis2: bool,
}

/// Telescope mount motion controller.
///
/// Generic over:
/// - `A`: axis implementation (both axes share a type)
/// - `S`: time/location source
/// - `T`: coordinate transform (defaults to [`GemTransform`])
pub struct Mount<A, S, T = GemTransform>
where
    A: Axis,
    S: TimeLocationSource,
    T: Transform,
{
    axis1: A,
    axis2: A,
    tls: S,
    transform: T,

    constraints1: AxisConstraints,
    constraints2: AxisConstraints,
    limits: Limits,
    safety_limits_on: bool,
    rates: GotoRates,
    arrival_tolerance: f64,
    meridian_flip: MeridianFlip,
    preferred_pier_side: PreferredPierSide,
    features: FeaturesConfig,
    guide_config: GuideConfig,

    clock: SiteClock,
    last_ms: Option<u64>,
    now_ms: u64,

    // instrument angle = steps / steps_per_degree + index
    index1: f64,
    index2: f64,
    current: Coordinate,
    pier_side: PierSide,
    at_home: bool,
    aligned: bool,

    goto_state: GotoState,
    goto_state_last: GotoState,
    goto_stage: GotoStage,
    goto_type: GotoType,
    goto_target: Option<GotoTarget>,
    start: Coordinate,
    destination: Coordinate,
    destination_side: PierSide,
    flip: bool,
    flip_pending: bool,
    pause_at_home: bool,
    waiting_home: bool,
    waiting_home_continue: bool,
    tracking_before_goto: bool,
    move_fast_axis1: bool,
    move_fast_axis2: bool,

    tracking_state: TrackingState,
    tracking_rate: f64,
    rate_compensation: RateCompensation,
    delta_rate_axis1: f64,
    delta_rate_axis2: f64,
    fault: MountFault,

    guide: GuideMachine,
    pec: Pec,

    park_state: ParkState,
    park_position: Option<ParkPosition>,

    events: Deque<MountEvent, EVENT_QUEUE_LEN>,
}

impl<A, S> Mount<A, S, GemTransform>
where
    A: Axis,
    S: TimeLocationSource,
{
    /// Create a mount with the German equatorial transform.
    ///
    /// The axes are assumed to be at the home position.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` fails validation.
    pub fn new(config: &MountConfig, axis1: A, axis2: A, tls: S) -> Result<Self> {
        let transform = GemTransform::new(config.site.latitude_degrees)
            .with_model(PointingModel::from_config(&config.pointing_model));
        Self::with_transform(config, axis1, axis2, tls, transform)
    }
}

impl<A, S, T> Mount<A, S, T>
where
    A: Axis,
    S: TimeLocationSource,
    T: Transform,
{
    /// Create a mount with a custom transform.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` fails validation.
    pub fn with_transform(
        config: &MountConfig,
        axis1: A,
        axis2: A,
        tls: S,
        transform: T,
    ) -> Result<Self> {
        validate_config(config)?;

        let constraints1 = AxisConstraints::from_config(&config.axis1, 1, config.goto.slew_rate);
        let constraints2 = AxisConstraints::from_config(&config.axis2, 2, config.goto.slew_rate);
        let rates = GotoRates::new(
            &constraints1,
            config.goto.min_us_per_step,
            config.goto.approach.0,
        );
        let pec = Pec::new(
            config.pec.worm_period_seconds,
            constraints1.steps_per_worm_rotation,
        );

        let mut mount = Self {
            axis1,
            axis2,
            tls,
            transform,
            constraints1,
            constraints2,
            limits: Limits::from_config(config),
            safety_limits_on: config.limits.safety_limits,
            rates,
            arrival_tolerance: Degrees::from_arcsec(config.goto.arrival_tolerance_arcsec).0,
            meridian_flip: config.goto.meridian_flip,
            preferred_pier_side: config.goto.preferred_pier_side,
            features: config.features,
            guide_config: config.guide.clone(),
            clock: SiteClock::new(),
            last_ms: None,
            now_ms: 0,
            index1: 0.0,
            index2: 0.0,
            current: Coordinate::default(),
            pier_side: PierSide::None,
            at_home: true,
            aligned: false,
            goto_state: GotoState::None,
            goto_state_last: GotoState::None,
            goto_stage: GotoStage::Start,
            goto_type: GotoType::None,
            goto_target: None,
            start: Coordinate::default(),
            destination: Coordinate::default(),
            destination_side: PierSide::None,
            flip: false,
            flip_pending: false,
            pause_at_home: config.goto.pause_at_home,
            waiting_home: false,
            waiting_home_continue: false,
            tracking_before_goto: false,
            move_fast_axis1: false,
            move_fast_axis2: false,
            tracking_state: TrackingState::None,
            tracking_rate: 1.0,
            rate_compensation: config.tracking.rate_compensation,
            delta_rate_axis1: 0.0,
            delta_rate_axis2: 0.0,
            fault: MountFault::None,
            guide: GuideMachine::new(config.guide.rate, config.guide.pulse_rate),
            pec,
            park_state: ParkState::Unparked,
            park_position: config.park,
            events: Deque::new(),
        };

        mount.zero_at_home();
        mount.refresh_clock();
        info!("mount ready");
        Ok(mount)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Snapshot of the mount state.
    pub fn status(&self) -> MountStatus {
        let (axis1_degrees, axis2_degrees) = self.instrument();
        MountStatus {
            tracking: self.tracking_state,
            goto_state: self.goto_state,
            goto_state_last: self.goto_state_last,
            goto_stage: self.goto_stage,
            goto_type: self.goto_type,
            guide_state: self.guide.state,
            park_state: self.park_state,
            pec_state: self.pec.state,
            pec_recorded: self.pec.recorded,
            rate_compensation: self.rate_compensation,
            current: self.current,
            pier_side: self.pier_side,
            fault: self.fault,
            at_home: self.at_home,
            aligned: self.aligned,
            time_location_ready: self.clock.is_ready(),
            flip_pending: self.flip_pending,
            pause_at_home: self.pause_at_home,
            waiting_home: self.waiting_home,
            axis1_degrees,
            axis2_degrees,
            delta_rate_axis1: self.delta_rate_axis1,
            delta_rate_axis2: self.delta_rate_axis2,
            steps_per_second_axis1: self.constraints1.sidereal_to_steps(self.tracking_rate),
            move_fast_axis1: self.move_fast_axis1,
            move_fast_axis2: self.move_fast_axis2,
        }
    }

    /// Current position in the mount frame.
    pub fn current(&self) -> Coordinate {
        self.current
    }

    /// Current position as right ascension and declination, once time is known.
    pub fn current_equatorial(&self) -> Option<Equatorial> {
        self.clock.lst().map(|lst| self.current.to_equatorial(lst))
    }

    /// Local sidereal time in degrees, once time is known.
    pub fn local_sidereal_time(&self) -> Option<f64> {
        self.clock.lst()
    }

    /// Goto start position captured at the START stage.
    pub fn goto_start(&self) -> Coordinate {
        self.start
    }

    /// Goto destination.
    pub fn goto_destination(&self) -> Coordinate {
        self.destination
    }

    /// Goto state.
    pub fn goto_state(&self) -> GotoState {
        self.goto_state
    }

    /// Goto stage.
    pub fn goto_stage(&self) -> GotoStage {
        self.goto_stage
    }

    /// Park state.
    pub fn park_state(&self) -> ParkState {
        self.park_state
    }

    /// Stored park position, if any.
    pub fn park_position(&self) -> Option<ParkPosition> {
        self.park_position
    }

    /// Runtime limits.
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Goto rates.
    pub fn goto_rates(&self) -> &GotoRates {
        &self.rates
    }

    /// Goto rates, for selecting a rate multiplier.
    pub fn goto_rates_mut(&mut self) -> &mut GotoRates {
        &mut self.rates
    }

    /// Axis1.
    pub fn axis1(&self) -> &A {
        &self.axis1
    }

    /// Axis1, mutable. Commanding it directly bypasses the state machines.
    pub fn axis1_mut(&mut self) -> &mut A {
        &mut self.axis1
    }

    /// Axis2.
    pub fn axis2(&self) -> &A {
        &self.axis2
    }

    /// Axis2, mutable. Commanding it directly bypasses the state machines.
    pub fn axis2_mut(&mut self) -> &mut A {
        &mut self.axis2
    }

    /// Both axes, mutable.
    pub fn axes_mut(&mut self) -> (&mut A, &mut A) {
        (&mut self.axis1, &mut self.axis2)
    }

    /// The time/location source, for feeding it fixes or manual entries.
    pub fn time_location_mut(&mut self) -> &mut S {
        &mut self.tls
    }

    /// The coordinate transform.
    pub fn transform(&self) -> &T {
        &self.transform
    }

    // =========================================================================
    // Reconfiguration
    // =========================================================================

    /// Replace the runtime limits.
    ///
    /// # Errors
    ///
    /// `GotoInProgress` during a goto, `ParameterRange` for inverted limits.
    pub fn set_limits(&mut self, limits: Limits) -> CommandResult {
        if self.goto_state != GotoState::None {
            return Err(CommandError::GotoInProgress);
        }
        if !limits.axis1.is_valid()
            || !limits.axis2.is_valid()
            || limits.min_altitude >= limits.max_altitude
        {
            return Err(CommandError::ParameterRange);
        }
        self.limits = limits;
        info!("limits updated");
        Ok(())
    }

    /// Enable or disable the soft (altitude and meridian) limits.
    pub fn set_safety_limits(&mut self, on: bool) {
        self.safety_limits_on = on;
    }

    /// Allow or forbid pier side changes.
    pub fn set_meridian_flip(&mut self, meridian_flip: MeridianFlip) {
        self.meridian_flip = meridian_flip;
    }

    /// Hold meridian flips at the home position until
    /// [`continue_goto`](Self::continue_goto) is called.
    pub fn set_pause_at_home(&mut self, pause: bool) {
        self.pause_at_home = pause;
    }

    /// Pier side used when free to choose.
    pub fn set_preferred_pier_side(&mut self, preferred: PreferredPierSide) {
        self.preferred_pier_side = preferred;
    }

    /// Record that a reference alignment exists.
    pub fn mark_aligned(&mut self) {
        self.aligned = true;
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Take the oldest pending event.
    pub fn pop_event(&mut self) -> Option<MountEvent> {
        self.events.pop_front()
    }

    /// Drain all pending events.
    pub fn drain_events(&mut self) -> impl Iterator<Item = MountEvent> + '_ {
        core::iter::from_fn(move || self.events.pop_front())
    }

    pub(crate) fn push_event(&mut self, event: MountEvent) {
        if self.events.is_full() {
            // Oldest event is dropped
            let _ = self.events.pop_front();
        }
        let _ = self.events.push_back(event);
    }

    // =========================================================================
    // Position
    // =========================================================================

    /// Instrument angles `(axis1, axis2)` from axis positions.
    pub(crate) fn instrument(&self) -> (f64, f64) {
        (
            self.constraints1.steps_to_degrees(self.axis1.position().value()) + self.index1,
            self.constraints2.steps_to_degrees(self.axis2.position().value()) + self.index2,
        )
    }

    /// Axis positions for instrument angles.
    pub(crate) fn instrument_to_steps(&self, axis1: f64, axis2: f64) -> (Steps, Steps) {
        (
            Steps(self.constraints1.degrees_to_steps(axis1 - self.index1)),
            Steps(self.constraints2.degrees_to_steps(axis2 - self.index2)),
        )
    }

    /// Pier side from the axis2 angle alone.
    pub(crate) fn geometric_pier_side(&self) -> PierSide {
        let (a1, a2) = self.instrument();
        self.transform.instrument_to_mount(a1, a2, PierSide::None).pier_side
    }

    /// Recompute `current` from the axes.
    pub(crate) fn update_position(&mut self) {
        let (a1, a2) = self.instrument();
        let side = if self.goto_state == GotoState::None {
            self.pier_side
        } else {
            PierSide::None
        };
        let mut current = self.transform.instrument_to_mount(a1, a2, side);
        if self.goto_state == GotoState::None {
            current.pier_side = self.pier_side;
        }
        self.current = current;
    }

    /// Define the present axis positions as home.
    pub(crate) fn zero_at_home(&mut self) {
        self.index1 = HOME_AXIS1 - self.constraints1.steps_to_degrees(self.axis1.position().value());
        self.index2 = HOME_AXIS2 - self.constraints2.steps_to_degrees(self.axis2.position().value());
        self.pier_side = PierSide::None;
        self.at_home = true;
        self.update_position();
    }

    /// Latch time and site once the source becomes ready.
    pub(crate) fn refresh_clock(&mut self) {
        if let Some(site) = self.clock.latch(&self.tls) {
            self.transform.set_latitude(site.latitude);
            info!("time/location ready, latitude {}", site.latitude);
        }
    }
}
