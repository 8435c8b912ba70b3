//! Mount state enumerations and their transitions.
//!
//! Every state machine is a closed enum. Transitions that depend only on the
//! machine itself are methods returning the next variant or the
//! [`CommandError`] that rejects the request; a rejected transition leaves the
//! caller's state untouched because nothing is assigned until `?` succeeds.

use serde::Deserialize;

use crate::error::CommandError;

/// Tracking state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TrackingState {
    /// Axes hold position.
    #[default]
    None,
    /// Axis1 follows the sky at the tracking rate.
    Sidereal,
}

/// Goto state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GotoState {
    /// No goto.
    #[default]
    None,
    /// Slewing to a target.
    Goto,
    /// Slewing to a target, then syncing to it on arrival.
    GotoSync,
    /// Stopping; cleared once both axes report stopped.
    GotoAbort,
}

impl GotoState {
    /// True while a goto commands motion (abort excluded).
    pub fn is_slewing(self) -> bool {
        matches!(self, GotoState::Goto | GotoState::GotoSync)
    }
}

/// Goto staging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GotoStage {
    /// No staging.
    None,
    /// Waiting to capture the start position.
    #[default]
    Start,
    /// Routing through the meridian-flip waypoint.
    Waypoint,
    /// Moving to the destination.
    Destination,
}

impl GotoStage {
    /// The stage following `self`. Staging never regresses; only an abort
    /// resets it to [`GotoStage::Start`].
    pub fn advance(self, flip: bool) -> GotoStage {
        match self {
            GotoStage::None | GotoStage::Start if flip => GotoStage::Waypoint,
            GotoStage::None | GotoStage::Start => GotoStage::Destination,
            GotoStage::Waypoint => GotoStage::Destination,
            GotoStage::Destination => GotoStage::Start,
        }
    }
}

/// What a goto is heading for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GotoType {
    /// A sky target.
    #[default]
    None,
    /// The home position.
    Home,
    /// The park position.
    Park,
}

/// Guide state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GuideState {
    /// Not guiding.
    #[default]
    None,
    /// Continuous guiding until stopped.
    Guide,
    /// Timed guide pulse.
    PulseGuide,
}

/// Guide direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GuideDirection {
    /// Declination increasing.
    North,
    /// Declination decreasing.
    South,
    /// Hour angle decreasing.
    East,
    /// Hour angle increasing.
    West,
}

impl GuideDirection {
    /// Axis number moved by this direction.
    pub fn axis(self) -> GuideAxis {
        match self {
            GuideDirection::East | GuideDirection::West => GuideAxis::Axis1,
            GuideDirection::North | GuideDirection::South => GuideAxis::Axis2,
        }
    }

    /// Sign of the rate in mount coordinates.
    pub fn sign(self) -> f64 {
        match self {
            GuideDirection::West | GuideDirection::North => 1.0,
            GuideDirection::East | GuideDirection::South => -1.0,
        }
    }

    /// Parse the LX200 direction letter.
    pub fn from_letter(c: char) -> Option<Self> {
        match c {
            'n' => Some(GuideDirection::North),
            's' => Some(GuideDirection::South),
            'e' => Some(GuideDirection::East),
            'w' => Some(GuideDirection::West),
            _ => None,
        }
    }
}

/// Axis selector for guide stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GuideAxis {
    /// Hour angle axis.
    Axis1,
    /// Declination axis.
    Axis2,
    /// Both axes.
    Both,
}

/// Guide rate, in multiples of the sidereal rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GuideRate {
    /// 0.25×
    #[serde(rename = "0.25x")]
    Quarter,
    /// 0.5×
    #[serde(rename = "0.5x")]
    Half,
    /// 1×
    #[serde(rename = "1x")]
    X1,
    /// 2×
    #[serde(rename = "2x")]
    X2,
    /// 4×
    #[serde(rename = "4x")]
    X4,
    /// 8×
    #[serde(rename = "8x")]
    X8,
    /// 20×
    #[serde(rename = "20x")]
    X20,
    /// 48×
    #[serde(rename = "48x")]
    X48,
    /// Half the slew rate.
    #[serde(rename = "half_max")]
    HalfMax,
    /// The slew rate.
    #[serde(rename = "max")]
    Max,
    /// Per-axis rates from configuration.
    #[serde(rename = "custom")]
    Custom,
}

impl GuideRate {
    /// Rate selected by the LX200 index `0..=9`.
    pub fn from_index(index: u8) -> Option<Self> {
        const TABLE: [GuideRate; 10] = [
            GuideRate::Quarter,
            GuideRate::Half,
            GuideRate::X1,
            GuideRate::X2,
            GuideRate::X4,
            GuideRate::X8,
            GuideRate::X20,
            GuideRate::X48,
            GuideRate::HalfMax,
            GuideRate::Max,
        ];
        TABLE.get(index as usize).copied()
    }

    /// Multiple of sidereal, given the slew rate as a multiple of sidereal.
    ///
    /// Returns `None` for [`GuideRate::Custom`], whose rate is per axis.
    pub fn multiplier(self, max_sidereal: f64) -> Option<f64> {
        match self {
            GuideRate::Quarter => Some(0.25),
            GuideRate::Half => Some(0.5),
            GuideRate::X1 => Some(1.0),
            GuideRate::X2 => Some(2.0),
            GuideRate::X4 => Some(4.0),
            GuideRate::X8 => Some(8.0),
            GuideRate::X20 => Some(20.0),
            GuideRate::X48 => Some(48.0),
            GuideRate::HalfMax => Some(max_sidereal / 2.0),
            GuideRate::Max => Some(max_sidereal),
            GuideRate::Custom => None,
        }
    }
}

/// Park state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParkState {
    /// Not yet known.
    None,
    /// Free to move.
    #[default]
    Unparked,
    /// Moving to the park position.
    Parking,
    /// At the park position; motion refused.
    Parked,
    /// Last park failed; cleared only by resetting home.
    ParkFailed,
}

impl ParkState {
    /// Begin parking. Allowed from unparked or parked (re-park).
    pub fn begin_parking(self) -> Result<ParkState, CommandError> {
        match self {
            ParkState::Unparked | ParkState::Parked | ParkState::None => Ok(ParkState::Parking),
            ParkState::Parking => Err(CommandError::ParkInProgress),
            ParkState::ParkFailed => Err(CommandError::ParkFailed),
        }
    }

    /// Outcome of a park goto.
    pub fn finish_parking(self, success: bool) -> ParkState {
        match self {
            ParkState::Parking if success => ParkState::Parked,
            ParkState::Parking => ParkState::ParkFailed,
            other => other,
        }
    }

    /// Unpark without motion.
    pub fn unpark(self) -> Result<ParkState, CommandError> {
        match self {
            ParkState::Parked => Ok(ParkState::Unparked),
            ParkState::Parking => Err(CommandError::ParkInProgress),
            ParkState::ParkFailed => Err(CommandError::ParkFailed),
            ParkState::Unparked | ParkState::None => Err(CommandError::NotParked),
        }
    }

    /// Error refusing motion in this state, if any.
    pub fn motion_error(self) -> Option<CommandError> {
        match self {
            ParkState::Parked => Some(CommandError::Parked),
            ParkState::Parking => Some(CommandError::ParkInProgress),
            ParkState::ParkFailed => Some(CommandError::ParkFailed),
            ParkState::Unparked | ParkState::None => None,
        }
    }
}

/// Periodic error correction state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PecState {
    /// Off.
    #[default]
    None,
    /// Playback starts at the next worm index.
    ReadyPlay,
    /// Playing back recorded corrections.
    Play,
    /// Recording starts at the next worm index.
    ReadyRecord,
    /// Recording guide corrections.
    Record,
}

impl PecState {
    /// Arm playback. Requires recorded data; refused while recording.
    pub fn ready_play(self, recorded: bool) -> Result<PecState, CommandError> {
        match self {
            PecState::Record => Err(CommandError::PecTransition),
            _ if !recorded => Err(CommandError::PecNotRecorded),
            PecState::None | PecState::ReadyRecord | PecState::ReadyPlay | PecState::Play => {
                Ok(PecState::ReadyPlay)
            }
        }
    }

    /// Arm recording. Refused while playing or recording.
    pub fn ready_record(self) -> Result<PecState, CommandError> {
        match self {
            PecState::None | PecState::ReadyPlay | PecState::ReadyRecord => Ok(PecState::ReadyRecord),
            PecState::Play | PecState::Record => Err(CommandError::PecTransition),
        }
    }

    /// Transition taken when axis1 crosses the worm index.
    pub fn on_index(self) -> PecState {
        match self {
            PecState::ReadyPlay => PecState::Play,
            PecState::ReadyRecord => PecState::Record,
            PecState::Record => PecState::ReadyPlay,
            other => other,
        }
    }

    /// State to fall back to when tracking stops. Recording and playback
    /// re-arm and resume from the next index crossing.
    pub fn suspend(self) -> PecState {
        match self {
            PecState::Play => PecState::ReadyPlay,
            PecState::Record => PecState::ReadyRecord,
            other => other,
        }
    }

    /// Clearing recorded data is only allowed while PEC is off.
    pub fn clear(self) -> Result<PecState, CommandError> {
        match self {
            PecState::None => Ok(PecState::None),
            _ => Err(CommandError::PecTransition),
        }
    }
}

/// Differential tracking rate compensation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum RateCompensation {
    /// Sidereal only.
    #[default]
    None,
    /// Refraction on axis1.
    RefrRa,
    /// Refraction on both axes.
    RefrBoth,
    /// Refraction and pointing model on axis1.
    FullRa,
    /// Refraction and pointing model on both axes.
    FullBoth,
}

impl RateCompensation {
    /// Mode selected by the command index `0..=4`.
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(RateCompensation::None),
            1 => Some(RateCompensation::RefrRa),
            2 => Some(RateCompensation::RefrBoth),
            3 => Some(RateCompensation::FullRa),
            4 => Some(RateCompensation::FullBoth),
            _ => None,
        }
    }

    /// Whether the pointing model contributes.
    pub fn uses_model(self) -> bool {
        matches!(self, RateCompensation::FullRa | RateCompensation::FullBoth)
    }

    /// Whether axis2 is compensated.
    pub fn both_axes(self) -> bool {
        matches!(self, RateCompensation::RefrBoth | RateCompensation::FullBoth)
    }
}

/// Whether a goto may change pier side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum MeridianFlip {
    /// Never change side once on one.
    Never,
    /// Flip when the destination requires it.
    #[default]
    Always,
}

/// Pier side chosen when the mount is free to choose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum PreferredPierSide {
    /// The side the hour angle naturally falls on.
    #[default]
    Best,
    /// East.
    East,
    /// West.
    West,
}

/// Latched general fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MountFault {
    /// No fault.
    #[default]
    None,
    /// Tracked below the minimum altitude.
    AltitudeMin,
    /// Tracked above the maximum altitude.
    AltitudeMax,
    /// Tracked past the east meridian allowance.
    MeridianEast,
    /// Tracked past the west meridian allowance.
    MeridianWest,
    /// Axis1 travel exceeded.
    Axis1Limit,
    /// Axis2 travel exceeded.
    Axis2Limit,
    /// A goto stalled before reaching its target.
    GotoFailed,
}

impl MountFault {
    /// Numeric code shown in the status string.
    pub fn code(self) -> u8 {
        match self {
            MountFault::None => 0,
            MountFault::AltitudeMin => 1,
            MountFault::AltitudeMax => 2,
            MountFault::MeridianEast => 3,
            MountFault::MeridianWest => 4,
            MountFault::Axis1Limit => 5,
            MountFault::Axis2Limit => 6,
            MountFault::GotoFailed => 7,
        }
    }
}
