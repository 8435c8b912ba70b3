//! Command dispatch.
//!
//! Commands arrive as a code and a decimal parameter string, already split
//! out of whatever framing the transport uses. Every code maps onto one mount
//! operation; its [`CommandReply`] tells the transport what to send back.

use heapless::String;

use super::state::{
    GotoState, GuideDirection, GuideRate, GuideState, ParkState, PecState,
    RateCompensation, TrackingState,
};
use super::Mount;
use crate::axis::Axis;
use crate::coords::{Equatorial, PierSide, Transform};
use crate::error::{CommandError, CommandResult};
use crate::tls::TimeLocationSource;

/// What the transport sends back for an accepted command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandReply {
    /// Reply text.
    pub text: String<32>,
    /// Send the reply without the trailing frame character.
    pub suppress_frame: bool,
    /// Reply with the numeric result instead of `text`: `0` on success,
    /// otherwise [`CommandError::code`].
    pub numeric_reply: bool,
}

impl CommandReply {
    /// No reply at all.
    pub fn silent() -> Self {
        Self {
            suppress_frame: true,
            ..Self::default()
        }
    }

    /// A numeric result.
    pub fn numeric() -> Self {
        Self {
            numeric_reply: true,
            ..Self::default()
        }
    }

    /// A text reply. Text longer than the reply buffer is truncated.
    pub fn text(text: &str) -> Self {
        let mut reply = Self::default();
        for c in text.chars() {
            if reply.text.push(c).is_err() {
                break;
            }
        }
        reply
    }

    fn unframed(mut self) -> Self {
        self.suppress_frame = true;
        self
    }
}

impl<A, S, T> Mount<A, S, T>
where
    A: Axis,
    S: TimeLocationSource,
    T: Transform,
{
    /// Execute a command by code.
    ///
    /// | code | parameter | operation |
    /// |------|-----------|-----------|
    /// | `MS` | `ra,dec` | goto |
    /// | `MA` | `ra,dec` | goto, then sync |
    /// | `CM` | `ra,dec` | sync |
    /// | `Q` | | abort |
    /// | `hC` `hF` `hP` `hQ` `hR` | | home, reset home, park, set park, unpark |
    /// | `Te` `Td` | | tracking on, off |
    /// | `TR` | `0..=4` | rate compensation |
    /// | `Mg` | `d,ms` | pulse guide, `d` one of `n s e w` |
    /// | `Me` `Mw` `Mn` `Ms` | | guide |
    /// | `Qe` `Qw` `Qn` `Qs` | | guide stop |
    /// | `R` | `0..=9` | guide rate |
    /// | `$QZ+` `$QZ-` `$QZ/` `$QZZ` | | PEC play, stop, record, clear |
    /// | `GU` | | status string |
    /// | `CE` | | reset general errors |
    /// | `A+` | | mark aligned |
    /// | `SX97` | `0` or `1` | pause meridian flips at home |
    /// | `SX98` | | continue a flip paused at home |
    ///
    /// Right ascension and declination are decimal degrees.
    ///
    /// # Errors
    ///
    /// `UnknownCommand`, `ParameterRange` for a malformed parameter, or the
    /// operation's own error.
    pub fn command(&mut self, code: &str, parameter: &str) -> CommandResult<CommandReply> {
        debug!("command {} {}", code, parameter);
        let reply = match code {
            "MS" => {
                self.goto_equ(parse_equatorial(parameter)?)?;
                CommandReply::numeric().unframed()
            }
            "MA" => {
                self.goto_equ_sync(parse_equatorial(parameter)?)?;
                CommandReply::numeric().unframed()
            }
            "CM" => {
                self.sync_equ(parse_equatorial(parameter)?)?;
                CommandReply::text("N/A")
            }
            "Q" => {
                self.abort();
                CommandReply::silent()
            }
            "hC" => self.goto_home().map(|()| CommandReply::numeric())?,
            "hF" => self.reset_home().map(|()| CommandReply::numeric())?,
            "hP" => self.park().map(|()| CommandReply::numeric())?,
            "hQ" => self.set_park().map(|()| CommandReply::numeric())?,
            "hR" => self.unpark().map(|()| CommandReply::numeric())?,
            "Te" => self
                .set_tracking_state(TrackingState::Sidereal)
                .map(|()| CommandReply::numeric())?,
            "Td" => self
                .set_tracking_state(TrackingState::None)
                .map(|()| CommandReply::numeric())?,
            "TR" => {
                let mode =
                    RateCompensation::from_index(parse_index(parameter)?).ok_or(CommandError::ParameterRange)?;
                self.set_rate_compensation(mode);
                CommandReply::numeric()
            }
            "Mg" => {
                let (direction, duration) = parse_pulse(parameter)?;
                self.pulse_guide(direction, duration)?;
                CommandReply::silent()
            }
            "Me" | "Mw" | "Mn" | "Ms" => {
                let direction = direction_of(code)?;
                self.guide(direction, self.guide.rate)?;
                CommandReply::silent()
            }
            "Qe" | "Qw" | "Qn" | "Qs" => {
                self.guide_stop(direction_of(code)?.axis())?;
                CommandReply::silent()
            }
            "R" => {
                let rate = GuideRate::from_index(parse_index(parameter)?).ok_or(CommandError::ParameterRange)?;
                self.set_guide_rate(rate);
                CommandReply::silent()
            }
            "$QZ+" => self.pec_ready_play().map(|()| CommandReply::numeric())?,
            "$QZ-" => self.pec_stop().map(|()| CommandReply::numeric())?,
            "$QZ/" => self.pec_ready_record().map(|()| CommandReply::numeric())?,
            "$QZZ" => self.pec_clear().map(|()| CommandReply::numeric())?,
            "GU" => CommandReply {
                text: self.status_string(),
                ..CommandReply::default()
            },
            "CE" => {
                self.reset_general_errors();
                CommandReply::numeric()
            }
            "A+" => {
                self.mark_aligned();
                CommandReply::numeric()
            }
            "SX97" => {
                let pause = match parse_index(parameter)? {
                    0 => false,
                    1 => true,
                    _ => return Err(CommandError::ParameterRange),
                };
                self.set_pause_at_home(pause);
                CommandReply::numeric()
            }
            "SX98" => {
                self.continue_goto();
                CommandReply::numeric()
            }
            _ => return Err(CommandError::UnknownCommand),
        };
        Ok(reply)
    }

    /// Compact status flags, one character each.
    ///
    /// `n` not tracking, `N` no goto, park `p`/`I`/`P`/`F` (unparked,
    /// parking, parked, failed), PEC `,`/`~`/`;`/`^` (ready play, play,
    /// ready record, record), `H` at home, `w` flip waiting at home, `G`/`g` guiding/pulse guiding,
    /// rate compensation `r`/`s`/`t`/`u`, pier side `E`/`W`, `A` aligned,
    /// then the fault code digit.
    pub fn status_string(&self) -> String<32> {
        let mut text: String<32> = String::new();
        let mut flag = |c: char| {
            let _ = text.push(c);
        };

        if self.tracking_state == TrackingState::None {
            flag('n');
        }
        if self.goto_state == GotoState::None {
            flag('N');
        }
        match self.park_state {
            ParkState::Unparked => flag('p'),
            ParkState::Parking => flag('I'),
            ParkState::Parked => flag('P'),
            ParkState::ParkFailed => flag('F'),
            ParkState::None => {}
        }
        match self.pec.state {
            PecState::ReadyPlay => flag(','),
            PecState::Play => flag('~'),
            PecState::ReadyRecord => flag(';'),
            PecState::Record => flag('^'),
            PecState::None => {}
        }
        if self.at_home {
            flag('H');
        }
        if self.waiting_home {
            flag('w');
        }
        match self.guide.state {
            GuideState::Guide => flag('G'),
            GuideState::PulseGuide => flag('g'),
            GuideState::None => {}
        }
        match self.rate_compensation {
            RateCompensation::RefrRa => flag('r'),
            RateCompensation::RefrBoth => flag('s'),
            RateCompensation::FullRa => flag('t'),
            RateCompensation::FullBoth => flag('u'),
            RateCompensation::None => {}
        }
        match self.pier_side {
            PierSide::East => flag('E'),
            PierSide::West => flag('W'),
            PierSide::None => {}
        }
        if self.aligned {
            flag('A');
        }
        flag(char::from_digit(u32::from(self.fault.code()), 10).unwrap_or('9'));
        text
    }
}

fn parse_f64(s: &str) -> CommandResult<f64> {
    s.trim().parse::<f64>().map_err(|_| CommandError::ParameterRange)
}

fn parse_index(s: &str) -> CommandResult<u8> {
    s.trim().parse::<u8>().map_err(|_| CommandError::ParameterRange)
}

fn parse_equatorial(s: &str) -> CommandResult<Equatorial> {
    let (ra, dec) = s.split_once(',').ok_or(CommandError::ParameterRange)?;
    let (ra, dec) = (parse_f64(ra)?, parse_f64(dec)?);
    if !(0.0..360.0).contains(&ra) || !(-90.0..=90.0).contains(&dec) {
        return Err(CommandError::ParameterRange);
    }
    Ok(Equatorial::new(ra, dec))
}

fn parse_pulse(s: &str) -> CommandResult<(GuideDirection, u32)> {
    let (direction, duration) = s.split_once(',').ok_or(CommandError::ParameterRange)?;
    let mut letters = direction.trim().chars();
    let direction = match (letters.next(), letters.next()) {
        (Some(c), None) => GuideDirection::from_letter(c),
        _ => None,
    }
    .ok_or(CommandError::ParameterRange)?;
    let duration = duration
        .trim()
        .parse::<u32>()
        .map_err(|_| CommandError::ParameterRange)?;
    Ok((direction, duration))
}

// Second letter of a guide or guide-stop code
fn direction_of(code: &str) -> CommandResult<GuideDirection> {
    code.chars()
        .nth(1)
        .and_then(GuideDirection::from_letter)
        .ok_or(CommandError::UnknownCommand)
}
