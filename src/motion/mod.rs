//! Goto slew rate planning.
//!
//! Per-axis rates for the fast and approach phases of a goto, derived from
//! the configured slew rate and the step generator's limits.

mod profile;

pub use profile::{GotoRateMultiplier, GotoRates, SlewPhase, APPROACH_FLOOR};
