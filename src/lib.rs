//! # mount-motion
//!
//! Motion control core for a German equatorial telescope mount.
//!
//! ## Features
//!
//! - **Goto staging**: validated gotos advance START → WAYPOINT → DESTINATION,
//!   routing meridian flips through the pole
//! - **Limit enforcement**: axis travel, horizon/overhead and meridian
//!   allowances checked before every goto and on every tracking tick
//! - **Tracking**: sidereal tracking with refraction and pointing-model rate
//!   compensation
//! - **Park, guide and PEC** state machines with explicit, checked transitions
//! - **Configuration-driven**: mount mechanics and limits from TOML files
//! - **no_std compatible**: the core never allocates
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mount_motion::{Equatorial, ManualTimeLocation, Mount, SimAxis};
//!
//! let config = mount_motion::load_config("mount.toml")?;
//! let tls = ManualTimeLocation::ready(jd, site);
//! let mut mount = Mount::new(&config, SimAxis::default(), SimAxis::default(), tls)?;
//!
//! mount.goto_equ(Equatorial::new(83.82, -5.39))?;
//! loop {
//!     mount.monitor(now_ms());
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): TOML file loading, `std::error::Error`, [`SharedMount`]
//! - `log` (default): logging through the `log` facade
//! - `defmt`: defmt logging for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

// Must come first: the log macros are textually scoped
#[macro_use]
mod fmt;

// Core modules
pub mod axis;
pub mod config;
pub mod coords;
pub mod error;
pub mod motion;
pub mod mount;
pub mod tls;

// Re-exports for ergonomic API
pub use axis::{Axis, SimAxis};
pub use config::{validate_config, MountConfig, ParkPosition};
pub use coords::{Coordinate, Equatorial, GemTransform, Horizon, PierSide, Transform};
pub use error::{CommandError, CommandResult, ConfigError, Error, Result};
pub use motion::{GotoRateMultiplier, GotoRates};
pub use mount::state::{
    GotoStage, GotoState, GotoType, GuideAxis, GuideDirection, GuideRate, GuideState,
    MeridianFlip, MountFault, ParkState, PecState, PreferredPierSide, RateCompensation,
    TrackingState,
};
pub use mount::{CommandReply, Mount, MountEvent, MountStatus, MAX_PULSE_GUIDE_MS, PEC_MAX_BINS};
pub use tls::{GpsFix, GpsTimeLocation, JulianDate, ManualTimeLocation, Site, TimeLocationSource};

#[cfg(feature = "std")]
pub use mount::SharedMount;

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

// Unit types
pub use config::units::{Degrees, DegreesPerSec, Microsteps, Steps};
