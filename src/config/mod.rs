//! Configuration module for mount-motion.
//!
//! Provides types for loading and validating mount configuration from TOML
//! files (with `std` feature) or pre-parsed data.

mod axis;
mod limits;
mod mechanical;
mod mount;
pub mod units;
#[cfg(feature = "std")]
mod loader;
mod validation;

pub use axis::AxisConfig;
pub use limits::{AxisTravel, Limits, LimitsConfig, DEFAULT_AXIS1_TRAVEL, DEFAULT_AXIS2_TRAVEL};
pub use mechanical::AxisConstraints;
pub use mount::{
    FeaturesConfig, GotoConfig, GuideConfig, MountConfig, ParkPosition, PecConfig,
    PointingModelConfig, SiteConfig, TrackingConfig,
};
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::{Degrees, DegreesPerSec, Microsteps, Steps};
