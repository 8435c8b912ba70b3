//! Unit tests for configuration validation.

use mount_motion::config::{validate_config, AxisTravel, MountConfig};
use mount_motion::error::{ConfigError, Error};
use mount_motion::{parse_config, Degrees, DegreesPerSec, GuideRate};

fn valid_config() -> MountConfig {
    let toml_str = r#"
[axis1]
name = "RA"
steps_per_revolution = 200
microsteps = 16
gear_ratio = 180.0

[axis2]
name = "Dec"
steps_per_revolution = 200
microsteps = 16
gear_ratio = 180.0
"#;
    toml::from_str(toml_str).expect("Failed to parse TOML")
}

/// Test validation of a valid configuration.
#[test]
fn test_valid_config_passes_validation() {
    assert!(validate_config(&valid_config()).is_ok());
}

/// Test validation fails for a zero gear ratio.
#[test]
fn test_zero_gear_ratio() {
    let mut config = valid_config();
    config.axis2.gear_ratio = 0.0;
    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidGearRatio(_)))
    ));
}

/// Test validation fails for inverted axis travel, naming the axis.
#[test]
fn test_inverted_axis_travel() {
    let mut config = valid_config();
    config.axis1.limits = Some(AxisTravel::new(Degrees(90.0), Degrees(-90.0)));
    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidAxisLimits { axis: 1, .. }))
    ));
}

/// Test validation fails for a non-positive slew rate.
#[test]
fn test_non_positive_slew_rate() {
    let mut config = valid_config();
    config.goto.slew_rate = DegreesPerSec(0.0);
    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidSlewRate(_)))
    ));
}

/// Test validation of the altitude window.
#[test]
fn test_altitude_window() {
    let mut config = valid_config();
    config.limits.min_altitude = Degrees(30.0);
    config.limits.max_altitude = Degrees(20.0);
    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidAltitudeLimits { .. }))
    ));

    config.limits.min_altitude = Degrees(-95.0);
    config.limits.max_altitude = Degrees(85.0);
    assert!(validate_config(&config).is_err());
}

/// Test validation of the meridian allowances.
#[test]
fn test_meridian_allowance_range() {
    let mut config = valid_config();
    config.limits.past_meridian_west = Degrees(-1.0);
    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidMeridianAllowance(_)))
    ));
}

/// Test custom guide rates must be positive only when selected.
#[test]
fn test_custom_guide_rate() {
    let mut config = valid_config();
    config.guide.custom_rate_axis1 = 0.0;
    assert!(validate_config(&config).is_ok());

    config.guide.pulse_rate = GuideRate::Custom;
    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidGuideRate(_)))
    ));
}

/// Test the worm period is bounded by the PEC buffer when PEC is enabled.
#[test]
fn test_worm_period_with_pec() {
    let mut config = valid_config();
    config.pec.worm_period_seconds = 2000;
    assert!(validate_config(&config).is_ok());

    config.features.pec = true;
    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidWormPeriod(2000)))
    ));
}

/// Test site coordinates are range checked.
#[test]
fn test_site_range() {
    let mut config = valid_config();
    config.site.latitude_degrees = 91.0;
    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidSite { .. }))
    ));
}

/// Test parse_config runs validation.
#[test]
fn test_parse_config_validates() {
    let toml_str = r#"
[axis1]
name = "RA"
steps_per_revolution = 200
microsteps = 16
gear_ratio = -1.0

[axis2]
name = "Dec"
steps_per_revolution = 200
microsteps = 16
"#;
    assert!(matches!(
        parse_config(toml_str),
        Err(Error::Config(ConfigError::InvalidGearRatio(_)))
    ));
}
