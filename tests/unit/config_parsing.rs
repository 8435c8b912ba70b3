//! Unit tests for TOML configuration parsing.

use mount_motion::config::{load_config, parse_config, MountConfig};
use mount_motion::error::{ConfigError, Error};
use mount_motion::{GuideRate, MeridianFlip, Microsteps, PierSide, PreferredPierSide, RateCompensation};

const AXES: &str = r#"
[axis1]
name = "RA"
steps_per_revolution = 200
microsteps = 32
gear_ratio = 144.0
steps_per_worm_rotation = 25600

[axis1.limits]
min_degrees = -120.0
max_degrees = 120.0

[axis2]
name = "Dec"
steps_per_revolution = 400
microsteps = 16
gear_ratio = 144.0
"#;

/// Test parsing both axes and their mechanics.
#[test]
fn test_parse_axes() {
    let config: MountConfig = toml::from_str(AXES).expect("Failed to parse TOML");

    assert_eq!(config.axis1.name.as_str(), "RA");
    assert_eq!(config.axis1.microsteps, Microsteps::THIRTY_SECOND);
    assert_eq!(config.axis1.steps_per_worm_rotation, Some(25600));
    // 200 * 32 * 144 / 360
    assert!((config.axis1.steps_per_degree() - 2560.0).abs() < 1e-9);

    let travel = config.axis1.limits.expect("axis1 travel");
    assert_eq!(travel.min.0, -120.0);
    assert!(travel.contains(0.0) && !travel.contains(121.0));

    assert_eq!(config.axis2.steps_per_revolution, 400);
    assert!(config.axis2.limits.is_none());
}

/// Test that every section falls back to its defaults.
#[test]
fn test_defaults_when_sections_omitted() {
    let config = parse_config(AXES).expect("minimal config should parse");

    assert_eq!(config.goto.slew_rate.0, 1.0);
    assert_eq!(config.goto.meridian_flip, MeridianFlip::Always);
    assert_eq!(config.goto.preferred_pier_side, PreferredPierSide::Best);
    assert!(!config.goto.pause_at_home);
    assert_eq!(config.limits.min_altitude.0, -10.0);
    assert_eq!(config.limits.max_altitude.0, 85.0);
    assert_eq!(config.limits.past_meridian_east.0, 15.0);
    assert!(!config.limits.auto_meridian_flip);
    assert!(config.limits.safety_limits);
    assert_eq!(config.guide.rate, GuideRate::X20);
    assert_eq!(config.guide.pulse_rate, GuideRate::X1);
    assert_eq!(config.pec.worm_period_seconds, 480);
    assert!(!config.features.pec);
    assert!(config.park.is_none());
}

/// Test parsing the behavioral sections.
#[test]
fn test_parse_full_config() {
    let toml_str = format!(
        "{AXES}\n{}",
        r#"
[goto]
slew_rate_deg_per_sec = 3.0
approach_degrees = 2.0
meridian_flip = "never"
preferred_pier_side = "west"
pause_at_home = true

[tracking]
rate_compensation = "refr_both"

[guide]
rate = "custom"
pulse_rate = "0.5x"
custom_rate_axis1 = 1.5
custom_rate_axis2 = 0.75

[park]
axis1_degrees = -90.0
axis2_degrees = 0.0
pier_side = "east"

[site]
latitude_degrees = -33.9
longitude_degrees = 18.4
elevation_meters = 40.0

[pointing_model]
polar_altitude_error_arcsec = 120.0

[features]
require_alignment = true
"#
    );

    let config = parse_config(&toml_str).expect("full config should parse");

    assert_eq!(config.goto.slew_rate.0, 3.0);
    assert_eq!(config.goto.meridian_flip, MeridianFlip::Never);
    assert_eq!(config.goto.preferred_pier_side, PreferredPierSide::West);
    assert!(config.goto.pause_at_home);
    assert_eq!(config.tracking.rate_compensation, RateCompensation::RefrBoth);
    assert_eq!(config.guide.rate, GuideRate::Custom);
    assert_eq!(config.guide.pulse_rate, GuideRate::Half);
    assert_eq!(config.guide.custom_rate_axis2, 0.75);

    let park = config.park.expect("park position");
    assert_eq!(park.axis1.0, -90.0);
    assert_eq!(park.pier_side, PierSide::East);

    assert_eq!(config.site.latitude_degrees, -33.9);
    assert_eq!(config.pointing_model.polar_altitude_error_arcsec, 120.0);
    assert!(config.features.require_alignment);
}

/// Test that an unsupported microstep value is a parse error.
#[test]
fn test_invalid_microsteps_rejected() {
    let toml_str = AXES.replace("microsteps = 32", "microsteps = 3");
    match parse_config(&toml_str) {
        Err(Error::Config(ConfigError::ParseError(msg))) => assert!(!msg.is_empty()),
        other => panic!("expected parse error, got {:?}", other),
    }
}

/// Test that a missing axis is a parse error.
#[test]
fn test_missing_axis_rejected() {
    let toml_str = r#"
[axis1]
name = "RA"
steps_per_revolution = 200
microsteps = 16
"#;
    assert!(matches!(
        parse_config(toml_str),
        Err(Error::Config(ConfigError::ParseError(_)))
    ));
}

/// Test loading from a file on disk.
#[test]
fn test_load_config_from_file() {
    let path = std::env::temp_dir().join(format!("mount-motion-{}.toml", std::process::id()));
    std::fs::write(&path, AXES).expect("write temp config");

    let loaded = load_config(&path);
    let _ = std::fs::remove_file(&path);

    let config = loaded.expect("config file should load");
    assert_eq!(config.axis2.name.as_str(), "Dec");
}

/// Test that a missing file reports an I/O error.
#[test]
fn test_load_config_missing_file() {
    let result = load_config("/nonexistent/mount-motion/mount.toml");
    assert!(matches!(result, Err(Error::Config(ConfigError::IoError(_)))));
}
