//! Configuration validation.

use crate::error::{ConfigError, Error, Result};
use crate::mount::state::GuideRate;
use crate::mount::PEC_MAX_BINS;

use super::MountConfig;

/// Validate a mount configuration.
///
/// Checks:
/// - Axis mechanics are valid (gear ratio > 0, travel min < max)
/// - Slew rate is positive
/// - Altitude limits are ordered and within ±90°
/// - Meridian allowances are within 0..=90°
/// - Custom guide rates are positive when selected
/// - PEC worm period is positive and fits the correction buffer when PEC is enabled
/// - Site coordinates are in range
pub fn validate_config(config: &MountConfig) -> Result<()> {
    validate_axis(1, &config.axis1)?;
    validate_axis(2, &config.axis2)?;

    if config.goto.slew_rate.0 <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidSlewRate(config.goto.slew_rate.0)));
    }

    let limits = &config.limits;
    let (min_alt, max_alt) = (limits.min_altitude.0, limits.max_altitude.0);
    if min_alt >= max_alt || min_alt < -90.0 || max_alt > 90.0 {
        return Err(Error::Config(ConfigError::InvalidAltitudeLimits {
            min: min_alt,
            max: max_alt,
        }));
    }

    for allowance in [limits.past_meridian_east.0, limits.past_meridian_west.0] {
        if !(0.0..=90.0).contains(&allowance) {
            return Err(Error::Config(ConfigError::InvalidMeridianAllowance(allowance)));
        }
    }

    let guide = &config.guide;
    if guide.rate == GuideRate::Custom || guide.pulse_rate == GuideRate::Custom {
        for rate in [guide.custom_rate_axis1, guide.custom_rate_axis2] {
            if rate <= 0.0 {
                return Err(Error::Config(ConfigError::InvalidGuideRate(rate)));
            }
        }
    }

    let period = config.pec.worm_period_seconds;
    if config.features.pec && (period == 0 || period as usize > PEC_MAX_BINS) {
        return Err(Error::Config(ConfigError::InvalidWormPeriod(period)));
    }

    let site = &config.site;
    if libm::fabs(site.latitude_degrees) > 90.0 || libm::fabs(site.longitude_degrees) > 360.0 {
        return Err(Error::Config(ConfigError::InvalidSite {
            latitude: site.latitude_degrees,
            longitude: site.longitude_degrees,
        }));
    }

    Ok(())
}

fn validate_axis(index: u8, axis: &super::AxisConfig) -> Result<()> {
    if axis.gear_ratio <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidGearRatio(axis.gear_ratio)));
    }

    if let Some(ref travel) = axis.limits {
        if !travel.is_valid() {
            return Err(Error::Config(ConfigError::InvalidAxisLimits {
                axis: index,
                min: travel.min.0,
                max: travel.max.0,
            }));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::units::{Degrees, Microsteps};
    use crate::config::{AxisConfig, AxisTravel};

    fn axis(limits: Option<AxisTravel>, gear_ratio: f64) -> AxisConfig {
        AxisConfig {
            name: heapless::String::try_from("test").unwrap(),
            steps_per_revolution: 200,
            microsteps: Microsteps::SIXTEENTH,
            gear_ratio,
            limits,
            steps_per_worm_rotation: None,
        }
    }

    #[test]
    fn test_invalid_gear_ratio() {
        let config = MountConfig::with_axes(axis(None, -1.0), axis(None, 1.0));

        let result = validate_config(&config);
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidGearRatio(_)))
        ));
    }

    #[test]
    fn test_inverted_axis_travel() {
        let travel = AxisTravel::new(Degrees(90.0), Degrees(-90.0));
        let config = MountConfig::with_axes(axis(None, 1.0), axis(Some(travel), 1.0));

        assert!(matches!(
            validate_config(&config),
            Err(Error::Config(ConfigError::InvalidAxisLimits { axis: 2, .. }))
        ));
    }

    #[test]
    fn test_altitude_limits_out_of_order() {
        let mut config = MountConfig::with_axes(axis(None, 1.0), axis(None, 1.0));
        config.limits.min_altitude = Degrees(30.0);
        config.limits.max_altitude = Degrees(10.0);

        assert!(matches!(
            validate_config(&config),
            Err(Error::Config(ConfigError::InvalidAltitudeLimits { .. }))
        ));
    }

    #[test]
    fn test_meridian_allowance_range() {
        let mut config = MountConfig::with_axes(axis(None, 1.0), axis(None, 1.0));
        config.limits.past_meridian_west = Degrees(120.0);

        assert!(matches!(
            validate_config(&config),
            Err(Error::Config(ConfigError::InvalidMeridianAllowance(_)))
        ));
    }

    #[test]
    fn test_worm_period_checked_only_with_pec() {
        let mut config = MountConfig::with_axes(axis(None, 1.0), axis(None, 1.0));
        config.pec.worm_period_seconds = 5000;
        assert!(validate_config(&config).is_ok());

        config.features.pec = true;
        assert!(matches!(
            validate_config(&config),
            Err(Error::Config(ConfigError::InvalidWormPeriod(5000)))
        ));
    }
}
