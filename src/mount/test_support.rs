//! Simulated mounts for unit tests.

use super::Mount;
use crate::axis::SimAxis;
use crate::config::units::{DegreesPerSec, Microsteps};
use crate::config::{AxisConfig, MountConfig};
use crate::tls::{JulianDate, ManualTimeLocation, Site};

pub(crate) type SimMount = Mount<SimAxis, ManualTimeLocation>;

pub(crate) const TICK_MS: u64 = 100;

pub(crate) const JD: f64 = 2_460_000.5;

// 1600 steps per degree
fn axis(name: &str) -> AxisConfig {
    AxisConfig {
        name: heapless::String::try_from(name).unwrap(),
        steps_per_revolution: 200,
        microsteps: Microsteps::SIXTEENTH,
        gear_ratio: 180.0,
        limits: None,
        steps_per_worm_rotation: None,
    }
}

pub(crate) fn config() -> MountConfig {
    let mut config = MountConfig::with_axes(axis("ra"), axis("dec"));
    config.goto.slew_rate = DegreesPerSec(2.0);
    config.limits.auto_meridian_flip = true;
    config.features.pec = true;
    config.site.latitude_degrees = 45.0;
    config
}

pub(crate) fn mount_with(config: &MountConfig) -> SimMount {
    let site = Site::new(config.site.latitude_degrees, 0.0, 0.0);
    let tls = ManualTimeLocation::ready(JulianDate::from_jd(JD), site);
    let mut mount = Mount::new(config, SimAxis::default(), SimAxis::default(), tls).unwrap();
    mount.monitor(0);
    mount
}

pub(crate) fn mount_at(latitude: f64) -> SimMount {
    let mut config = config();
    config.site.latitude_degrees = latitude;
    mount_with(&config)
}

pub(crate) fn mount_without_time() -> SimMount {
    let mut mount = Mount::new(
        &config(),
        SimAxis::default(),
        SimAxis::default(),
        ManualTimeLocation::new(),
    )
    .unwrap();
    mount.monitor(0);
    mount
}

/// Advance the axes and tick the monitor until `done` or `max_ticks`.
/// Returns the number of ticks run.
pub(crate) fn step_until<F>(mount: &mut SimMount, max_ticks: usize, mut done: F) -> usize
where
    F: FnMut(&SimMount) -> bool,
{
    for tick in 1..=max_ticks {
        let (axis1, axis2) = mount.axes_mut();
        axis1.advance(TICK_MS as f64 / 1000.0);
        axis2.advance(TICK_MS as f64 / 1000.0);
        let now = mount.now_ms + TICK_MS;
        mount.monitor(now);
        if done(mount) {
            return tick;
        }
    }
    max_ticks
}
