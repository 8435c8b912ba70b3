//! Property tests for goto validation, sync and tracking.

use mount_motion::coords::wrap_360;
use mount_motion::{
    parse_config, CommandError, Coordinate, Equatorial, JulianDate, ManualTimeLocation, Mount,
    PierSide, SimAxis, Site, TrackingState, Transform,
};
use proptest::prelude::*;

const MOUNT_TOML: &str = r#"
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

[limits]
auto_meridian_flip = true

[site]
latitude_degrees = 45.0
"#;

type SimMount = Mount<SimAxis, ManualTimeLocation>;

fn mount() -> SimMount {
    let config = parse_config(MOUNT_TOML).expect("test config should parse");
    let tls = ManualTimeLocation::ready(JulianDate::from_jd(2_460_000.5), Site::new(45.0, 0.0, 0.0));
    let mut mount = Mount::new(&config, SimAxis::default(), SimAxis::default(), tls)
        .expect("mount should build");
    mount.monitor(0);
    mount
}

fn sky(mount: &SimMount, h: f64, dec: f64) -> Equatorial {
    let lst = mount.local_sidereal_time().expect("clock ready");
    Equatorial::new(wrap_360(lst - h), dec)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Any accepted destination lies inside axis travel and the meridian
    /// allowance of the chosen pier side.
    #[test]
    fn accepted_destination_within_travel(h in -180.0f64..180.0, d in -90.0f64..90.0) {
        let mount = mount();
        let coord = Coordinate::new(h, d);
        if let Ok(plan) = mount.validate_goto_coords(&coord) {
            let limits = mount.limits();
            let (a1, a2) = mount.transform().mount_to_instrument(&coord.on_side(plan.pier_side));
            prop_assert!(limits.axis1.contains(a1), "a1 {} out of travel", a1);
            prop_assert!(limits.axis2.contains(a2), "a2 {} out of travel", a2);
            match plan.pier_side {
                PierSide::East => prop_assert!(a1 >= -90.0 - limits.past_meridian_e),
                PierSide::West => prop_assert!(a1 <= 90.0 + limits.past_meridian_w),
                PierSide::None => prop_assert!(false, "no pier side chosen"),
            }
            let alt = mount.transform().equ_to_hor(&coord).alt;
            prop_assert!(limits.altitude_ok(alt));
        }
    }

    /// Targets below the horizon limit are always refused as such.
    #[test]
    fn below_horizon_always_refused(h in -180.0f64..180.0, d in -90.0f64..90.0) {
        let mut mount = mount();
        let alt = mount.transform().equ_to_hor(&Coordinate::new(h, d)).alt;
        prop_assume!(alt < mount.limits().min_altitude - 1e-6);

        let target = sky(&mount, h, d);
        prop_assert_eq!(mount.goto_equ(target), Err(CommandError::BelowHorizon));
        prop_assert_eq!(mount.status().goto_state, mount_motion::GotoState::None);
    }

    /// Syncing to where the mount already points moves nothing.
    #[test]
    fn sync_to_current_is_idempotent(h in -100.0f64..100.0, d in -30.0f64..85.0) {
        let mut mount = mount();
        let target = sky(&mount, h, d);
        prop_assume!(mount.sync_equ(target).is_ok());

        let before = mount.current();
        let here = mount.current_equatorial().expect("clock ready");
        prop_assert!(mount.sync_equ(here).is_ok());
        let after = mount.current();

        prop_assert!((after.h - before.h).abs() < 1e-9);
        prop_assert!((after.d - before.d).abs() < 1e-9);
        prop_assert_eq!(after.pier_side, before.pier_side);
    }

    /// Without rate compensation the tracking deltas stay zero everywhere.
    #[test]
    fn no_compensation_no_deltas(h in -100.0f64..100.0, d in -30.0f64..85.0) {
        let mut mount = mount();
        let target = sky(&mount, h, d);
        prop_assume!(mount.sync_equ(target).is_ok());
        prop_assume!(mount.set_tracking_state(TrackingState::Sidereal).is_ok());

        mount.monitor(100);
        let status = mount.status();
        prop_assert_eq!(status.delta_rate_axis1, 0.0);
        prop_assert_eq!(status.delta_rate_axis2, 0.0);
    }
}
