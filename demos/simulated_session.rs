//! Example: An observing session on simulated axes.
//!
//! This example demonstrates how to:
//! - Build a mount from a TOML configuration
//! - Drive the monitor from a host loop
//! - Slew across the meridian, guide, and park through the command interface
//!
//! Run with: `cargo run --example simulated_session --features std`

use mount_motion::{
    coords::wrap_360,
    error::Result,
    parse_config, GotoState, JulianDate, ManualTimeLocation, Mount, MountEvent, SimAxis, Site,
};

const TICK_MS: u64 = 100;

type SimMount = Mount<SimAxis, ManualTimeLocation>;

/// Advance the simulated axes and the monitor until no goto is active.
fn run_goto(mount: &mut SimMount, now_ms: &mut u64) {
    let start = *now_ms;
    while mount.goto_state() != GotoState::None {
        tick(mount, now_ms);
    }
    println!(
        "  arrived after {:.1} s, pier side {:?}",
        (*now_ms - start) as f64 / 1000.0,
        mount.status().pier_side
    );
}

fn tick(mount: &mut SimMount, now_ms: &mut u64) {
    let dt = TICK_MS as f64 / 1000.0;
    let (axis1, axis2) = mount.axes_mut();
    axis1.advance(dt);
    axis2.advance(dt);
    *now_ms += TICK_MS;
    mount.monitor(*now_ms);

    for event in mount.drain_events() {
        match event {
            MountEvent::ParkSaved(position) => println!(
                "  event: parked at {:.3} {:.3}",
                position.axis1.0, position.axis2.0
            ),
            other => println!("  event: {:?}", other),
        }
    }
}

fn print_status(mount: &SimMount) {
    let status = mount.status();
    let reply = mount.status_string();
    match mount.current_equatorial() {
        Some(equ) => println!(
            "  [{}] ra {:.3} dec {:.3} axes {:.3} {:.3}",
            reply, equ.ra, equ.dec, status.axis1_degrees, status.axis2_degrees
        ),
        None => println!("  [{}] time unknown", reply),
    }
}

fn main() -> Result<()> {
    println!("=== Simulated Mount Session ===\n");

    // 200 step motors at 1/16 microstepping on 180:1 worms
    let toml_content = r#"
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

[goto]
slew_rate_deg_per_sec = 3.0
approach_degrees = 1.0

[limits]
min_altitude_degrees = 0.0
auto_meridian_flip = true

[tracking]
rate_compensation = "refr_ra"

[site]
latitude_degrees = 48.85
longitude_degrees = 2.35
"#;

    let config = parse_config(toml_content)?;
    println!("Loaded mount: {} / {}", config.axis1.name, config.axis2.name);

    let site = Site::new(config.site.latitude_degrees, config.site.longitude_degrees, 0.0);
    let tls = ManualTimeLocation::ready(JulianDate::from_gregorian(2024, 9, 21, 21.0), site);
    let mut mount = Mount::new(&config, SimAxis::default(), SimAxis::default(), tls)?;
    let mut now_ms = 0;
    mount.monitor(now_ms);
    print_status(&mount);

    let lst = mount.local_sidereal_time().unwrap_or_default();
    println!("\nLocal sidereal time {:.3}", lst);

    // 1. Slew east of the meridian, tracking on
    println!("\n1. Goto 40 degrees east of the meridian");
    mount.command("Te", "")?;
    let east = (wrap_360(lst + 40.0), 30.0);
    mount.command("MS", &format!("{},{}", east.0, east.1))?;
    run_goto(&mut mount, &mut now_ms);
    print_status(&mount);

    // 2. A target west of the meridian forces a flip through the pole
    println!("\n2. Goto 35 degrees west of the meridian");
    let west = (wrap_360(lst - 35.0), 20.0);
    mount.command("MS", &format!("{},{}", west.0, west.1))?;
    run_goto(&mut mount, &mut now_ms);
    print_status(&mount);

    // 3. Guide briefly
    println!("\n3. Pulse guide north for 2 s");
    mount.command("Mg", "n,2000")?;
    for _ in 0..25 {
        tick(&mut mount, &mut now_ms);
    }
    print_status(&mount);

    // 4. Below the horizon is refused
    println!("\n4. Goto below the horizon");
    match mount.command("MS", &format!("{},{}", wrap_360(lst), -60.0)) {
        Ok(_) => println!("  unexpectedly accepted"),
        Err(e) => println!("  refused: {} (code {})", e, e.code()),
    }

    // 5. Park and unpark
    println!("\n5. Park");
    mount.command("hP", "")?;
    run_goto(&mut mount, &mut now_ms);
    print_status(&mount);
    mount.command("hR", "")?;
    println!("  unparked");
    print_status(&mount);

    println!("\n=== Session complete ===");
    Ok(())
}
