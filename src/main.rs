use std::thread;
use std::time::Instant;

use nalgebra::Vector3;
use tracing_subscriber::prelude::*;

use patched_conics::io::{write_flight_log_file, FlightSample};
use patched_conics::sim::{FlightProgram, Resume, Scheduler, DT};
use patched_conics::universe::{presets, Universe};
use patched_conics::vehicle::{presets as parts, Rocket};

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .init();

    // -----------------------------------------------------------------------
    // Universe and vehicle: two bulk tanks under an engine cluster
    // -----------------------------------------------------------------------
    let mut universe = Universe::new();
    let system = presets::kerbol_system(&mut universe);
    let craft = universe.add_rocket("Valiant-4", system.kerbin, 0.0);
    {
        let rocket = universe.craft_mut(craft);
        rocket.install_part(parts::bulk_tank());
        rocket.install_part(parts::bulk_tank());
        rocket.install_part(parts::engine_cluster());
        rocket.set_program(munar_transfer(), 0.0);
    }

    let surface_gravity = universe.body(system.kerbin).gravity(600e3);
    let rocket = universe.craft(craft);
    let exhaust_velocity = rocket.max_thrust() / rocket.expulsion_rate();
    let delta_v = exhaust_velocity * (rocket.mass() / rocket.dry_mass()).ln();
    let burn_time = rocket.propellant() / rocket.expulsion_rate();
    let twr = rocket.max_thrust() / (rocket.mass() * surface_gravity);

    println!();
    println!("====================================================================");
    println!("  PATCHED-CONIC FLIGHT SIMULATION — {}", rocket.name);
    println!("====================================================================");
    println!();
    println!("  Vehicle Parameters");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Dry mass:      {:>8.1} t     Propellant:   {:>8.1} t",
        rocket.dry_mass() / 1000.0,
        rocket.propellant() / 1000.0
    );
    println!(
        "  Total mass:    {:>8.1} t     Pad TWR:      {:>8.2}",
        rocket.mass() / 1000.0,
        twr
    );
    println!(
        "  Thrust:        {:>8.0} kN    Exhaust vel:  {:>8.0} m/s",
        rocket.max_thrust() / 1000.0,
        exhaust_velocity
    );
    println!(
        "  Burn time:     {:>8.1} s     Delta-v:      {:>8.0} m/s",
        burn_time, delta_v
    );
    println!();

    // -----------------------------------------------------------------------
    // Fly the program, paced against the wall clock
    // -----------------------------------------------------------------------
    let mut scheduler = Scheduler::new(0.0);
    scheduler.timewarp = 128.0;

    let mut samples = vec![FlightSample::of(universe.craft(craft), 0.0)];
    let mut last_sample = 0.0;
    let mut last_frame = Instant::now();
    while !universe.craft(craft).program_finished() && scheduler.time() < 20_000.0 {
        let elapsed = last_frame.elapsed().as_secs_f64();
        last_frame = Instant::now();
        let frame = scheduler.advance(elapsed, &mut universe, craft);
        if let Some(pause) = frame.sleep_hint {
            thread::sleep(pause);
        }
        if scheduler.time() - last_sample >= 15.0 {
            samples.push(FlightSample::of(universe.craft(craft), scheduler.time()));
            last_sample = scheduler.time();
        }
    }
    samples.push(FlightSample::of(universe.craft(craft), scheduler.time()));

    // -----------------------------------------------------------------------
    // Final orbit and flight summary
    // -----------------------------------------------------------------------
    let rocket = universe.craft(craft);
    let orbit = rocket.orbit();
    let primary = universe.entity(rocket.primary()).name();

    println!();
    println!("  Flight Summary");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Mission time:  {:>8.1} s     Primary:      {:>8}",
        scheduler.time(),
        primary
    );
    println!(
        "  Periapsis:     {:>8.1} km    Apoapsis:     {:>8.1} km",
        orbit.periapsis / 1000.0,
        orbit.apoapsis / 1000.0
    );
    if orbit.eccentricity < 1.0 {
        println!(
            "  Eccentricity:  {:>8.4}       Period:       {:>8.1} min",
            orbit.eccentricity,
            orbit.period / 60.0
        );
    } else {
        println!(
            "  Eccentricity:  {:>8.4}       Period:        unbound",
            orbit.eccentricity
        );
    }
    println!(
        "  Propellant:    {:>8.1} t     Throttle:     {:>8.2}",
        rocket.propellant() / 1000.0,
        rocket.throttle()
    );
    println!();

    // -----------------------------------------------------------------------
    // Trajectory table (sampled)
    // -----------------------------------------------------------------------
    println!("  Trajectory");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  {:>8}  {:>10}  {:>9}  {:>8}  {:>9}  {:>6}",
        "t (s)", "r (km)", "vel (m/s)", "throttle", "prop (t)", "phase"
    );
    println!("  {}", "─".repeat(60));

    let stride = (samples.len() / 30).max(1);
    for (i, s) in samples.iter().enumerate() {
        if i % stride != 0 && i != samples.len() - 1 {
            continue;
        }
        let phase = if s.throttle > 0.0 { "BURN" } else { "COAST" };
        println!(
            "  {:>8.1}  {:>10.1}  {:>9.1}  {:>8.2}  {:>9.1}  {:>6}",
            s.time,
            s.position.norm() / 1000.0,
            s.velocity.norm(),
            s.throttle,
            s.propellant / 1000.0,
            phase
        );
    }

    println!();
    println!("  Simulation: {} samples, dt={} s", samples.len(), DT);
    println!("====================================================================");
    println!();

    if let Err(error) = write_flight_log_file("flight_log.csv", &samples) {
        eprintln!("could not write flight_log.csv: {}", error);
    }
}

/// Launch from the pad, park at 700 km, then push for the Mun until the
/// tanks run dry. Pitch angles and the transfer phase angle are tuned for
/// the stock two-tank vehicle.
fn munar_transfer() -> FlightProgram {
    FlightProgram::builder()
        .phase(
            "liftoff",
            |rocket: &mut Rocket| rocket.set_throttle(1.0),
            Resume::when(|rocket| rocket.position().x > 610e3),
        )
        .phase(
            "pitch east",
            |rocket: &mut Rocket| rocket.rotate((-45f64).to_radians(), Vector3::x()),
            Resume::when(|rocket| rocket.orbit().apoapsis > 675e3),
        )
        .phase(
            "flatten out",
            |rocket: &mut Rocket| rocket.rotate((-45f64).to_radians(), Vector3::x()),
            Resume::when(|rocket| rocket.orbit().apoapsis > 700e3),
        )
        .phase(
            "coast to apoapsis",
            |rocket: &mut Rocket| rocket.set_throttle(0.0),
            Resume::when(|rocket| rocket.position().norm() > 699e3),
        )
        .phase(
            "circularize",
            |rocket: &mut Rocket| {
                rocket.rotate((-20f64).to_radians(), Vector3::x());
                rocket.set_throttle(1.0);
            },
            Resume::when(|rocket| rocket.orbit().periapsis > 695e3),
        )
        .phase(
            "parking orbit",
            |rocket: &mut Rocket| rocket.set_throttle(0.0),
            Resume::Hold(30.0),
        )
        .phase(
            "transfer burn",
            |rocket: &mut Rocket| {
                rocket.rotate(58.051_5f64.to_radians(), Vector3::x());
                rocket.set_throttle(1.0);
            },
            Resume::when(|rocket| rocket.propellant() <= 0.0),
        )
        .phase(
            "engine out",
            |rocket: &mut Rocket| rocket.set_throttle(0.0),
            Resume::Hold(120.0),
        )
        .build()
}
