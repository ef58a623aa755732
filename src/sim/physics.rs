use nalgebra::Vector3;
use tracing::info;

use crate::sim::integrator::{pack, rk4, unpack};
use crate::universe::body;
use crate::vehicle::Rocket;

/// Advance `rocket` from `time` to `time + dt` in its primary's frame.
///
/// With the throttle closed the craft rides its conic analytically, so a
/// coasting craft picks up no integration error no matter how many steps it
/// takes. Under thrust the state is integrated with RK4; thrust magnitude,
/// direction, and mass are held constant over the step.
pub(crate) fn update_physics(
    rocket: &mut Rocket,
    gravitational_parameter: f64,
    primary_radius: f64,
    time: f64,
    dt: f64,
) {
    if rocket.throttle() == 0.0 {
        rocket.position = rocket.orbit.position_at(time + dt);
        rocket.velocity = rocket.orbit.velocity_at(time + dt);
        rocket.acceleration =
            gravitational_acceleration(gravitational_parameter, primary_radius, &rocket.position);
        return;
    }

    let thrust_acceleration = if rocket.propellant > 0.0 {
        let required = rocket.expulsion_rate() * dt * rocket.throttle();
        let used = required.min(rocket.propellant);
        // scale thrust down when the tanks run dry mid-step
        let ratio = if required == 0.0 {
            rocket.throttle()
        } else {
            rocket.throttle() * used / required
        };
        rocket.propellant -= used;
        if used < required {
            info!(rocket = %rocket.name, time, "propellant exhausted");
        }
        let mass = rocket.dry_mass() + rocket.propellant;
        rocket.prograde() * (rocket.max_thrust() * ratio / mass)
    } else {
        Vector3::zeros()
    };

    let f = |_t: f64, y: &nalgebra::Vector6<f64>| {
        let (position, velocity) = unpack(y);
        let gravity =
            gravitational_acceleration(gravitational_parameter, primary_radius, &position);
        pack(velocity, gravity + thrust_acceleration)
    };
    let state = rk4(f, time, &pack(rocket.position, rocket.velocity), dt);
    let (position, velocity) = unpack(&state);
    rocket.position = position;
    rocket.velocity = velocity;
    rocket.acceleration =
        gravitational_acceleration(gravitational_parameter, primary_radius, &rocket.position)
            + thrust_acceleration;
}

/// Point-mass gravity toward the origin, falling off linearly below the
/// surface. Degenerate states right at the center produce no pull.
fn gravitational_acceleration(
    gravitational_parameter: f64,
    radius: f64,
    position: &Vector3<f64>,
) -> Vector3<f64> {
    let distance = position.norm();
    if distance < 1.0 {
        return Vector3::zeros();
    }
    let pull = body::gravity(gravitational_parameter, radius, distance);
    -position * (pull / distance)
}
