use nalgebra::Vector3;
use tracing::info;

use crate::sim::physics;
use crate::universe::{EntityId, Universe};

/// Advance `craft` by one step over `time..time + dt`.
///
/// Sub-phases run in a fixed order: the flight program gets a chance to
/// act, the physics moves the craft, the orbit is rebuilt from the new
/// state, and finally the sphere-of-influence resolver reparents the craft
/// if it crossed a boundary. The call completes all four before returning,
/// so no half-updated state is ever visible between steps.
pub fn simulate(universe: &mut Universe, craft: EntityId, time: f64, dt: f64) {
    let primary = universe.craft(craft).primary;
    let body = universe.body(primary);
    let (gravitational_parameter, radius, soi) = (
        body.gravitational_parameter,
        body.radius,
        body.sphere_of_influence,
    );

    let rocket = universe.craft_mut(craft);
    if let Some(mut program) = rocket.program.take() {
        program.poll(rocket, time, dt);
        // an action may have loaded a replacement program
        if rocket.program.is_none() {
            rocket.program = Some(program);
        }
    }

    physics::update_physics(rocket, gravitational_parameter, radius, time, dt);
    rocket.refresh_orbit(gravitational_parameter, soi, time + dt);

    if let Some(transition) = plan_transition(universe, craft, time + dt) {
        apply_transition(universe, craft, transition, time + dt);
    }
}

enum TransitionKind {
    Entry,
    Escape,
}

/// A reparenting decision: where the craft goes and how its state shifts
/// into the new frame.
struct Transition {
    new_primary: EntityId,
    shift_position: Vector3<f64>,
    shift_velocity: Vector3<f64>,
    kind: TransitionKind,
}

/// Check the two boundary crossings, in order: falling into a sibling's
/// sphere of influence, then leaving the current primary's. The first
/// qualifying sibling wins.
fn plan_transition(universe: &Universe, craft: EntityId, now: f64) -> Option<Transition> {
    let rocket = universe.craft(craft);
    let primary_body = universe.body(rocket.primary);
    let apoapsis = rocket.orbit.apoapsis;

    for &sibling in primary_body.satellites() {
        if sibling == craft {
            continue;
        }
        let entity = universe.entity(sibling);
        let soi = entity.sphere_of_influence();
        if soi <= 0.0 {
            continue;
        }
        let Some(orbit) = entity.orbit() else {
            continue;
        };
        // bound orbits topping out below the sibling never get there
        if apoapsis > 0.0 && apoapsis < orbit.periapsis {
            continue;
        }
        let sibling_position = orbit.position_at(now);
        if (rocket.position - sibling_position).norm() <= soi {
            return Some(Transition {
                new_primary: sibling,
                shift_position: -sibling_position,
                shift_velocity: -orbit.velocity_at(now),
                kind: TransitionKind::Entry,
            });
        }
    }

    // bound orbits topping out inside the sphere never leave it
    if apoapsis > 0.0 && apoapsis < primary_body.sphere_of_influence {
        return None;
    }
    if rocket.position.norm() > primary_body.sphere_of_influence {
        let orbit = primary_body.orbit.as_ref()?;
        return Some(Transition {
            new_primary: orbit.primary,
            shift_position: orbit.position_at(now),
            shift_velocity: orbit.velocity_at(now),
            kind: TransitionKind::Escape,
        });
    }
    None
}

/// Move the craft to its new primary in one go: satellite lists, frame
/// shift, primary index, and a fresh orbit at `epoch`.
fn apply_transition(universe: &mut Universe, craft: EntityId, transition: Transition, epoch: f64) {
    let old_primary = universe.craft(craft).primary;
    universe
        .entity_mut(old_primary)
        .satellites_mut()
        .retain(|&id| id != craft);
    universe
        .entity_mut(transition.new_primary)
        .satellites_mut()
        .push(craft);

    let new_body = universe.body(transition.new_primary);
    let (gravitational_parameter, soi) = (
        new_body.gravitational_parameter,
        new_body.sphere_of_influence,
    );
    let primary_name = new_body.name.clone();

    let rocket = universe.craft_mut(craft);
    rocket.position += transition.shift_position;
    rocket.velocity += transition.shift_velocity;
    rocket.primary = transition.new_primary;
    rocket.refresh_orbit(gravitational_parameter, soi, epoch);

    match transition.kind {
        TransitionKind::Entry => {
            info!(rocket = %rocket.name, primary = %primary_name, "entering sphere of influence");
        }
        TransitionKind::Escape => {
            info!(rocket = %rocket.name, primary = %primary_name, "escaping to parent sphere");
        }
    }
}
