use std::f64::consts::FRAC_PI_2;

use nalgebra::{Rotation3, Vector3};

use crate::orbital::{Orbit, OrbitElements};
use crate::universe::CelestialBody;
use crate::vehicle::Rocket;

/// Index of an entity in a [`Universe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(usize);

impl EntityId {
    pub(crate) fn new(index: usize) -> EntityId {
        EntityId(index)
    }
}

/// Anything that can orbit or be orbited.
#[derive(Debug)]
pub enum Entity {
    Body(CelestialBody),
    Craft(Rocket),
}

impl Entity {
    pub fn name(&self) -> &str {
        match self {
            Entity::Body(body) => &body.name,
            Entity::Craft(rocket) => &rocket.name,
        }
    }

    /// Ids of everything orbiting this entity.
    pub fn satellites(&self) -> &[EntityId] {
        match self {
            Entity::Body(body) => &body.satellites,
            Entity::Craft(rocket) => &rocket.satellites,
        }
    }

    pub(crate) fn satellites_mut(&mut self) -> &mut Vec<EntityId> {
        match self {
            Entity::Body(body) => &mut body.satellites,
            Entity::Craft(rocket) => &mut rocket.satellites,
        }
    }

    /// The orbit around the entity's primary; None for the root body.
    pub fn orbit(&self) -> Option<&Orbit> {
        match self {
            Entity::Body(body) => body.orbit.as_ref(),
            Entity::Craft(rocket) => Some(&rocket.orbit),
        }
    }

    /// Radius (m) within which this entity dominates gravity. Craft are
    /// massless here: nothing ever orbits them.
    pub fn sphere_of_influence(&self) -> f64 {
        match self {
            Entity::Body(body) => body.sphere_of_influence,
            Entity::Craft(_) => 0.0,
        }
    }
}

/// The arena holding every body and craft of a simulation.
///
/// Cross-references (a craft's primary, a body's satellites) are ids into
/// the arena, never pointers, so reparenting a craft is a matter of moving
/// its id between satellite lists.
#[derive(Debug, Default)]
pub struct Universe {
    entities: Vec<Entity>,
}

impl Universe {
    pub fn new() -> Universe {
        Universe::default()
    }

    /// All entity ids, in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        (0..self.entities.len()).map(EntityId)
    }

    pub fn entity(&self, id: EntityId) -> &Entity {
        &self.entities[id.0]
    }

    pub fn entity_mut(&mut self, id: EntityId) -> &mut Entity {
        &mut self.entities[id.0]
    }

    /// The body behind `id`; panics if the id addresses a craft.
    pub fn body(&self, id: EntityId) -> &CelestialBody {
        match &self.entities[id.0] {
            Entity::Body(body) => body,
            Entity::Craft(rocket) => panic!("{:?} is the craft {:?}, not a body", id, rocket.name),
        }
    }

    /// The craft behind `id`; panics if the id addresses a body.
    pub fn craft(&self, id: EntityId) -> &Rocket {
        match &self.entities[id.0] {
            Entity::Craft(rocket) => rocket,
            Entity::Body(body) => panic!("{:?} is the body {:?}, not a craft", id, body.name),
        }
    }

    pub fn craft_mut(&mut self, id: EntityId) -> &mut Rocket {
        match &mut self.entities[id.0] {
            Entity::Craft(rocket) => rocket,
            Entity::Body(body) => panic!("{:?} is the body {:?}, not a craft", id, body.name),
        }
    }

    fn body_mut(&mut self, id: EntityId) -> &mut CelestialBody {
        match &mut self.entities[id.0] {
            Entity::Body(body) => body,
            Entity::Craft(rocket) => panic!("{:?} is the craft {:?}, not a body", id, rocket.name),
        }
    }

    /// Register a root body (no orbit, infinite sphere of influence).
    pub fn add_body(&mut self, body: CelestialBody) -> EntityId {
        let id = EntityId(self.entities.len());
        self.entities.push(Entity::Body(body));
        id
    }

    /// Register `body` on an orbit around `primary`.
    ///
    /// Computes the sphere of influence from the orbit, substitutes the
    /// orbital period for a zero rotational period (tidal lock), and adds
    /// the body to the primary's satellites.
    pub fn add_orbiting_body(
        &mut self,
        primary: EntityId,
        mut body: CelestialBody,
        elements: OrbitElements,
    ) -> EntityId {
        let mu_primary = self.body(primary).gravitational_parameter;
        let orbit = Orbit::from_elements(primary, mu_primary, elements);

        if body.rotational_period == 0.0 {
            body.rotational_period = orbit.period;
        }
        body.sphere_of_influence = orbit.semi_major_axis
            * (body.gravitational_parameter / mu_primary).powf(0.4);
        body.orbit = Some(orbit);

        let id = EntityId(self.entities.len());
        self.entities.push(Entity::Body(body));
        self.body_mut(primary).satellites.push(id);
        id
    }

    /// Register a craft sitting on `primary`'s equator at the zero meridian:
    /// position (radius, 0, 0), the surface rotation as initial velocity,
    /// and the prograde marker pointing straight up.
    pub fn add_rocket(&mut self, name: &str, primary: EntityId, epoch: f64) -> EntityId {
        let body = self.body(primary);
        let position = Vector3::new(body.radius, 0.0, 0.0);
        let velocity = Vector3::new(0.0, body.surface_velocity(), 0.0);
        let orientation = Rotation3::from_axis_angle(&Vector3::y_axis(), FRAC_PI_2);
        let orbit = Orbit::from_state(
            primary,
            body.gravitational_parameter,
            position,
            velocity,
            epoch,
        );
        let escape = orbit.escape_time(body.sphere_of_influence);
        let rocket = Rocket::new(name, primary, position, velocity, orientation, orbit, escape);

        let id = EntityId(self.entities.len());
        self.entities.push(Entity::Craft(rocket));
        self.body_mut(primary).satellites.push(id);
        id
    }

    /// Teleport a craft to a new primary-relative state, rebuilding its
    /// orbit at `epoch` so it never goes stale.
    pub fn set_craft_state(
        &mut self,
        id: EntityId,
        position: Vector3<f64>,
        velocity: Vector3<f64>,
        epoch: f64,
    ) {
        let primary = self.craft(id).primary;
        let body = self.body(primary);
        let (mu, soi) = (body.gravitational_parameter, body.sphere_of_influence);
        let rocket = self.craft_mut(id);
        rocket.position = position;
        rocket.velocity = velocity;
        rocket.refresh_orbit(mu, soi, epoch);
    }
}
