use nalgebra::{Rotation3, Unit, Vector3};

use crate::orbital::Orbit;
use crate::sim::program::FlightProgram;
use crate::universe::EntityId;
use crate::vehicle::part::RocketPart;

/// A rocket under simulation.
///
/// Position and velocity are relative to the current primary. The orbit is
/// rebuilt from that state after every physics step, so it is always the
/// conic the craft would coast on if the engine cut out right now.
#[derive(Debug)]
pub struct Rocket {
    pub name: String,
    parts: Vec<RocketPart>,
    // aggregates over `parts`, recomputed on install/remove
    dry_mass: f64,              // kg
    max_thrust: f64,            // N
    expulsion_rate: f64,        // kg/s at full throttle
    pub(crate) propellant: f64, // kg, drained in flight
    throttle: f64,
    orientation: Rotation3<f64>,
    pub(crate) position: Vector3<f64>,     // m, primary-relative
    pub(crate) velocity: Vector3<f64>,     // m/s
    pub(crate) acceleration: Vector3<f64>, // m/s^2, from the last step
    pub(crate) primary: EntityId,
    pub(crate) orbit: Orbit,
    pub(crate) satellites: Vec<EntityId>,
    pub(crate) program: Option<FlightProgram>,
    pub(crate) soi_escape_time: f64, // absolute, may be +inf
}

impl Rocket {
    pub(crate) fn new(
        name: &str,
        primary: EntityId,
        position: Vector3<f64>,
        velocity: Vector3<f64>,
        orientation: Rotation3<f64>,
        orbit: Orbit,
        soi_escape_time: f64,
    ) -> Rocket {
        Rocket {
            name: name.to_owned(),
            parts: Vec::new(),
            dry_mass: 0.0,
            max_thrust: 0.0,
            expulsion_rate: 0.0,
            throttle: 1.0,
            orientation,
            propellant: 0.0,
            position,
            velocity,
            acceleration: Vector3::zeros(),
            primary,
            orbit,
            satellites: Vec::new(),
            program: None,
            soi_escape_time,
        }
    }

    // -----------------------------------------------------------------------
    // Flight state
    // -----------------------------------------------------------------------

    pub fn position(&self) -> Vector3<f64> {
        self.position
    }

    pub fn velocity(&self) -> Vector3<f64> {
        self.velocity
    }

    pub fn acceleration(&self) -> Vector3<f64> {
        self.acceleration
    }

    pub fn primary(&self) -> EntityId {
        self.primary
    }

    pub fn orbit(&self) -> &Orbit {
        &self.orbit
    }

    pub fn orientation(&self) -> Rotation3<f64> {
        self.orientation
    }

    /// Thrust direction: the body z axis taken through the current attitude.
    pub fn prograde(&self) -> Vector3<f64> {
        self.orientation * Vector3::z()
    }

    /// Rebuild the conic from the current primary-relative state.
    pub(crate) fn refresh_orbit(
        &mut self,
        gravitational_parameter: f64,
        primary_soi: f64,
        epoch: f64,
    ) {
        self.orbit = Orbit::from_state(
            self.primary,
            gravitational_parameter,
            self.position,
            self.velocity,
            epoch,
        );
        self.soi_escape_time = self.orbit.escape_time(primary_soi);
    }

    // -----------------------------------------------------------------------
    // Attitude and throttle
    // -----------------------------------------------------------------------

    pub fn throttle(&self) -> f64 {
        self.throttle
    }

    pub fn set_throttle(&mut self, throttle: f64) {
        self.throttle = throttle.clamp(0.0, 1.0);
    }

    /// Turn the craft by `angle` radians about `axis` (body frame).
    pub fn rotate(&mut self, angle: f64, axis: Vector3<f64>) {
        let axis = Unit::new_normalize(axis);
        self.orientation *= Rotation3::from_axis_angle(&axis, angle);
    }

    // -----------------------------------------------------------------------
    // Parts and mass
    // -----------------------------------------------------------------------

    /// Bolt a part on.
    pub fn install_part(&mut self, part: RocketPart) {
        self.parts.push(part);
        self.refresh_aggregates();
    }

    /// Detach the first part with `name`. The propellant pool follows the
    /// installed capacity, so a detached tank takes its share with it.
    pub fn remove_part(&mut self, name: &str) -> Option<RocketPart> {
        let index = self.parts.iter().position(|part| part.name() == name)?;
        let part = self.parts.remove(index);
        self.refresh_aggregates();
        Some(part)
    }

    pub fn parts(&self) -> &[RocketPart] {
        &self.parts
    }

    // Also refills a partially drained pool; parts only change on the pad.
    fn refresh_aggregates(&mut self) {
        self.dry_mass = self.parts.iter().map(|part| part.dry_mass).sum();
        self.max_thrust = self.parts.iter().map(RocketPart::max_thrust).sum();
        self.expulsion_rate = self.parts.iter().map(RocketPart::expulsion_rate).sum();
        self.propellant = self.parts.iter().map(|part| part.propellant).sum();
    }

    pub fn dry_mass(&self) -> f64 {
        self.dry_mass
    }

    pub fn max_thrust(&self) -> f64 {
        self.max_thrust
    }

    pub fn expulsion_rate(&self) -> f64 {
        self.expulsion_rate
    }

    pub fn propellant(&self) -> f64 {
        self.propellant
    }

    pub fn mass(&self) -> f64 {
        self.dry_mass + self.propellant
    }

    // -----------------------------------------------------------------------
    // Flight program
    // -----------------------------------------------------------------------

    /// Load a program and run its first action immediately.
    pub fn set_program(&mut self, program: FlightProgram, time: f64) {
        let mut program = program;
        program.prime(self, time);
        self.program = Some(program);
    }

    /// True when there is no program, or the loaded one has run out of legs.
    pub fn program_finished(&self) -> bool {
        self.program.as_ref().map_or(true, FlightProgram::is_finished)
    }

    /// How far ahead nothing needs this craft's attention: the earlier of
    /// the program's next wakeup and the predicted escape from the current
    /// sphere of influence.
    pub(crate) fn resume_horizon(&self, now: f64) -> f64 {
        let program = self
            .program
            .as_ref()
            .map_or(f64::INFINITY, |program| program.resume_horizon(now));
        program.min(self.soi_escape_time - now)
    }
}
