/// Standard gravity (m/s^2), for specific-impulse conversion.
pub const G0: f64 = 9.80665;

/// A single part of a rocket.
///
/// `name` and `title` identify the part; the capability fields say what it
/// contributes once installed. Engine capability is set through
/// [`RocketPart::make_engine`] so the derived exhaust velocity and expulsion
/// rate always agree with thrust and specific impulse.
#[derive(Debug, Clone)]
pub struct RocketPart {
    name: String,
    title: String,
    pub dry_mass: f64,         // kg
    pub drag_coefficient: f64, // -
    pub propellant: f64,       // kg carried when installed
    max_thrust: f64,           // N
    specific_impulse: f64,     // s
    exhaust_velocity: f64,     // m/s
    expulsion_rate: f64,       // kg/s at full throttle
}

impl RocketPart {
    pub fn new(name: &str, title: &str, dry_mass: f64, drag_coefficient: f64) -> RocketPart {
        RocketPart {
            name: name.to_owned(),
            title: title.to_owned(),
            dry_mass,
            drag_coefficient,
            propellant: 0.0,
            max_thrust: 0.0,
            specific_impulse: 0.0,
            exhaust_velocity: 0.0,
            expulsion_rate: 0.0,
        }
    }

    pub fn builder(name: &str, title: &str) -> RocketPartBuilder {
        RocketPartBuilder {
            part: RocketPart::new(name, title, 0.0, 0.0),
        }
    }

    /// Give the part engine capability.
    pub fn make_engine(&mut self, max_thrust: f64, specific_impulse: f64) {
        self.max_thrust = max_thrust;
        self.specific_impulse = specific_impulse;
        self.exhaust_velocity = specific_impulse * G0;
        self.expulsion_rate = max_thrust / self.exhaust_velocity;
    }

    /// Give the part tank capability.
    pub fn make_tank(&mut self, propellant: f64) {
        self.propellant = propellant;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn max_thrust(&self) -> f64 {
        self.max_thrust
    }

    pub fn specific_impulse(&self) -> f64 {
        self.specific_impulse
    }

    pub fn exhaust_velocity(&self) -> f64 {
        self.exhaust_velocity
    }

    pub fn expulsion_rate(&self) -> f64 {
        self.expulsion_rate
    }
}

/// Chained-setter construction for [`RocketPart`].
#[derive(Debug, Clone)]
pub struct RocketPartBuilder {
    part: RocketPart,
}

impl RocketPartBuilder {
    pub fn dry_mass(mut self, kg: f64) -> Self {
        self.part.dry_mass = kg;
        self
    }

    pub fn drag_coefficient(mut self, cd: f64) -> Self {
        self.part.drag_coefficient = cd;
        self
    }

    pub fn engine(mut self, max_thrust: f64, specific_impulse: f64) -> Self {
        self.part.make_engine(max_thrust, specific_impulse);
        self
    }

    pub fn tank(mut self, propellant: f64) -> Self {
        self.part.make_tank(propellant);
        self
    }

    pub fn build(self) -> RocketPart {
        self.part
    }
}

// ---------------------------------------------------------------------------
// Stock parts
// ---------------------------------------------------------------------------

pub mod presets {
    use super::RocketPart;

    /// Heavy-lift bulk tank.
    pub fn bulk_tank() -> RocketPart {
        RocketPart::builder("s3-14400", "S3-14400 Bulk Tank")
            .dry_mass(9_000.0)
            .drag_coefficient(0.2)
            .tank(72_000.0)
            .build()
    }

    /// Four-nozzle first-stage engine cluster.
    pub fn engine_cluster() -> RocketPart {
        RocketPart::builder("ks-25x4", "KS-25x4 Engine Cluster")
            .dry_mass(15_000.0)
            .drag_coefficient(0.2)
            .engine(4_000_000.0, 315.0)
            .build()
    }
}
