use std::f64::consts::TAU;

use crate::orbital::Orbit;
use crate::universe::EntityId;

/// Gravitational acceleration magnitude (m/s^2) at `distance` from the
/// center of a body of parameter `mu` and the given radius.
///
/// Outside the body this is plain inverse-square; below the surface only the
/// mass underneath attracts, so the field falls off linearly toward the
/// center (uniform density).
pub fn gravity(mu: f64, radius: f64, distance: f64) -> f64 {
    if distance < radius {
        mu * distance / radius.powi(3)
    } else {
        mu / (distance * distance)
    }
}

/// A star, planet or moon.
///
/// Orbit and sphere of influence are filled in by the arena when the body is
/// registered around a primary; a root body keeps `orbit = None` and an
/// infinite sphere of influence.
#[derive(Debug, Clone)]
pub struct CelestialBody {
    pub name: String,
    pub gravitational_parameter: f64, // m^3/s^2
    pub radius: f64,                  // m
    pub rotational_period: f64,       // s
    pub orbit: Option<Orbit>,
    pub sphere_of_influence: f64, // m, +inf for the root body
    pub(crate) satellites: Vec<EntityId>,
}

impl CelestialBody {
    pub fn new(
        name: &str,
        gravitational_parameter: f64,
        radius: f64,
        rotational_period: f64,
    ) -> CelestialBody {
        CelestialBody {
            name: name.to_owned(),
            gravitational_parameter,
            radius,
            rotational_period,
            orbit: None,
            sphere_of_influence: f64::INFINITY,
            satellites: Vec::new(),
        }
    }

    /// Everything orbiting this body, in registration order.
    pub fn satellites(&self) -> &[EntityId] {
        &self.satellites
    }

    /// Gravitational acceleration magnitude (m/s^2) at `distance` from the
    /// center.
    pub fn gravity(&self, distance: f64) -> f64 {
        gravity(self.gravitational_parameter, self.radius, distance)
    }

    /// Speed (m/s) of a point on the equator due to the body's rotation.
    pub fn surface_velocity(&self) -> f64 {
        TAU * self.radius / self.rotational_period
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kerbin() -> CelestialBody {
        CelestialBody::new("Kerbin", 3.531_6e12, 600e3, 21_600.0)
    }

    #[test]
    fn surface_gravity() {
        let body = kerbin();
        let g = body.gravity(body.radius);
        assert!((g - 9.81).abs() < 0.01, "surface gravity {}", g);
    }

    #[test]
    fn interior_gravity_falls_off_linearly() {
        let body = kerbin();
        let surface = body.gravity(body.radius);
        let halfway = body.gravity(body.radius / 2.0);
        assert!((halfway - surface / 2.0).abs() < 1e-9);
        assert_eq!(body.gravity(0.0), 0.0);
    }

    #[test]
    fn gravity_is_continuous_at_the_surface() {
        let body = kerbin();
        let below = body.gravity(body.radius * (1.0 - 1e-12));
        let above = body.gravity(body.radius * (1.0 + 1e-12));
        assert!((below - above).abs() < 1e-6);
    }

    #[test]
    fn equatorial_surface_velocity() {
        let body = kerbin();
        let expected = TAU * 600e3 / 21_600.0; // ~174.5 m/s
        assert!((body.surface_velocity() - expected).abs() < 1e-9);
    }
}
