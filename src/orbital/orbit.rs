use std::f64::consts::{PI, TAU};

use nalgebra::{Rotation3, Vector3};

use crate::orbital::anomaly;
use crate::universe::EntityId;

// ---------------------------------------------------------------------------
// Orbital elements
// ---------------------------------------------------------------------------

/// Classical orbital elements, as handed to [`Orbit::from_elements`].
///
/// Defaults to a degenerate all-zero set so call sites can fill only the
/// fields that matter: `OrbitElements { periapsis: 12e6, ..Default::default() }`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrbitElements {
    pub periapsis: f64,                   // m
    pub eccentricity: f64,                // -
    pub inclination: f64,                 // rad
    pub longitude_of_ascending_node: f64, // rad
    pub argument_of_periapsis: f64,       // rad
    pub epoch: f64,                       // s
    pub mean_anomaly_at_epoch: f64,       // rad
}

// ---------------------------------------------------------------------------
// Orbit
// ---------------------------------------------------------------------------

/// A conic trajectory around a primary, evaluated in closed form.
///
/// Distances are meters, angles radians, times seconds. The primary is
/// referenced by arena id; its gravitational parameter is captured at
/// construction so evaluation never needs the arena.
#[derive(Debug, Clone)]
pub struct Orbit {
    pub primary: EntityId,
    pub gravitational_parameter: f64, // of the primary, m^3/s^2
    pub periapsis: f64,               // m
    pub eccentricity: f64,
    pub inclination: f64,
    pub longitude_of_ascending_node: f64,
    pub argument_of_periapsis: f64,
    pub epoch: f64,
    pub mean_anomaly_at_epoch: f64,
    pub semi_major_axis: f64,  // m, negative when hyperbolic
    pub apoapsis: f64,         // m, negative when hyperbolic
    pub semi_latus_rectum: f64, // m
    pub mean_motion: f64,      // rad/s
    pub period: f64,           // s, +inf unless elliptic
    transform: Rotation3<f64>, // perifocal -> primary frame
}

impl Orbit {
    /// Orbit from classical elements around a primary of parameter `mu`.
    pub fn from_elements(primary: EntityId, mu: f64, elements: OrbitElements) -> Orbit {
        // normalize inclination within [0, pi]; a retrograde equatorial
        // orbit has an inclination of exactly pi
        let mut inclination = elements.inclination.rem_euclid(TAU);
        let mut longitude_of_ascending_node = elements.longitude_of_ascending_node;
        let mut argument_of_periapsis = elements.argument_of_periapsis;
        if inclination > PI {
            inclination = TAU - inclination;
            longitude_of_ascending_node -= PI;
            argument_of_periapsis -= PI;
        }
        longitude_of_ascending_node = longitude_of_ascending_node.rem_euclid(TAU);
        argument_of_periapsis = argument_of_periapsis.rem_euclid(TAU);

        let periapsis = elements.periapsis;
        let eccentricity = elements.eccentricity;

        let semi_major_axis = if eccentricity == 1.0 {
            f64::INFINITY
        } else {
            periapsis / (1.0 - eccentricity)
        };
        let apoapsis = semi_major_axis * (1.0 + eccentricity);
        let semi_latus_rectum = periapsis * (1.0 + eccentricity);

        let mean_motion = if eccentricity == 1.0 {
            3.0 * (mu / semi_latus_rectum.powi(3)).sqrt()
        } else {
            (mu / semi_major_axis.abs().powi(3)).sqrt()
        };
        let period = if eccentricity >= 1.0 {
            f64::INFINITY
        } else {
            TAU / mean_motion
        };

        let transform = Rotation3::from_axis_angle(&Vector3::z_axis(), longitude_of_ascending_node)
            * Rotation3::from_axis_angle(&Vector3::x_axis(), inclination)
            * Rotation3::from_axis_angle(&Vector3::z_axis(), argument_of_periapsis);

        Orbit {
            primary,
            gravitational_parameter: mu,
            periapsis,
            eccentricity,
            inclination,
            longitude_of_ascending_node,
            argument_of_periapsis,
            epoch: elements.epoch,
            mean_anomaly_at_epoch: elements.mean_anomaly_at_epoch,
            semi_major_axis,
            apoapsis,
            semi_latus_rectum,
            mean_motion,
            period,
            transform,
        }
    }

    /// Orbit determination from primary-relative state vectors at `epoch`.
    pub fn from_state(
        primary: EntityId,
        mu: f64,
        position: Vector3<f64>,
        velocity: Vector3<f64>,
        epoch: f64,
    ) -> Orbit {
        let distance = position.norm();
        let x_axis = Vector3::x();
        let z_axis = Vector3::z();
        let plane_normal = position.cross(&velocity);

        // eccentricity vector points from focus to periapsis
        let rv = position.dot(&velocity);
        let eccentricity_vector =
            (velocity.norm_squared() * position - rv * velocity) / mu - position / distance;
        let eccentricity = eccentricity_vector.norm();

        // from r(nu) = h^2/mu / (1 + e cos nu)
        let specific_angular_momentum = plane_normal.norm();
        let periapsis = specific_angular_momentum.powi(2) / mu / (1.0 + eccentricity);
        let periapsis_dir = if eccentricity == 0.0 {
            x_axis
        } else {
            eccentricity_vector
        };

        let inclination = plane_normal.angle(&z_axis);
        let ascending_node_dir = if inclination == 0.0 || inclination == PI {
            x_axis
        } else {
            z_axis.cross(&plane_normal)
        };
        let mut longitude_of_ascending_node = x_axis.angle(&ascending_node_dir);
        if plane_normal.x < 0.0 {
            longitude_of_ascending_node = -longitude_of_ascending_node;
        }
        let argument_of_periapsis =
            oriented_angle(&ascending_node_dir, &periapsis_dir, &plane_normal);

        let true_anomaly_at_epoch = oriented_angle(&periapsis_dir, &position, &plane_normal);
        let mean_anomaly_at_epoch =
            anomaly::mean_anomaly_at_true_anomaly(eccentricity, true_anomaly_at_epoch);

        Orbit::from_elements(
            primary,
            mu,
            OrbitElements {
                periapsis,
                eccentricity,
                inclination,
                longitude_of_ascending_node,
                argument_of_periapsis,
                epoch,
                mean_anomaly_at_epoch,
            },
        )
    }

    // -----------------------------------------------------------------------
    // Geometry
    // -----------------------------------------------------------------------

    /// Distance from the focus (m) at a given true anomaly.
    pub fn distance_at_true_anomaly(&self, true_anomaly: f64) -> f64 {
        self.semi_latus_rectum / (1.0 + self.eccentricity * true_anomaly.cos())
    }

    /// Orbital speed (m/s) at a given distance from the focus (vis-viva).
    pub fn speed_at_distance(&self, distance: f64) -> f64 {
        (self.gravitational_parameter * (2.0 / distance - 1.0 / self.semi_major_axis)).sqrt()
    }

    /// The positive true anomaly at which the orbit crosses `distance`,
    /// if it ever does.
    ///
    /// A non-circular orbit reaches a distance either never, once (at an
    /// apsis) or twice, at opposite anomalies; the positive one is returned.
    /// A circular orbit is at its radius always or never, so it yields None.
    pub fn true_anomaly_at_distance(&self, distance: f64) -> Option<f64> {
        if self.eccentricity == 0.0 {
            return None;
        }
        if distance < self.periapsis {
            return None;
        }
        if 0.0 < self.apoapsis && self.apoapsis <= distance {
            return None;
        }
        let cos_v = (self.semi_latus_rectum / distance - 1.0) / self.eccentricity;
        Some(cos_v.clamp(-1.0, 1.0).acos())
    }

    // -----------------------------------------------------------------------
    // Time
    // -----------------------------------------------------------------------

    /// Mean anomaly at a given time (s); grows linearly by the mean motion.
    pub fn mean_anomaly_at_time(&self, time: f64) -> f64 {
        self.mean_anomaly_at_epoch + self.mean_motion * (time - self.epoch)
    }

    /// True anomaly at a given time (s).
    pub fn true_anomaly_at_time(&self, time: f64) -> f64 {
        anomaly::true_anomaly_at_mean_anomaly(self.eccentricity, self.mean_anomaly_at_time(time))
    }

    /// Time (s) at which the given true anomaly is reached.
    pub fn time_at_true_anomaly(&self, true_anomaly: f64) -> f64 {
        let mean = anomaly::mean_anomaly_at_true_anomaly(self.eccentricity, true_anomaly);
        self.epoch + (mean - self.mean_anomaly_at_epoch) / self.mean_motion
    }

    /// Time (s) at which the trajectory leaves a sphere of the given radius,
    /// or +inf when it never does.
    pub fn escape_time(&self, soi_radius: f64) -> f64 {
        if soi_radius.is_infinite() {
            return f64::INFINITY;
        }
        match self.true_anomaly_at_distance(soi_radius) {
            Some(true_anomaly) => self.time_at_true_anomaly(true_anomaly),
            None => f64::INFINITY,
        }
    }

    // -----------------------------------------------------------------------
    // State
    // -----------------------------------------------------------------------

    /// Position vector at a given true anomaly, in the primary's frame.
    pub fn position_at_true_anomaly(&self, true_anomaly: f64) -> Vector3<f64> {
        let distance = self.distance_at_true_anomaly(true_anomaly);
        let (s, c) = true_anomaly.sin_cos();
        self.transform * Vector3::new(distance * c, distance * s, 0.0)
    }

    /// Velocity vector at a given true anomaly, in the primary's frame.
    pub fn velocity_at_true_anomaly(&self, true_anomaly: f64) -> Vector3<f64> {
        let distance = self.distance_at_true_anomaly(true_anomaly);
        let (s, c) = true_anomaly.sin_cos();
        let e = self.eccentricity;
        // dr/dnu, for the flight-path direction
        let dr = self.semi_latus_rectum * e * s / (1.0 + e * c).powi(2);
        let direction = Vector3::new(-distance * s + dr * c, distance * c + dr * s, 0.0);
        let speed = self.speed_at_distance(distance);
        self.transform * (direction.normalize() * speed)
    }

    /// Position vector at a given time (s), in the primary's frame.
    pub fn position_at(&self, time: f64) -> Vector3<f64> {
        self.position_at_true_anomaly(self.true_anomaly_at_time(time))
    }

    /// Velocity vector at a given time (s), in the primary's frame.
    pub fn velocity_at(&self, time: f64) -> Vector3<f64> {
        self.velocity_at_true_anomaly(self.true_anomaly_at_time(time))
    }
}

// Angle between two vectors, signed by the side of `normal` their cross
// product falls on.
fn oriented_angle(from: &Vector3<f64>, to: &Vector3<f64>, normal: &Vector3<f64>) -> f64 {
    let angle = from.angle(to);
    if from.cross(to).dot(normal) < 0.0 {
        -angle
    } else {
        angle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MU_KERBIN: f64 = 3.531_6e12; // m^3/s^2

    fn primary() -> EntityId {
        EntityId::new(0)
    }

    #[test]
    fn circular_orbit_speed() {
        let orbit = Orbit::from_elements(
            primary(),
            MU_KERBIN,
            OrbitElements {
                periapsis: 700e3,
                ..Default::default()
            },
        );
        let expected = (MU_KERBIN / 700e3).sqrt();
        let speed = orbit.velocity_at(0.0).norm();
        assert!(
            (speed - expected).abs() / expected < 1e-9,
            "circular speed {} != {}",
            speed,
            expected
        );
    }

    #[test]
    fn period_matches_kepler_third_law() {
        let orbit = Orbit::from_elements(
            primary(),
            MU_KERBIN,
            OrbitElements {
                periapsis: 700e3,
                eccentricity: 0.1,
                ..Default::default()
            },
        );
        let a = orbit.semi_major_axis;
        let expected = TAU * (a.powi(3) / MU_KERBIN).sqrt();
        assert!((orbit.period - expected).abs() / expected < 1e-12);
    }

    #[test]
    fn position_at_epoch_starts_at_periapsis() {
        let orbit = Orbit::from_elements(
            primary(),
            MU_KERBIN,
            OrbitElements {
                periapsis: 700e3,
                eccentricity: 0.25,
                ..Default::default()
            },
        );
        let position = orbit.position_at(0.0);
        assert!((position.x - 700e3).abs() < 1e-3, "x = {}", position.x);
        assert!(position.y.abs() < 1e-3 && position.z.abs() < 1e-3);
    }

    #[test]
    fn from_state_roundtrip() {
        let elements = OrbitElements {
            periapsis: 700e3,
            eccentricity: 0.2,
            inclination: 0.3,
            longitude_of_ascending_node: 1.0,
            argument_of_periapsis: 2.0,
            epoch: 0.0,
            mean_anomaly_at_epoch: 1.2,
        };
        let orbit = Orbit::from_elements(primary(), MU_KERBIN, elements);

        let t = 37.5;
        let recovered = Orbit::from_state(
            primary(),
            MU_KERBIN,
            orbit.position_at(t),
            orbit.velocity_at(t),
            t,
        );

        assert!((recovered.periapsis - orbit.periapsis).abs() / orbit.periapsis < 1e-6);
        assert!((recovered.eccentricity - orbit.eccentricity).abs() < 1e-6);
        assert!((recovered.inclination - orbit.inclination).abs() < 1e-6);
        assert!(
            (recovered.longitude_of_ascending_node - orbit.longitude_of_ascending_node).abs()
                < 1e-6
        );
        assert!((recovered.argument_of_periapsis - orbit.argument_of_periapsis).abs() < 1e-6);

        // geometry aside, the recovered orbit must predict the same motion
        let later = t + 1234.5;
        let drift = (recovered.position_at(later) - orbit.position_at(later)).norm();
        assert!(drift < 1.0, "positions drifted {} m apart", drift);
    }

    #[test]
    fn hyperbolic_orbit_conserves_energy() {
        let position = Vector3::new(700e3, 0.0, 0.0);
        let velocity = Vector3::new(500.0, 3600.0, 0.0); // above escape speed
        let orbit = Orbit::from_state(primary(), MU_KERBIN, position, velocity, 0.0);
        assert!(orbit.eccentricity > 1.0, "e = {}", orbit.eccentricity);

        let energy = |r: Vector3<f64>, v: Vector3<f64>| {
            v.norm_squared() / 2.0 - MU_KERBIN / r.norm()
        };
        let e0 = energy(position, velocity);
        assert!(e0 > 0.0);

        let t = 600.0;
        let e1 = energy(orbit.position_at(t), orbit.velocity_at(t));
        assert!((e1 - e0).abs() / e0.abs() < 1e-9, "{} vs {}", e0, e1);

        // the state at epoch is reproduced
        assert!((orbit.position_at(0.0) - position).norm() < 1e-3);
        assert!((orbit.velocity_at(0.0) - velocity).norm() < 1e-6);
    }

    #[test]
    fn true_anomaly_at_distance_guards() {
        let circular = Orbit::from_elements(
            primary(),
            MU_KERBIN,
            OrbitElements {
                periapsis: 700e3,
                ..Default::default()
            },
        );
        assert!(circular.true_anomaly_at_distance(700e3).is_none());

        let elliptic = Orbit::from_elements(
            primary(),
            MU_KERBIN,
            OrbitElements {
                periapsis: 700e3,
                eccentricity: 0.3,
                ..Default::default()
            },
        );
        assert!(elliptic.true_anomaly_at_distance(600e3).is_none());
        assert!(elliptic.true_anomaly_at_distance(2e9).is_none());

        let v = elliptic
            .true_anomaly_at_distance(900e3)
            .expect("distance between the apsides is reached");
        let d = elliptic.distance_at_true_anomaly(v);
        assert!((d - 900e3).abs() < 1e-3, "distance {}", d);
    }

    #[test]
    fn escape_time_is_infinite_inside_soi() {
        let bound = Orbit::from_elements(
            primary(),
            MU_KERBIN,
            OrbitElements {
                periapsis: 700e3,
                eccentricity: 0.3,
                ..Default::default()
            },
        );
        assert!(bound.escape_time(84e6).is_infinite());
        assert!(bound.escape_time(f64::INFINITY).is_infinite());

        let escaping = Orbit::from_state(
            primary(),
            MU_KERBIN,
            Vector3::new(700e3, 0.0, 0.0),
            Vector3::new(500.0, 3600.0, 0.0),
            0.0,
        );
        let t = escaping.escape_time(12e6);
        assert!(t.is_finite() && t > 0.0, "escape at {}", t);
        let r = escaping.position_at(t).norm();
        assert!((r - 12e6).abs() / 12e6 < 1e-9, "left the sphere at {}", r);
    }
}
