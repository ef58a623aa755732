use std::f64::consts::PI;

use crate::orbital::OrbitElements;
use crate::universe::{CelestialBody, EntityId, Universe};

/// Gravitational constant (m^3 kg^-1 s^-2) used to turn the stock masses
/// into gravitational parameters.
const G: f64 = 6.673_84e-11;

/// Ids of the stock bodies, in the arena they were built into.
#[derive(Debug, Clone, Copy)]
pub struct KerbolSystem {
    pub kerbol: EntityId,
    pub kerbin: EntityId,
    pub mun: EntityId,
    pub minmus: EntityId,
}

/// Build Kerbol, Kerbin, the Mun and Minmus into `universe`.
pub fn kerbol_system(universe: &mut Universe) -> KerbolSystem {
    let kerbol = universe.add_body(CelestialBody::new(
        "Kerbol",
        G * 1.756_567_0e28,
        261_600e3,
        432_000.0,
    ));

    let kerbin = universe.add_orbiting_body(
        kerbol,
        CelestialBody::new("Kerbin", G * 5.291_579_3e22, 600e3, 21_600.0),
        OrbitElements {
            periapsis: 13_599_840_256.0,
            mean_anomaly_at_epoch: PI,
            ..Default::default()
        },
    );

    let mun = universe.add_orbiting_body(
        kerbin,
        CelestialBody::new("Mun", G * 9.760_023_6e20, 200e3, 138_984.38),
        OrbitElements {
            periapsis: 12_000_000.0,
            mean_anomaly_at_epoch: 97.0_f64.to_radians(),
            ..Default::default()
        },
    );

    let minmus = universe.add_orbiting_body(
        kerbin,
        CelestialBody::new("Minmus", G * 2.645_789_7e19, 60e3, 40_400.0),
        OrbitElements {
            periapsis: 47_000_000.0,
            inclination: 6.0_f64.to_radians(),
            longitude_of_ascending_node: 78.0_f64.to_radians(),
            argument_of_periapsis: 38.0_f64.to_radians(),
            mean_anomaly_at_epoch: 52.0_f64.to_radians(),
            ..Default::default()
        },
    );

    KerbolSystem {
        kerbol,
        kerbin,
        mun,
        minmus,
    }
}
