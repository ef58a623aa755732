pub mod anomaly;
pub mod orbit;

pub use orbit::{Orbit, OrbitElements};
