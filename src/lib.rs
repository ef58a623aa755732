pub mod io;
pub mod orbital;
pub mod sim;
pub mod universe;
pub mod vehicle;

// Convenience re-exports of the main surface
pub use orbital::{Orbit, OrbitElements};
pub use sim::{simulate, FlightProgram, FlightProgramBuilder, Frame, Resume, Scheduler, DT};
pub use universe::{CelestialBody, Entity, EntityId, Universe};
pub use vehicle::{Rocket, RocketPart, RocketPartBuilder};
