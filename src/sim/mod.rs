pub mod engine;
pub mod integrator;
pub(crate) mod physics;
pub mod program;
pub mod scheduler;

pub use engine::simulate;
pub use integrator::rk4;
pub use program::{FlightProgram, FlightProgramBuilder, Resume};
pub use scheduler::{Frame, Scheduler, DT};
