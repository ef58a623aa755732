pub mod arena;
pub mod body;
pub mod presets;

pub use arena::{Entity, EntityId, Universe};
pub use body::CelestialBody;
