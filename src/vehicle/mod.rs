pub mod part;
pub mod rocket;

pub use part::{presets, RocketPart, RocketPartBuilder};
pub use rocket::Rocket;
