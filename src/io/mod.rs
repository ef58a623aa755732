pub mod csv;

pub use csv::{write_flight_log, write_flight_log_file, FlightSample};
