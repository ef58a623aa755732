use std::io::{self, Write};

use nalgebra::Vector3;

use crate::vehicle::Rocket;

/// One sampled point of a flight, in the primary-centered frame.
#[derive(Debug, Clone)]
pub struct FlightSample {
    pub time: f64,
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    pub throttle: f64,
    pub propellant: f64,
}

impl FlightSample {
    pub fn of(rocket: &Rocket, time: f64) -> FlightSample {
        FlightSample {
            time,
            position: rocket.position(),
            velocity: rocket.velocity(),
            throttle: rocket.throttle(),
            propellant: rocket.propellant(),
        }
    }
}

/// Write a sampled flight to CSV format.
///
/// Columns: time, pos_x, pos_y, pos_z, vel_x, vel_y, vel_z,
///          throttle, propellant
pub fn write_flight_log<W: Write>(writer: &mut W, samples: &[FlightSample]) -> io::Result<()> {
    writeln!(
        writer,
        "time,pos_x,pos_y,pos_z,vel_x,vel_y,vel_z,throttle,propellant"
    )?;

    for s in samples {
        writeln!(
            writer,
            "{:.4},{:.3},{:.3},{:.3},{:.4},{:.4},{:.4},{:.3},{:.3}",
            s.time,
            s.position.x,
            s.position.y,
            s.position.z,
            s.velocity.x,
            s.velocity.y,
            s.velocity.z,
            s.throttle,
            s.propellant,
        )?;
    }

    Ok(())
}

/// Write a sampled flight to a CSV file at the given path.
pub fn write_flight_log_file(path: &str, samples: &[FlightSample]) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_flight_log(&mut file, samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_output_has_header_and_rows() {
        let samples = vec![
            FlightSample {
                time: 0.0,
                position: Vector3::new(600e3, 0.0, 0.0),
                velocity: Vector3::new(0.0, 174.6, 0.0),
                throttle: 1.0,
                propellant: 144_000.0,
            },
            FlightSample {
                time: 0.031_25,
                position: Vector3::new(600_000.4, 5.5, 0.0),
                velocity: Vector3::new(13.0, 174.6, 0.0),
                throttle: 1.0,
                propellant: 143_959.5,
            },
        ];

        let mut buf = Vec::new();
        write_flight_log(&mut buf, &samples).unwrap();
        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert!(lines[0].starts_with("time,"));
        assert_eq!(lines.len(), 3); // header + 2 data rows
        assert!(lines[1].starts_with("0.0000,600000.000,"));
    }
}
