use std::time::Duration;

use crate::sim::engine;
use crate::universe::{EntityId, Universe};

/// Fixed physics quantum in simulated seconds. A power of two, so multiples
/// of it accumulate without rounding.
pub const DT: f64 = 0.031_25;

/// Nominal frame period the pacing sleep aims for.
const FRAME_INTERVAL: f64 = 1.0 / 60.0;

/// What one frame of wall-clock time bought.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// Number of `simulate` calls issued.
    pub steps: u32,
    /// Suggested pause before the next frame, when this one had nothing to do.
    pub sleep_hint: Option<Duration>,
}

/// Converts elapsed real time into simulation steps.
///
/// Real seconds times `timewarp` accrue as debt; whole quanta of debt are
/// paid off by stepping the engine. Powered flight always steps one quantum
/// at a time. Coasting flight pays off many quanta in a single closed-form
/// step, bounded by the craft's next scheduled wakeup.
#[derive(Debug)]
pub struct Scheduler {
    time: f64,
    debt: f64,
    pub timewarp: f64,
}

impl Scheduler {
    pub fn new(epoch: f64) -> Scheduler {
        Scheduler {
            time: epoch,
            debt: 0.0,
            timewarp: 1.0,
        }
    }

    /// Current simulated time.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Account for `elapsed` real seconds and run the steps they pay for.
    pub fn advance(&mut self, elapsed: f64, universe: &mut Universe, craft: EntityId) -> Frame {
        self.debt += elapsed * self.timewarp;
        if self.debt < DT {
            let spare = FRAME_INTERVAL - elapsed;
            let sleep_hint = (spare > 0.0).then(|| Duration::from_secs_f64(spare));
            return Frame {
                steps: 0,
                sleep_hint,
            };
        }

        let mut steps = 0;
        while self.debt >= DT {
            let rocket = universe.craft(craft);
            let dt = if rocket.throttle() != 0.0 {
                DT
            } else {
                // largest run of whole quanta not overshooting the wakeup
                let horizon = rocket.resume_horizon(self.time).max(DT);
                let stride = self.debt.min(horizon);
                (stride / DT).floor() * DT
            };
            engine::simulate(universe, craft, self.time, dt);
            self.time += dt;
            self.debt -= dt;
            steps += 1;
        }
        Frame {
            steps,
            sleep_hint: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::program::{FlightProgram, Resume};
    use crate::universe::presets;
    use crate::vehicle::Rocket;
    use nalgebra::Vector3;

    fn pad_craft(universe: &mut Universe) -> EntityId {
        let ids = presets::kerbol_system(universe);
        universe.add_rocket("probe", ids.kerbin, 0.0)
    }

    #[test]
    fn sub_quantum_frames_defer_and_hint_a_sleep() {
        let mut universe = Universe::new();
        let craft = pad_craft(&mut universe);
        let mut scheduler = Scheduler::new(0.0);

        let frame = scheduler.advance(0.01, &mut universe, craft);
        assert_eq!(frame.steps, 0);
        assert_eq!(scheduler.time(), 0.0);
        let hint = frame.sleep_hint.unwrap().as_secs_f64();
        assert!((hint - (FRAME_INTERVAL - 0.01)).abs() < 1e-9);
    }

    #[test]
    fn powered_flight_steps_one_quantum_at_a_time() {
        let mut universe = Universe::new();
        let craft = pad_craft(&mut universe);
        // default throttle is open, so the craft counts as powered
        assert!(universe.craft(craft).throttle() > 0.0);
        let mut scheduler = Scheduler::new(0.0);

        let frame = scheduler.advance(0.1, &mut universe, craft);
        assert_eq!(frame.steps, 3);
        assert_eq!(scheduler.time(), 3.0 * DT);
        assert_eq!(frame.sleep_hint, None);
    }

    #[test]
    fn coasting_flight_batches_quanta_into_one_step() {
        let mut universe = Universe::new();
        let craft = pad_craft(&mut universe);
        universe.craft_mut(craft).set_throttle(0.0);
        let mut scheduler = Scheduler::new(0.0);

        let frame = scheduler.advance(0.1, &mut universe, craft);
        assert_eq!(frame.steps, 1);
        assert_eq!(scheduler.time(), 3.0 * DT);
    }

    #[test]
    fn hold_wakeups_bound_the_coasting_stride() {
        let mut universe = Universe::new();
        let craft = pad_craft(&mut universe);
        let program = FlightProgram::builder()
            .phase(
                "park",
                |rocket: &mut Rocket| rocket.set_throttle(0.0),
                Resume::Hold(0.125),
            )
            .phase("drift", |_: &mut Rocket| {}, Resume::Never)
            .build();
        universe.craft_mut(craft).set_program(program, 0.0);
        let mut scheduler = Scheduler::new(0.0);

        // first stride stops at the hold deadline, second drains the debt
        let frame = scheduler.advance(1.0, &mut universe, craft);
        assert_eq!(frame.steps, 2);
        assert_eq!(scheduler.time(), 1.0);
    }

    #[test]
    fn circular_surface_coast_holds_altitude() {
        let mut universe = Universe::new();
        let ids = presets::kerbol_system(&mut universe);
        let craft = universe.add_rocket("monument", ids.kerbin, 0.0);

        // circular velocity at surface radius, engine dry
        let radius = universe.body(ids.kerbin).radius;
        let mu = universe.body(ids.kerbin).gravitational_parameter;
        let velocity = Vector3::new(0.0, (mu / radius).sqrt(), 0.0);
        universe.set_craft_state(craft, Vector3::new(radius, 0.0, 0.0), velocity, 0.0);
        assert_eq!(universe.craft(craft).propellant(), 0.0);

        let program = FlightProgram::builder()
            .phase(
                "wait for liftoff",
                |rocket: &mut Rocket| rocket.set_throttle(0.0),
                Resume::when(move |rocket| rocket.position().norm() > radius + 0.5),
            )
            .build();
        universe.craft_mut(craft).set_program(program, 0.0);

        let mut scheduler = Scheduler::new(0.0);
        scheduler.timewarp = 600.0;
        for _ in 0..10 {
            scheduler.advance(0.1, &mut universe, craft);
        }

        assert_eq!(scheduler.time(), 600.0);
        let rocket = universe.craft(craft);
        assert!((rocket.position().norm() - radius).abs() < 1e-3);
        assert!(!rocket.program_finished(), "predicate must never fire");
    }

    #[test]
    fn timewarp_scales_the_debt() {
        let mut universe = Universe::new();
        let craft = pad_craft(&mut universe);
        universe.craft_mut(craft).set_throttle(0.0);
        let mut scheduler = Scheduler::new(0.0);
        scheduler.timewarp = 64.0;

        let frame = scheduler.advance(0.5 / 64.0, &mut universe, craft);
        assert_eq!(frame.steps, 1);
        assert_eq!(scheduler.time(), 0.5);
    }
}
