use std::fmt;

use tracing::info;

use crate::vehicle::Rocket;

/// When the active leg hands over to the next one.
pub enum Resume {
    /// As soon as the predicate reports true.
    When(Box<dyn Fn(&Rocket) -> bool>),
    /// After this many seconds of simulated time.
    Hold(f64),
    /// Never: the program stays on this leg.
    Never,
}

impl Resume {
    pub fn when(predicate: impl Fn(&Rocket) -> bool + 'static) -> Resume {
        Resume::When(Box::new(predicate))
    }
}

struct Leg {
    label: String,
    action: Box<dyn FnMut(&mut Rocket)>,
    resume: Resume,
}

/// A loaded autopilot script: an ordered list of (action, resume) legs.
///
/// One leg is active at a time. Its action ran when the leg was entered;
/// the resume condition decides when control moves to the next leg. The
/// scheduler asks the active leg how far ahead it can be left alone, which
/// is what lets coasting phases run many steps per frame.
pub struct FlightProgram {
    legs: Vec<Leg>,
    cursor: usize,
    hold_until: Option<f64>, // absolute deadline of an active Hold leg
}

impl FlightProgram {
    pub fn builder() -> FlightProgramBuilder {
        FlightProgramBuilder { legs: Vec::new() }
    }

    /// Enter the first leg. Called once, when the program is loaded.
    pub(crate) fn prime(&mut self, rocket: &mut Rocket, time: f64) {
        if self.cursor < self.legs.len() {
            self.activate(rocket, time);
        }
    }

    /// Advance at most one leg. Called once per step, ahead of the physics,
    /// with `time..time + dt` the step about to run.
    pub(crate) fn poll(&mut self, rocket: &mut Rocket, time: f64, dt: f64) {
        if self.cursor >= self.legs.len() {
            return;
        }
        if !self.matured(rocket, time, dt) {
            return;
        }
        self.cursor += 1;
        if self.cursor < self.legs.len() {
            self.activate(rocket, time + dt);
        } else {
            info!("flight program complete");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.legs.len()
    }

    /// Seconds from `now` until this program next needs a look. Zero for
    /// predicate legs, the remaining wait for holds, infinite otherwise.
    pub(crate) fn resume_horizon(&self, now: f64) -> f64 {
        match self.legs.get(self.cursor).map(|leg| &leg.resume) {
            Some(Resume::When(_)) => 0.0,
            Some(Resume::Hold(_)) => self
                .hold_until
                .map_or(f64::INFINITY, |deadline| deadline - now),
            Some(Resume::Never) | None => f64::INFINITY,
        }
    }

    fn matured(&self, rocket: &Rocket, time: f64, dt: f64) -> bool {
        match &self.legs[self.cursor].resume {
            Resume::When(predicate) => predicate(rocket),
            Resume::Hold(_) => self
                .hold_until
                .map_or(true, |deadline| deadline <= time + dt),
            Resume::Never => false,
        }
    }

    fn activate(&mut self, rocket: &mut Rocket, time: f64) {
        let leg = &mut self.legs[self.cursor];
        info!(leg = %leg.label, time, "flight program leg");
        (leg.action)(rocket);
        self.hold_until = match leg.resume {
            Resume::Hold(seconds) => Some(time + seconds),
            _ => None,
        };
    }
}

impl fmt::Debug for FlightProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlightProgram")
            .field("legs", &self.legs.len())
            .field("cursor", &self.cursor)
            .field("hold_until", &self.hold_until)
            .finish()
    }
}

/// Chained construction for [`FlightProgram`].
pub struct FlightProgramBuilder {
    legs: Vec<Leg>,
}

impl FlightProgramBuilder {
    pub fn phase(
        mut self,
        label: &str,
        action: impl FnMut(&mut Rocket) + 'static,
        resume: Resume,
    ) -> Self {
        self.legs.push(Leg {
            label: label.to_owned(),
            action: Box::new(action),
            resume,
        });
        self
    }

    pub fn build(self) -> FlightProgram {
        FlightProgram {
            legs: self.legs,
            cursor: 0,
            hold_until: None,
        }
    }
}
