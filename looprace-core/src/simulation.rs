use std::collections::VecDeque;
use std::time::Duration;

use crate::physics::constants::MAX_TIME_STEP_SECS;
use crate::physics::traps::{TrapField, TrapOutcome};
use crate::physics::VehiclePhysics;
use crate::player_inputs::DriverInputs;
use crate::race::{LapNumber, RacePhase};
use crate::track::Track;

const RECENT_LAP_COUNT: usize = 5;

pub fn clamp_time_step(elapsed: Duration) -> f64 {
    f64::min(elapsed.as_secs_f64(), MAX_TIME_STEP_SECS)
}

#[derive(Default)]
pub struct LapTimer {
    current: f64,
    // newest first
    recent: VecDeque<f64>,
}

impl LapTimer {
    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn recent(&self) -> impl Iterator<Item = &f64> {
        self.recent.iter()
    }

    pub fn best(&self) -> Option<f64> {
        self.recent.iter().copied().reduce(f64::min)
    }

    fn tick(&mut self, time_step: f64) {
        self.current += time_step;
    }

    fn complete_lap(&mut self) {
        self.recent.push_front(self.current);
        self.recent.truncate(RECENT_LAP_COUNT);
        self.current = 0.0;
    }
}

pub struct SimulationStep {
    pub completed_laps: Vec<LapNumber>,
    pub trap_outcomes: Vec<TrapOutcome>,
}

/// The part of the game every peer runs for its own car: integrate, check the
/// traps it can see, time its laps. Nothing in here talks to the network.
pub struct Simulation {
    track: Track,
    vehicle: VehiclePhysics,
    traps: TrapField,
    lap_timer: LapTimer,
}

impl Simulation {
    pub fn new(track: Track) -> Self {
        let traps = TrapField::for_track(&track);
        Simulation {
            track,
            vehicle: VehiclePhysics::default(),
            traps,
            lap_timer: LapTimer::default(),
        }
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn vehicle(&self) -> &VehiclePhysics {
        &self.vehicle
    }

    pub fn traps(&self) -> &TrapField {
        &self.traps
    }

    pub fn lap_timer(&self) -> &LapTimer {
        &self.lap_timer
    }

    pub fn advance(
        &mut self,
        inputs: &DriverInputs,
        phase: RacePhase,
        elapsed: Duration,
    ) -> SimulationStep {
        let time_step = clamp_time_step(elapsed);
        let step = self
            .vehicle
            .do_physics_step(time_step, inputs, phase, &self.track);
        self.vehicle = step.vehicle;

        self.lap_timer.tick(time_step);
        for _ in &step.completed_laps {
            self.lap_timer.complete_lap();
        }

        let trap_outcomes = self.traps.evaluate(&mut self.vehicle, &self.track);

        SimulationStep {
            completed_laps: step.completed_laps,
            trap_outcomes,
        }
    }

    // back to the grid for a new race: fresh car, fresh traps, fresh clock
    pub fn reset_to_lane(&mut self, lane_index: usize) {
        self.vehicle = VehiclePhysics::on_grid(lane_index);
        self.traps = TrapField::for_track(&self.track);
        self.lap_timer = LapTimer::default();
    }
}
