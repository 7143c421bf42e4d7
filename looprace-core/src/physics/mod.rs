use crate::player_inputs::DriverInputs;
use crate::race::{LapNumber, RacePhase};
use crate::track::Track;
use crate::vehicle::{spawn_offset, Direction};

pub mod constants;
pub mod nitro;
pub mod traps;


use constants::*;
use nitro::NitroState;

/// Everything a peer integrates for its own car. Other peers only ever see
/// the projection of this that goes out in `updateState`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VehiclePhysics {
    pub distance: f64,
    pub lap: LapNumber,
    pub speed: f64,

    // smoothed target curvature of the road under the car
    pub curvature: f64,
    // how far the road has bent in total since the last reset
    pub track_curvature: f64,
    // how far the driver has steered in total since the last reset
    pub lateral_curvature: f64,
    pub lateral_offset: f64,

    pub direction: Direction,
    pub nitro: NitroState,
}

pub struct PhysicsStep {
    pub vehicle: VehiclePhysics,
    // one entry per crossing of the start line, in order
    pub completed_laps: Vec<LapNumber>,
}

impl Default for VehiclePhysics {
    fn default() -> Self {
        VehiclePhysics {
            distance: 0.0,
            lap: 0,
            speed: 0.0,
            curvature: 0.0,
            track_curvature: 0.0,
            lateral_curvature: 0.0,
            lateral_offset: 0.0,
            direction: Direction::Straight,
            nitro: NitroState::default(),
        }
    }
}

impl VehiclePhysics {
    // a stationary car on the grid slot of the given lane
    pub fn on_grid(lane_index: usize) -> Self {
        let offset = spawn_offset(lane_index);
        VehiclePhysics {
            lateral_curvature: offset,
            lateral_offset: offset,
            ..VehiclePhysics::default()
        }
    }

    pub fn effective_speed(&self) -> f64 {
        self.speed * self.nitro.boost_factor
    }

    pub fn is_off_track(&self) -> bool {
        (self.lateral_curvature - self.track_curvature).abs() >= OFF_TRACK_THRESHOLD
    }

    /* Given the held inputs and the race phase, compute and return what next
     * tick's state will be for this car, along with any laps finished on the
     * way. The caller bounds time_step; nothing here assumes it is small */
    pub fn do_physics_step(
        &self,
        time_step: f64,
        inputs: &DriverInputs,
        phase: RacePhase,
        track: &Track,
    ) -> PhysicsStep {
        let mut next = *self;

        match phase {
            // held on the grid: brake to a stop, no steering, no boost
            RacePhase::Countdown => {
                next.speed = f64::max(0.0, next.speed - COUNTDOWN_BRAKE_RATE * time_step);
                next.direction = Direction::Straight;
                next.nitro = self.nitro.tick(false, false, time_step);
            }
            RacePhase::Waiting | RacePhase::Racing => {
                if inputs.accelerate {
                    next.speed += ACCELERATION_RATE * time_step;
                } else {
                    next.speed -= DECELERATION_RATE * time_step;
                }

                // turning gets harder the faster we go
                next.lateral_curvature +=
                    STEER_RATE * time_step * (1.0 - next.speed / 2.0) * inputs.steer_sign();
                next.direction = inputs.direction();
                next.nitro = self.nitro.tick(inputs.nitro, inputs.accelerate, time_step);
            }
        }

        if next.is_off_track() {
            next.speed -= OFF_TRACK_PENALTY_RATE * time_step;
        }
        next.speed = next.speed.clamp(0.0, 1.0);

        let effective_speed = next.effective_speed();
        next.distance += BASE_DISTANCE_RATE * effective_speed * time_step;

        let mut completed_laps = Vec::new();
        let track_distance = track.track_distance();
        if track_distance > 0.0 {
            while next.distance >= track_distance {
                next.distance -= track_distance;
                next.lap += 1;
                completed_laps.push(next.lap);
            }
        }

        // the road bends in gradually, and not at all while standing still
        let target_curvature = track.curvature_at(next.distance);
        next.curvature += (target_curvature - next.curvature) * time_step * effective_speed;
        next.track_curvature += next.curvature * time_step * effective_speed;

        next.lateral_offset = next.lateral_curvature - next.track_curvature;

        PhysicsStep {
            vehicle: next,
            completed_laps,
        }
    }
}
