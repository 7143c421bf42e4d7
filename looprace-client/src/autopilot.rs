use looprace_core::physics::constants::NITRO_MAX_CHARGE;
use looprace_core::physics::VehiclePhysics;
use looprace_core::player_inputs::DriverInputs;
use looprace_core::race::RacePhase;
use looprace_core::vehicle::spawn_offset;

// how far off the chosen line the car may drift before it steers back
const LINE_TOLERANCE: f64 = 0.05;

pub trait InputSource {
    fn poll(&mut self, vehicle: &VehiclePhysics, phase: RacePhase) -> DriverInputs;

    // the authority put us in this lane
    fn follow_lane(&mut self, _lane_index: usize) {}
}

/// Drives flat out along a fixed lateral line and burns the whole nitro
/// meter whenever it is full.
pub struct Autopilot {
    line: f64,
    boosting: bool,
}

impl Autopilot {
    pub fn new(line: f64) -> Self {
        Autopilot {
            line,
            boosting: false,
        }
    }
}

impl InputSource for Autopilot {
    fn follow_lane(&mut self, lane_index: usize) {
        self.line = spawn_offset(lane_index);
    }

    fn poll(&mut self, vehicle: &VehiclePhysics, phase: RacePhase) -> DriverInputs {
        if phase == RacePhase::Countdown {
            self.boosting = false;
            return DriverInputs::idle();
        }

        if vehicle.nitro.charge >= NITRO_MAX_CHARGE {
            self.boosting = true;
        } else if vehicle.nitro.charge <= 0.0 {
            self.boosting = false;
        }

        let drift = vehicle.lateral_offset - self.line;
        DriverInputs {
            accelerate: true,
            steer_left: drift > LINE_TOLERANCE,
            steer_right: drift < -LINE_TOLERANCE,
            nitro: self.boosting,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn car(lateral_offset: f64, charge: f64) -> VehiclePhysics {
        let mut vehicle = VehiclePhysics::default();
        vehicle.lateral_offset = lateral_offset;
        vehicle.nitro.charge = charge;
        vehicle
    }

    #[test]
    fn test_steers_back_to_line() {
        let mut autopilot = Autopilot::new(0.2);

        let inputs = autopilot.poll(&car(0.5, 50.0), RacePhase::Racing);
        assert!(inputs.steer_left && !inputs.steer_right);

        let inputs = autopilot.poll(&car(-0.1, 50.0), RacePhase::Racing);
        assert!(inputs.steer_right && !inputs.steer_left);

        let inputs = autopilot.poll(&car(0.22, 50.0), RacePhase::Racing);
        assert!(!inputs.steer_left && !inputs.steer_right);
        assert!(inputs.accelerate);
    }

    #[test]
    fn test_burns_full_meter_then_waits() {
        let mut autopilot = Autopilot::new(0.0);

        assert!(!autopilot.poll(&car(0.0, 60.0), RacePhase::Racing).nitro);
        assert!(autopilot.poll(&car(0.0, 100.0), RacePhase::Racing).nitro);
        assert!(autopilot.poll(&car(0.0, 40.0), RacePhase::Racing).nitro);
        assert!(!autopilot.poll(&car(0.0, 0.0), RacePhase::Racing).nitro);
        assert!(!autopilot.poll(&car(0.0, 30.0), RacePhase::Racing).nitro);
    }

    #[test]
    fn test_keeps_to_assigned_lane() {
        let mut autopilot = Autopilot::new(0.0);
        autopilot.follow_lane(3);

        let inputs = autopilot.poll(&car(0.0, 50.0), RacePhase::Racing);
        assert!(inputs.steer_right);
        let inputs = autopilot.poll(&car(0.6, 50.0), RacePhase::Racing);
        assert!(!inputs.steer_left && !inputs.steer_right);
    }

    #[test]
    fn test_hands_off_during_countdown() {
        let mut autopilot = Autopilot::new(0.0);
        let inputs = autopilot.poll(&car(0.6, 100.0), RacePhase::Countdown);
        assert_eq!(inputs, DriverInputs::idle());
    }
}
