use crate::vehicle::Direction;

// DriverInputs is what the input layer hands the integrator each frame: the
// intents currently held down, nothing more
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq)]
pub struct DriverInputs {
    pub accelerate: bool,
    pub steer_left: bool,
    pub steer_right: bool,
    pub nitro: bool,
}

impl DriverInputs {
    pub fn idle() -> Self {
        DriverInputs::default()
    }

    // both keys held cancel out
    pub fn steer_sign(&self) -> f64 {
        let left = if self.steer_left { 1.0 } else { 0.0 };
        let right = if self.steer_right { 1.0 } else { 0.0 };
        right - left
    }

    // what peers are told the car is doing; right wins when both are held
    pub fn direction(&self) -> Direction {
        if self.steer_right {
            Direction::Right
        } else if self.steer_left {
            Direction::Left
        } else {
            Direction::Straight
        }
    }
}
