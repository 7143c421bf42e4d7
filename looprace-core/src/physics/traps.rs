use crate::track::Track;

use super::constants::*;
use super::VehiclePhysics;

// A hazard sitting in one lane of the road. Whether it has been used up is
// only known to the peer looking at it; nobody else is told
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Trap {
    pub track_position: f64,
    pub lateral_offset: f64,
    pub consumed: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TrapOutcome {
    Hit,
    NearMiss,
    Passed,
}

impl Trap {
    pub fn new(track_position: f64, lateral_offset: f64) -> Self {
        Trap {
            track_position,
            lateral_offset,
            consumed: false,
        }
    }

    // relative_position is how far ahead of the car the trap is
    fn trigger(&mut self, vehicle: &mut VehiclePhysics, relative_position: f64) -> Option<TrapOutcome> {
        if relative_position < -TRAP_PASSED_THRESHOLD {
            self.consumed = true;
            return Some(TrapOutcome::Passed);
        }

        if relative_position.abs() < TRAP_NEAR_FIELD {
            self.consumed = true;
            if (vehicle.lateral_offset - self.lateral_offset).abs() < TRAP_HIT_RADIUS {
                vehicle.speed *= TRAP_SPEED_FACTOR;
                return Some(TrapOutcome::Hit);
            }
            return Some(TrapOutcome::NearMiss);
        }

        None
    }
}

pub struct TrapField {
    traps: Vec<Trap>,
}

impl TrapField {
    pub fn new(traps: Vec<Trap>) -> Self {
        TrapField { traps }
    }

    /// Lays traps out at a fixed spacing from the start of the loop, cycling
    /// through the lanes; the same track always produces the same field.
    pub fn for_track(track: &Track) -> Self {
        let mut traps = Vec::new();
        let track_distance = track.track_distance();
        let mut position = TRAP_FIRST_POSITION;

        while position < track_distance {
            let lane = TRAP_LANE_OFFSETS[traps.len() % TRAP_LANE_OFFSETS.len()];
            traps.push(Trap::new(position, lane));
            position += TRAP_SPACING;
        }

        TrapField { traps }
    }

    pub fn traps(&self) -> &[Trap] {
        &self.traps
    }

    pub fn remaining(&self) -> usize {
        self.traps.iter().filter(|trap| !trap.consumed).count()
    }

    pub fn evaluate(&mut self, vehicle: &mut VehiclePhysics, track: &Track) -> Vec<TrapOutcome> {
        if track.track_distance() <= 0.0 {
            return Vec::new();
        }

        self.traps
            .iter_mut()
            .filter(|trap| !trap.consumed)
            .filter_map(|trap| {
                let relative_position =
                    track.shortest_delta(vehicle.distance, trap.track_position);
                trap.trigger(vehicle, relative_position)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn car_at(distance: f64, lateral_offset: f64) -> VehiclePhysics {
        VehiclePhysics {
            distance,
            speed: 0.8,
            lateral_offset,
            ..VehiclePhysics::default()
        }
    }

    #[test]
    fn test_standard_field_layout() {
        let field = TrapField::for_track(&Track::standard());
        let positions: Vec<f64> = field.traps().iter().map(|t| t.track_position).collect();
        let offsets: Vec<f64> = field.traps().iter().map(|t| t.lateral_offset).collect();
        assert_eq!(positions, vec![80.0, 880.0, 1680.0]);
        assert_eq!(offsets, vec![-0.35, 0.0, 0.35]);
        assert_eq!(field.remaining(), 3);
    }

    #[test]
    fn test_hit_halves_speed_once() {
        let track = Track::standard();
        let mut field = TrapField::new(vec![Trap::new(80.0, 0.0)]);

        let mut car = car_at(78.0, 0.05);
        assert_eq!(field.evaluate(&mut car, &track), vec![TrapOutcome::Hit]);
        assert!((car.speed - 0.4).abs() < 1e-12);

        car.distance = 81.0;
        assert!(field.evaluate(&mut car, &track).is_empty());
        assert!((car.speed - 0.4).abs() < 1e-12);
        assert_eq!(field.remaining(), 0);
    }

    #[test]
    fn test_near_miss_uses_up_trap() {
        let track = Track::standard();
        let mut field = TrapField::new(vec![Trap::new(80.0, -0.35)]);

        let mut car = car_at(77.0, 0.2);
        assert_eq!(field.evaluate(&mut car, &track), vec![TrapOutcome::NearMiss]);
        assert_eq!(car.speed, 0.8);
        assert_eq!(field.remaining(), 0);
    }

    #[test]
    fn test_back_half_trap_is_passed_at_start_line() {
        let track = Track::standard();
        let mut field = TrapField::for_track(&track);

        // 1680 is more than half a lap ahead of 0, so it sits 530 behind us
        let mut car = car_at(0.0, 0.35);
        assert_eq!(field.evaluate(&mut car, &track), vec![TrapOutcome::Passed]);
        assert_eq!(car.speed, 0.8);
        assert_eq!(field.remaining(), 2);
        assert!(field.traps()[2].consumed);

        // and it does not come back on the way round
        car.distance = 1679.0;
        car.lateral_offset = 0.35;
        let outcomes = field.evaluate(&mut car, &track);
        assert!(!outcomes.contains(&TrapOutcome::Hit));
        assert_eq!(car.speed, 0.8);
    }

    #[test]
    fn test_trap_just_behind_is_passed() {
        let track = Track::standard();
        let mut field = TrapField::new(vec![Trap::new(80.0, 0.0)]);

        let mut car = car_at(90.0, 0.0);
        assert_eq!(field.evaluate(&mut car, &track), vec![TrapOutcome::Passed]);
        assert_eq!(car.speed, 0.8);
    }

    #[test]
    fn test_trap_near_start_line_wraps() {
        let track = Track::new(&[(0.0, 200.0), (-1.0, 100.0)]);
        let mut field = TrapField::new(vec![Trap::new(2.0, 0.0)]);

        // 298 -> 2 is four units ahead across the line
        let mut car = car_at(298.0, 0.0);
        assert_eq!(field.evaluate(&mut car, &track), vec![TrapOutcome::Hit]);
    }
}
