use serde::{Deserialize, Serialize};

use crate::race::LapNumber;
use crate::PlayerID;

pub const LANE_COUNT: usize = 4;

// lateral offset of each lane's grid slot on the start line
pub const SPAWN_OFFSETS: [f64; LANE_COUNT] = [-0.6, -0.2, 0.2, 0.6];

pub const SPRITE_COUNT: usize = 6;

const MOBILE_SUFFIX: &str = " 📱";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Left,
    Straight,
    Right,
}

impl Default for Direction {
    fn default() -> Self {
        Direction::Straight
    }
}

pub fn spawn_offset(lane_index: usize) -> f64 {
    SPAWN_OFFSETS[lane_index % LANE_COUNT]
}

pub fn mobile_display_name(name: &str) -> String {
    if name.ends_with(MOBILE_SUFFIX) {
        name.to_string()
    } else {
        format!("{}{}", name, MOBILE_SUFFIX)
    }
}

/// A vehicle as the authority and every other peer see it. Only the owning
/// peer changes the driving fields; the authority owns lane, names and sprite.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VehicleState {
    pub id: PlayerID,
    pub name: String,
    pub display_name: String,
    pub is_mobile: bool,
    pub lane_index: usize,
    pub distance: f64,
    pub lateral_offset: f64,
    pub speed: f64,
    pub direction: Direction,
    pub nitro_active: bool,
    pub lap: LapNumber,
    pub sprite_index: usize,
}

impl VehicleState {
    pub fn new(
        id: PlayerID,
        name: String,
        is_mobile: bool,
        lane_index: usize,
        sprite_index: usize,
    ) -> Self {
        let display_name = if is_mobile {
            mobile_display_name(&name)
        } else {
            name.clone()
        };

        VehicleState {
            id,
            name,
            display_name,
            is_mobile,
            lane_index,
            distance: 0.0,
            lateral_offset: spawn_offset(lane_index),
            speed: 0.0,
            direction: Direction::Straight,
            nitro_active: false,
            lap: 0,
            sprite_index,
        }
    }

    // put the vehicle back on the grid slot of the given lane
    pub fn reset_to_lane(&mut self, lane_index: usize) {
        self.lane_index = lane_index % LANE_COUNT;
        self.distance = 0.0;
        self.speed = 0.0;
        self.direction = Direction::Straight;
        self.nitro_active = false;
        self.lap = 0;
        self.lateral_offset = spawn_offset(self.lane_index);
    }
}
