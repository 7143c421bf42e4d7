use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::PlayerID;

pub type LapNumber = u32;

// laps 1..=RACE_LAPS are tracked; finishing the last one wins the race
pub const RACE_LAPS: LapNumber = 5;

pub const LAP_WINNER_DISPLAY: Duration = Duration::from_secs(4);
pub const RACE_WINNER_DISPLAY: Duration = Duration::from_secs(15);

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RacePhase {
    // Free driving while the room fills up; nothing is being timed
    Waiting,
    // Everyone has been put back on the grid and is held there until zero
    Countdown,
    // Laps count towards the winner board
    Racing,
}

impl Default for RacePhase {
    fn default() -> Self {
        RacePhase::Waiting
    }
}

impl fmt::Display for RacePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            RacePhase::Waiting => "WAITING",
            RacePhase::Countdown => "COUNTDOWN",
            RacePhase::Racing => "RACING",
        };
        f.write_str(tag)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LapWinner {
    pub id: PlayerID,
    pub name: String,
}

pub fn is_tracked_lap(lap: LapNumber) -> bool {
    (1..=RACE_LAPS).contains(&lap)
}
