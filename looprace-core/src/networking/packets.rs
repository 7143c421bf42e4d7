use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::physics::VehiclePhysics;
use crate::race::{LapNumber, RacePhase};
use crate::vehicle::{Direction, VehicleState};
use crate::PlayerID;

// A field of the wrong type is dropped on its own instead of failing the
// whole message
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

fn lenient_finite<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<f64> = lenient(deserializer)?;
    Ok(value.filter(|value| value.is_finite()))
}

/// What a peer says about its own car. Every field is optional: whatever is
/// present and well-typed gets applied, the rest is left as it was.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VehicleUpdate {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    #[serde(default, deserialize_with = "lenient_finite", skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(default, deserialize_with = "lenient_finite", skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub nitro_active: Option<bool>,
    #[serde(default, deserialize_with = "lenient_finite", skip_serializing_if = "Option::is_none")]
    pub lateral_offset: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub lap: Option<LapNumber>,
}

impl VehicleUpdate {
    pub fn from_physics(vehicle: &VehiclePhysics) -> Self {
        VehicleUpdate {
            direction: Some(vehicle.direction),
            distance: Some(vehicle.distance),
            speed: Some(vehicle.speed),
            nitro_active: Some(vehicle.nitro.active),
            lateral_offset: Some(vehicle.lateral_offset),
            lap: Some(vehicle.lap),
        }
    }

    pub fn apply_to(&self, state: &mut VehicleState) {
        if let Some(direction) = self.direction {
            state.direction = direction;
        }
        if let Some(distance) = self.distance {
            state.distance = distance;
        }
        if let Some(speed) = self.speed {
            state.speed = speed;
        }
        if let Some(nitro_active) = self.nitro_active {
            state.nitro_active = nitro_active;
        }
        if let Some(lateral_offset) = self.lateral_offset {
            state.lateral_offset = lateral_offset;
        }
        if let Some(lap) = self.lap {
            state.lap = lap;
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ServerBoundPacket {
    // Entering the room
    Join {
        #[serde(default, deserialize_with = "lenient")]
        name: Option<String>,
        #[serde(default, deserialize_with = "lenient")]
        mobile: Option<bool>,
        #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
        password: Option<String>,
    },
    MarkMobile,

    // Driving
    UpdateState(VehicleUpdate),
    LapCompleted {
        #[serde(default, deserialize_with = "lenient_finite")]
        lap: Option<f64>,
    },

    // Admin only
    StartGame,
    #[serde(rename_all = "camelCase")]
    KickPlayer { target_id: PlayerID },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type")]
pub enum GameUpdate {
    #[serde(rename = "STATE_CHANGE")]
    StateChange { state: RacePhase },
    #[serde(rename = "COUNTDOWN")]
    Countdown { value: i32 },
    #[serde(rename = "RESET_POSITIONS")]
    ResetPositions { roster: Vec<VehicleState> },
    #[serde(rename = "LAP_WINNER")]
    LapWinner {
        lap: LapNumber,
        id: PlayerID,
        name: String,
        #[serde(rename = "displayForMs", with = "serde_millis")]
        display_for: Duration,
    },
    #[serde(rename = "LAP1_WINNER")]
    FirstLapWinner {
        id: PlayerID,
        name: String,
        #[serde(rename = "displayForMs", with = "serde_millis")]
        display_for: Duration,
    },
    #[serde(rename = "RACE_WINNER")]
    RaceWinner {
        id: PlayerID,
        name: String,
        #[serde(rename = "displayForMs", with = "serde_millis")]
        display_for: Duration,
    },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ClientBoundPacket {
    // Accepted into the room
    #[serde(rename_all = "camelCase")]
    Welcome {
        id: PlayerID,
        roster: Vec<VehicleState>,
        phase: RacePhase,
        countdown_value: i32,
    },

    // Full roster resync after a join, leave or rename
    State { roster: Vec<VehicleState> },

    // Another peer's car moved
    PlayerUpdated(VehicleState),

    // Race progression and winners
    GameUpdate(GameUpdate),

    // Terminal notifications
    Error { message: String },
    Kicked { message: String },
}

pub trait Packet: Serialize + DeserializeOwned {
    fn parse_packet(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
    fn to_text(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Packet for ClientBoundPacket {}
impl Packet for ServerBoundPacket {}
