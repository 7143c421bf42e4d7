use std::fmt;

use rand::Rng;

use looprace_core::vehicle::{mobile_display_name, VehicleState, LANE_COUNT, SPRITE_COUNT};
use looprace_core::PlayerID;

use super::room::RoomSettings;

const DEFAULT_NAME: &str = "Guest";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JoinRejection {
    AlreadyJoined,
    RoomFull(usize),
    BannedName,
    NameTaken,
    AdminPasswordRequired,
}

impl fmt::Display for JoinRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinRejection::AlreadyJoined => write!(f, "You have already joined"),
            JoinRejection::RoomFull(capacity) => {
                write!(f, "The room is full (max {} players)", capacity)
            }
            JoinRejection::BannedName => write!(f, "That nickname is not allowed"),
            JoinRejection::NameTaken => {
                write!(f, "That nickname is already in use, please pick another")
            }
            JoinRejection::AdminPasswordRequired => {
                write!(f, "This nickname requires the correct password")
            }
        }
    }
}

pub struct JoinRequest<'a> {
    pub name: Option<&'a str>,
    pub mobile: bool,
    pub password: Option<&'a str>,
}

// trimmed, never empty, at most max_length characters
pub fn sanitize_name(raw: Option<&str>, max_length: usize) -> String {
    let trimmed = raw.map(str::trim).unwrap_or("");
    if trimmed.is_empty() {
        return DEFAULT_NAME.to_string();
    }
    trimmed.chars().take(max_length).collect()
}

pub fn contains_banned_word(name: &str, banned_words: &[String]) -> bool {
    let name = name.to_lowercase();
    banned_words
        .iter()
        .map(|word| word.trim().to_lowercase())
        .any(|word| !word.is_empty() && name.contains(&word))
}

/// Everyone who has joined the room, in join order. Lane reassignment on a
/// new race goes by this order.
#[derive(Default)]
pub struct Roster {
    vehicles: Vec<VehicleState>,
}

impl Roster {
    pub fn new() -> Self {
        Roster::default()
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    pub fn contains(&self, id: &PlayerID) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: &PlayerID) -> Option<&VehicleState> {
        self.vehicles.iter().find(|vehicle| vehicle.id == *id)
    }

    pub fn get_mut(&mut self, id: &PlayerID) -> Option<&mut VehicleState> {
        self.vehicles.iter_mut().find(|vehicle| vehicle.id == *id)
    }

    pub fn snapshot(&self) -> Vec<VehicleState> {
        self.vehicles.clone()
    }

    pub fn remove(&mut self, id: &PlayerID) -> Option<VehicleState> {
        let index = self.vehicles.iter().position(|vehicle| vehicle.id == *id)?;
        Some(self.vehicles.remove(index))
    }

    // first lane nobody is in, otherwise any lane
    pub fn next_lane(&self, rng: &mut impl Rng) -> usize {
        (0..LANE_COUNT)
            .find(|lane| !self.vehicles.iter().any(|vehicle| vehicle.lane_index == *lane))
            .unwrap_or_else(|| rng.gen_range(0..LANE_COUNT))
    }

    pub fn admit(
        &mut self,
        id: PlayerID,
        request: JoinRequest,
        settings: &RoomSettings,
        rng: &mut impl Rng,
    ) -> Result<&VehicleState, JoinRejection> {
        if self.contains(&id) {
            return Err(JoinRejection::AlreadyJoined);
        }
        if self.vehicles.len() >= settings.max_players {
            return Err(JoinRejection::RoomFull(settings.max_players));
        }

        let name = sanitize_name(request.name, settings.max_name_length);
        if contains_banned_word(&name, &settings.banned_words) {
            return Err(JoinRejection::BannedName);
        }
        if self.vehicles.iter().any(|vehicle| vehicle.name == name) {
            return Err(JoinRejection::NameTaken);
        }
        if name == settings.admin_name && request.password != Some(settings.admin_password.as_str())
        {
            return Err(JoinRejection::AdminPasswordRequired);
        }

        let lane_index = self.next_lane(rng);
        let sprite_index = rng.gen_range(0..SPRITE_COUNT);
        self.vehicles.push(VehicleState::new(
            id,
            name,
            request.mobile,
            lane_index,
            sprite_index,
        ));

        let index = self.vehicles.len() - 1;
        Ok(&self.vehicles[index])
    }

    pub fn mark_mobile(&mut self, id: &PlayerID) -> bool {
        match self.get_mut(id) {
            Some(vehicle) => {
                vehicle.is_mobile = true;
                vehicle.display_name = mobile_display_name(&vehicle.display_name);
                true
            }
            None => false,
        }
    }

    // everyone back on the start line, lanes dealt out in join order
    pub fn reset_to_grid(&mut self) {
        for (index, vehicle) in self.vehicles.iter_mut().enumerate() {
            vehicle.reset_to_lane(index % LANE_COUNT);
        }
    }
}
