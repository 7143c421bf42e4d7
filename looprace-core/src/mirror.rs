use std::collections::HashMap;

use crate::track::Track;
use crate::vehicle::VehicleState;
use crate::PlayerID;

// share of the gap to the reported distance closed on every render tick
pub const DISTANCE_SMOOTHING: f64 = 0.2;

#[derive(Clone, Debug)]
pub struct MirroredVehicle {
    pub state: VehicleState,
    // where we draw the car; eases toward state.distance
    pub render_distance: f64,
}

impl MirroredVehicle {
    fn new(state: VehicleState) -> Self {
        let render_distance = state.distance;
        MirroredVehicle {
            state,
            render_distance,
        }
    }

    fn smooth(&mut self, track: &Track) {
        if track.track_distance() <= 0.0 {
            return;
        }
        let gap = track.shortest_delta(self.render_distance, self.state.distance);
        self.render_distance = track.wrap(self.render_distance + gap * DISTANCE_SMOOTHING);
    }
}

/// Read-only copies of every vehicle in the room, as last reported. Nothing
/// here is ever sent back: each peer only writes its own car.
#[derive(Default)]
pub struct RemoteVehicles {
    vehicles: HashMap<PlayerID, MirroredVehicle>,
}

impl RemoteVehicles {
    pub fn new() -> Self {
        RemoteVehicles::default()
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    pub fn get(&self, id: &PlayerID) -> Option<&MirroredVehicle> {
        self.vehicles.get(id)
    }

    // everyone but us
    pub fn others(&self, own_id: Option<PlayerID>) -> impl Iterator<Item = &MirroredVehicle> {
        self.vehicles
            .values()
            .filter(move |vehicle| Some(vehicle.state.id) != own_id)
    }

    /// Throw away what we had and take the roster as the new truth, snapping
    /// render positions; used on welcome and on grid resets.
    pub fn replace_all(&mut self, roster: &[VehicleState]) {
        self.vehicles = roster
            .iter()
            .map(|state| (state.id, MirroredVehicle::new(state.clone())))
            .collect();
    }

    /// Join/leave reconciliation against a full roster. Known vehicles only
    /// take the fields the authority owns, so a snapshot that lags behind the
    /// per-vehicle updates can't drag a car backwards.
    pub fn reconcile(&mut self, roster: &[VehicleState]) {
        self.vehicles
            .retain(|id, _| roster.iter().any(|state| state.id == *id));

        for state in roster {
            match self.vehicles.get_mut(&state.id) {
                Some(known) => {
                    known.state.name = state.name.clone();
                    known.state.display_name = state.display_name.clone();
                    known.state.is_mobile = state.is_mobile;
                    known.state.lane_index = state.lane_index;
                    known.state.sprite_index = state.sprite_index;
                }
                None => {
                    self.vehicles
                        .insert(state.id, MirroredVehicle::new(state.clone()));
                }
            }
        }
    }

    // a relayed per-vehicle update; the latest one simply wins
    pub fn apply_update(&mut self, state: VehicleState) {
        if let Some(known) = self.vehicles.get_mut(&state.id) {
            known.state = state;
        }
    }

    pub fn smooth(&mut self, track: &Track) {
        for vehicle in self.vehicles.values_mut() {
            vehicle.smooth(track);
        }
    }
}
