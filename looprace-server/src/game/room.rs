use std::time::Instant;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use looprace_core::networking::{ClientBoundPacket, GameUpdate, ServerBoundPacket, VehicleUpdate};
use looprace_core::race::{
    LapNumber, LapWinner, RacePhase, LAP_WINNER_DISPLAY, RACE_LAPS, RACE_WINNER_DISPLAY,
};
use looprace_core::track::Track;
use looprace_core::{LapVerification, PlayerID, Settings};

use super::phase::{PhaseEvent, RaceStateMachine};
use super::roster::{JoinRequest, Roster};
use super::verification::{verifier_for, LapClaimVerifier};
use super::winners::{LapWinnerTracker, WinnerEvent};

const KICK_MESSAGE: &str = "You have been removed from the race";

// What the room needs to know from the config file
#[derive(Clone, Debug)]
pub struct RoomSettings {
    pub max_players: usize,
    pub admin_name: String,
    pub admin_password: String,
    pub countdown_start: i32,
    pub max_name_length: usize,
    pub banned_words: Vec<String>,
    pub admin_join_starts_race: bool,
    pub lap_verification: LapVerification,
}

impl RoomSettings {
    pub fn from_config(settings: &Settings) -> Self {
        RoomSettings {
            max_players: settings.max_players,
            admin_name: settings.admin_name.clone(),
            admin_password: settings.admin_password.clone(),
            countdown_start: settings.countdown_start,
            max_name_length: settings.max_name_length,
            banned_words: settings.banned_words.clone(),
            admin_join_starts_race: settings.admin_join_starts_race,
            lap_verification: settings.lap_verification,
        }
    }
}

impl Default for RoomSettings {
    fn default() -> Self {
        RoomSettings {
            max_players: 60,
            admin_name: "admin".to_string(),
            admin_password: "changeme".to_string(),
            countdown_start: 10,
            max_name_length: 12,
            banned_words: Vec::new(),
            admin_join_starts_race: true,
            lap_verification: LapVerification::Trust,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Recipient {
    One(PlayerID),
    All,
    AllExcept(PlayerID),
}

/// Everything the room wants done on the network after handling an event,
/// in the order it should happen.
#[derive(Default, Debug)]
pub struct Outbox {
    pub messages: Vec<(Recipient, ClientBoundPacket)>,
    // connections to close once their queued messages are out
    pub disconnects: Vec<PlayerID>,
}

impl Outbox {
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.disconnects.is_empty()
    }

    fn send(&mut self, id: PlayerID, packet: ClientBoundPacket) {
        self.messages.push((Recipient::One(id), packet));
    }

    fn broadcast(&mut self, packet: ClientBoundPacket) {
        self.messages.push((Recipient::All, packet));
    }

    fn broadcast_except(&mut self, id: PlayerID, packet: ClientBoundPacket) {
        self.messages.push((Recipient::AllExcept(id), packet));
    }

    fn game_update(&mut self, update: GameUpdate) {
        self.broadcast(ClientBoundPacket::GameUpdate(update));
    }
}

/// The shared race: who is in it, what phase it is in, and who has won what.
/// It never touches a socket; every handler hands back an `Outbox`.
pub struct RaceRoom {
    settings: RoomSettings,
    roster: Roster,
    race: RaceStateMachine,
    winners: LapWinnerTracker,
    verifier: Box<dyn LapClaimVerifier>,
    rng: StdRng,
}

impl RaceRoom {
    pub fn new(settings: RoomSettings) -> Self {
        Self::with_rng(settings, StdRng::from_entropy())
    }

    pub fn with_rng(settings: RoomSettings, rng: StdRng) -> Self {
        let verifier = verifier_for(settings.lap_verification, Track::standard().track_distance());
        RaceRoom {
            race: RaceStateMachine::new(settings.countdown_start),
            settings,
            roster: Roster::new(),
            winners: LapWinnerTracker::new(),
            verifier,
            rng,
        }
    }

    pub fn phase(&self) -> RacePhase {
        self.race.phase()
    }

    pub fn countdown_value(&self) -> i32 {
        self.race.countdown_value()
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn winners(&self) -> &LapWinnerTracker {
        &self.winners
    }

    fn is_admin(&self, id: &PlayerID) -> bool {
        self.roster
            .get(id)
            .map_or(false, |vehicle| vehicle.name == self.settings.admin_name)
    }

    pub fn handle_packet(&mut self, from: PlayerID, packet: ServerBoundPacket, now: Instant) -> Outbox {
        let mut outbox = Outbox::default();

        match packet {
            ServerBoundPacket::Join {
                name,
                mobile,
                password,
            } => {
                let request = JoinRequest {
                    name: name.as_deref(),
                    mobile: mobile.unwrap_or(false),
                    password: password.as_deref(),
                };
                self.join(from, request, now, &mut outbox);
            }
            ServerBoundPacket::MarkMobile => {
                if self.roster.mark_mobile(&from) {
                    outbox.broadcast(ClientBoundPacket::State {
                        roster: self.roster.snapshot(),
                    });
                }
            }
            ServerBoundPacket::UpdateState(update) => self.update_state(from, update, &mut outbox),
            ServerBoundPacket::LapCompleted { lap } => self.lap_completed(from, lap, &mut outbox),
            ServerBoundPacket::StartGame => {
                if self.is_admin(&from) {
                    self.begin_countdown(now, &mut outbox);
                }
            }
            ServerBoundPacket::KickPlayer { target_id } => {
                if self.is_admin(&from) {
                    self.kick(target_id, &mut outbox);
                }
            }
        }

        outbox
    }

    // the connection went away, for whatever reason
    pub fn handle_disconnect(&mut self, id: PlayerID) -> Outbox {
        let mut outbox = Outbox::default();
        if let Some(vehicle) = self.roster.remove(&id) {
            info!("{} left the room", vehicle.name);
            self.verifier.forget(&id);
            outbox.broadcast(ClientBoundPacket::State {
                roster: self.roster.snapshot(),
            });
        }
        outbox
    }

    pub fn update(&mut self, now: Instant) -> Outbox {
        let mut outbox = Outbox::default();
        for event in self.race.tick(now) {
            match event {
                PhaseEvent::Countdown(value) => {
                    outbox.game_update(GameUpdate::Countdown { value });
                }
                PhaseEvent::Racing => {
                    info!("race is on");
                    outbox.game_update(GameUpdate::StateChange {
                        state: RacePhase::Racing,
                    });
                }
            }
        }
        outbox
    }

    fn join(&mut self, id: PlayerID, request: JoinRequest, now: Instant, outbox: &mut Outbox) {
        let (display_name, lane_index) = match self
            .roster
            .admit(id, request, &self.settings, &mut self.rng)
        {
            Ok(vehicle) => (vehicle.display_name.clone(), vehicle.lane_index),
            Err(rejection) => {
                info!("turned away a join: {}", rejection);
                outbox.send(
                    id,
                    ClientBoundPacket::Error {
                        message: rejection.to_string(),
                    },
                );
                return;
            }
        };
        info!(
            "{} joined in lane {} ({} in the room)",
            display_name,
            lane_index,
            self.roster.len()
        );

        outbox.send(
            id,
            ClientBoundPacket::Welcome {
                id,
                roster: self.roster.snapshot(),
                phase: self.race.phase(),
                countdown_value: self.race.countdown_value(),
            },
        );
        outbox.broadcast(ClientBoundPacket::State {
            roster: self.roster.snapshot(),
        });

        if self.settings.admin_join_starts_race
            && self.race.phase() == RacePhase::Waiting
            && self.is_admin(&id)
        {
            self.begin_countdown(now, outbox);
        }
    }

    fn update_state(&mut self, from: PlayerID, update: VehicleUpdate, outbox: &mut Outbox) {
        let vehicle = match self.roster.get_mut(&from) {
            Some(vehicle) => vehicle,
            None => return,
        };

        update.apply_to(vehicle);
        self.verifier.observe_distance(from, vehicle.distance);

        outbox.broadcast_except(from, ClientBoundPacket::PlayerUpdated(vehicle.clone()));
    }

    fn lap_completed(&mut self, from: PlayerID, lap: Option<f64>, outbox: &mut Outbox) {
        let name = match self.roster.get(&from) {
            Some(vehicle) => vehicle.name.clone(),
            None => return,
        };
        let lap = match lap.map(f64::trunc) {
            Some(lap) if lap >= 1.0 && lap <= RACE_LAPS as f64 => lap as LapNumber,
            _ => return,
        };
        if !self.verifier.accept(&from, lap) {
            warn!("not believing {}'s claim to have finished lap {}", name, lap);
            return;
        }

        let winner = LapWinner { id: from, name };
        for event in self.winners.record(lap, &winner) {
            let update = match event {
                WinnerEvent::Lap { lap, winner } => {
                    info!("{} is first through lap {}", winner.name, lap);
                    GameUpdate::LapWinner {
                        lap,
                        id: winner.id,
                        name: winner.name,
                        display_for: LAP_WINNER_DISPLAY,
                    }
                }
                WinnerEvent::FirstLap(winner) => GameUpdate::FirstLapWinner {
                    id: winner.id,
                    name: winner.name,
                    display_for: LAP_WINNER_DISPLAY,
                },
                WinnerEvent::Race(winner) => {
                    info!("{} wins the race", winner.name);
                    GameUpdate::RaceWinner {
                        id: winner.id,
                        name: winner.name,
                        display_for: RACE_WINNER_DISPLAY,
                    }
                }
            };
            outbox.game_update(update);
        }
    }

    fn begin_countdown(&mut self, now: Instant, outbox: &mut Outbox) {
        if !self.race.begin_countdown(now) {
            debug!("start ignored, countdown already running");
            return;
        }
        info!("countdown started with {} in the room", self.roster.len());

        self.winners.reset();
        self.verifier.reset();
        self.roster.reset_to_grid();

        outbox.game_update(GameUpdate::ResetPositions {
            roster: self.roster.snapshot(),
        });
        outbox.game_update(GameUpdate::StateChange {
            state: RacePhase::Countdown,
        });
    }

    fn kick(&mut self, target: PlayerID, outbox: &mut Outbox) {
        let vehicle = match self.roster.remove(&target) {
            Some(vehicle) => vehicle,
            None => return,
        };
        info!("kicked {}", vehicle.name);
        self.verifier.forget(&target);

        outbox.send(
            target,
            ClientBoundPacket::Kicked {
                message: KICK_MESSAGE.to_string(),
            },
        );
        outbox.disconnects.push(target);
        outbox.broadcast(ClientBoundPacket::State {
            roster: self.roster.snapshot(),
        });
    }
}
