use std::time::{Duration, Instant};

use anyhow::bail;
use log::{debug, info, warn};

use looprace_core::mirror::RemoteVehicles;
use looprace_core::networking::{
    ClientBoundPacket, GameUpdate, SendThrottle, ServerBoundPacket, VehicleUpdate,
};
use looprace_core::physics::traps::TrapOutcome;
use looprace_core::player_inputs::DriverInputs;
use looprace_core::race::RacePhase;
use looprace_core::simulation::Simulation;
use looprace_core::track::Track;
use looprace_core::vehicle::VehicleState;
use looprace_core::PlayerID;

use crate::race_view::RaceView;

#[derive(Clone, Debug, Default)]
pub struct SessionOptions {
    // ask for a race as soon as we are in
    pub start_race: bool,
    pub mobile: bool,
    // nickname to remove from the room once it shows up
    pub kick: Option<String>,
}

/// One peer's side of the race. Packets from the authority and frames from
/// the loop go in; packets for the authority come out.
pub struct RaceSession {
    options: SessionOptions,
    own_id: Option<PlayerID>,
    simulation: Simulation,
    mirror: RemoteVehicles,
    view: RaceView,
    throttle: SendThrottle,
    kick_sent: bool,
}

impl RaceSession {
    pub fn new(options: SessionOptions, track: Track, send_interval: Duration) -> Self {
        RaceSession {
            options,
            own_id: None,
            simulation: Simulation::new(track),
            mirror: RemoteVehicles::new(),
            view: RaceView::new(),
            throttle: SendThrottle::new(send_interval),
            kick_sent: false,
        }
    }

    pub fn own_id(&self) -> Option<PlayerID> {
        self.own_id
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn mirror(&self) -> &RemoteVehicles {
        &self.mirror
    }

    pub fn view(&self) -> &RaceView {
        &self.view
    }

    pub fn own_lane(&self) -> Option<usize> {
        let id = self.own_id?;
        self.mirror.get(&id).map(|own| own.state.lane_index)
    }

    pub fn handle_packet(
        &mut self,
        packet: ClientBoundPacket,
        now: Instant,
    ) -> anyhow::Result<Vec<ServerBoundPacket>> {
        let mut outgoing = Vec::new();

        match packet {
            ClientBoundPacket::Welcome {
                id,
                roster,
                phase,
                countdown_value,
            } => {
                info!("joined as {} while the race is {}", id, phase);
                self.own_id = Some(id);
                self.view.sync(phase, countdown_value);
                self.mirror.replace_all(&roster);

                if let Some(own) = roster.iter().find(|vehicle| vehicle.id == id) {
                    self.simulation.reset_to_lane(own.lane_index);
                    if self.options.mobile && !own.is_mobile {
                        outgoing.push(ServerBoundPacket::MarkMobile);
                    }
                }
                if self.options.start_race {
                    outgoing.push(ServerBoundPacket::StartGame);
                }
                self.kick_if_present(&roster, &mut outgoing);
            }
            ClientBoundPacket::State { roster } => {
                self.mirror.reconcile(&roster);
                self.kick_if_present(&roster, &mut outgoing);
            }
            ClientBoundPacket::PlayerUpdated(vehicle) => {
                // we are the only writer of our own car
                if Some(vehicle.id) != self.own_id {
                    self.mirror.apply_update(vehicle);
                }
            }
            ClientBoundPacket::GameUpdate(update) => self.handle_game_update(update, now),
            ClientBoundPacket::Error { message } => {
                if self.own_id.is_none() {
                    bail!("join rejected: {}", message);
                }
                warn!("server says: {}", message);
            }
            ClientBoundPacket::Kicked { message } => bail!("kicked from the room: {}", message),
        }

        Ok(outgoing)
    }

    fn handle_game_update(&mut self, update: GameUpdate, now: Instant) {
        self.view.apply(&update, now);

        match update {
            GameUpdate::StateChange { state } => info!("race is now {}", state),
            GameUpdate::Countdown { value } => debug!("countdown {}", value),
            GameUpdate::ResetPositions { roster } => {
                self.mirror.replace_all(&roster);
                if let Some(lane_index) = self.own_lane() {
                    self.simulation.reset_to_lane(lane_index);
                }
                self.throttle.reset();
            }
            GameUpdate::LapWinner { .. }
            | GameUpdate::FirstLapWinner { .. }
            | GameUpdate::RaceWinner { .. } => {
                if let Some(banner) = self.view.banners().last() {
                    info!("{}", banner);
                }
            }
        }
    }

    fn kick_if_present(&mut self, roster: &[VehicleState], outgoing: &mut Vec<ServerBoundPacket>) {
        if self.kick_sent {
            return;
        }
        let target = match &self.options.kick {
            Some(name) => roster
                .iter()
                .find(|vehicle| &vehicle.name == name && Some(vehicle.id) != self.own_id),
            None => None,
        };
        if let Some(target) = target {
            info!("asking to kick {}", target.name);
            outgoing.push(ServerBoundPacket::KickPlayer {
                target_id: target.id,
            });
            self.kick_sent = true;
        }
    }

    /* Advance our own car by one frame and work out what the authority needs
     * to hear about it. Nothing is simulated until we have been welcomed */
    pub fn frame(
        &mut self,
        inputs: &DriverInputs,
        elapsed: Duration,
        now: Instant,
    ) -> Vec<ServerBoundPacket> {
        let mut outgoing = Vec::new();
        if self.own_id.is_none() {
            return outgoing;
        }

        let step = self.simulation.advance(inputs, self.view.phase(), elapsed);
        for lap in step.completed_laps {
            info!(
                "finished lap {} in {:.2}s",
                lap,
                self.simulation.lap_timer().recent().next().copied().unwrap_or(0.0)
            );
            outgoing.push(ServerBoundPacket::LapCompleted {
                lap: Some(lap as f64),
            });
        }
        for outcome in step.trap_outcomes {
            match outcome {
                TrapOutcome::Hit => info!("ran over a trap"),
                TrapOutcome::NearMiss => debug!("just missed a trap"),
                TrapOutcome::Passed => {}
            }
        }

        self.mirror.smooth(self.simulation.track());
        self.view.expire(now);

        if self.throttle.ready(now) {
            outgoing.push(ServerBoundPacket::UpdateState(VehicleUpdate::from_physics(
                self.simulation.vehicle(),
            )));
        }

        outgoing
    }

    // one line for the log in place of a rendered frame
    pub fn summary(&self) -> String {
        let vehicle = self.simulation.vehicle();
        let mut line = format!(
            "{} | lap {} at {:.0} speed {:.2} nitro {:.0}",
            self.view.phase(),
            vehicle.lap,
            vehicle.distance,
            vehicle.effective_speed(),
            vehicle.nitro.charge
        );
        if self.view.phase() == RacePhase::Countdown {
            line.push_str(&format!(" | countdown {}", self.view.countdown_value()));
        }
        line.push_str(&format!(" | {} others", self.mirror.others(self.own_id).count()));
        if let Some(best) = self.simulation.lap_timer().best() {
            line.push_str(&format!(" | best lap {:.2}s", best));
        }
        for banner in self.view.banners() {
            line.push_str(&format!(" | {}", banner));
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(options: SessionOptions, track: Track) -> RaceSession {
        RaceSession::new(options, track, Duration::from_millis(50))
    }

    fn welcome(id: PlayerID, roster: Vec<VehicleState>, phase: RacePhase) -> ClientBoundPacket {
        ClientBoundPacket::Welcome {
            id,
            roster,
            phase,
            countdown_value: 10,
        }
    }

    fn throttle_on() -> DriverInputs {
        DriverInputs {
            accelerate: true,
            ..DriverInputs::idle()
        }
    }

    #[test]
    fn test_nothing_happens_before_welcome() {
        let mut session = session(SessionOptions::default(), Track::standard());
        let out = session.frame(&throttle_on(), Duration::from_millis(16), Instant::now());
        assert!(out.is_empty());
        assert_eq!(session.simulation().vehicle().distance, 0.0);
    }

    #[test]
    fn test_welcome_puts_us_on_grid() {
        let now = Instant::now();
        let id = PlayerID::new_v4();
        let me = VehicleState::new(id, "me".to_string(), false, 2, 0);
        let options = SessionOptions {
            start_race: true,
            mobile: true,
            kick: None,
        };
        let mut session = session(options, Track::standard());

        let out = session
            .handle_packet(welcome(id, vec![me], RacePhase::Waiting), now)
            .unwrap();

        assert_eq!(out, vec![ServerBoundPacket::MarkMobile, ServerBoundPacket::StartGame]);
        assert_eq!(session.own_id(), Some(id));
        assert_eq!(session.own_lane(), Some(2));
        assert_eq!(session.simulation().vehicle().lateral_offset, 0.2);
    }

    #[test]
    fn test_summary_shows_countdown_only_while_counting() {
        let now = Instant::now();
        let id = PlayerID::new_v4();
        let me = VehicleState::new(id, "me".to_string(), false, 0, 0);
        let mut session = session(SessionOptions::default(), Track::standard());

        session
            .handle_packet(welcome(id, vec![me], RacePhase::Waiting), now)
            .unwrap();
        let summary = session.summary();
        assert!(summary.starts_with("WAITING"));
        assert!(!summary.contains("countdown"));

        let counting = ClientBoundPacket::GameUpdate(GameUpdate::StateChange {
            state: RacePhase::Countdown,
        });
        session.handle_packet(counting, now).unwrap();
        assert!(session.summary().contains("countdown 10"));
    }

    #[test]
    fn test_frames_send_throttled_updates_and_laps() {
        let start = Instant::now();
        let id = PlayerID::new_v4();
        let me = VehicleState::new(id, "me".to_string(), false, 0, 0);
        let mut session = session(SessionOptions::default(), Track::new(&[(0.0, 50.0)]));
        session
            .handle_packet(welcome(id, vec![me], RacePhase::Racing), start)
            .unwrap();

        let mut updates = 0;
        let mut laps = Vec::new();
        for frame in 0..300u32 {
            let now = start + Duration::from_millis(16) * frame;
            for packet in session.frame(&throttle_on(), Duration::from_millis(16), now) {
                match packet {
                    ServerBoundPacket::UpdateState(update) => {
                        assert!(update.distance.is_some());
                        updates += 1;
                    }
                    ServerBoundPacket::LapCompleted { lap } => laps.push(lap.unwrap()),
                    other => panic!("unexpected {:?}", other),
                }
            }
        }

        // 4.8 seconds at one update per 64ms frame slot
        assert_eq!(updates, 75);
        assert!(laps.len() >= 2);
        assert_eq!(laps[0], 1.0);
        assert_eq!(laps[1], 2.0);
    }

    #[test]
    fn test_reset_positions_moves_us_back() {
        let now = Instant::now();
        let id = PlayerID::new_v4();
        let me = VehicleState::new(id, "me".to_string(), false, 0, 0);
        let mut session = session(SessionOptions::default(), Track::standard());
        session
            .handle_packet(welcome(id, vec![me.clone()], RacePhase::Racing), now)
            .unwrap();
        for _ in 0..100 {
            session.frame(&throttle_on(), Duration::from_millis(50), now);
        }
        assert!(session.simulation().vehicle().distance > 0.0);

        let mut moved = me;
        moved.reset_to_lane(3);
        let update = GameUpdate::ResetPositions {
            roster: vec![moved],
        };
        session
            .handle_packet(ClientBoundPacket::GameUpdate(update), now)
            .unwrap();

        assert_eq!(session.own_lane(), Some(3));
        assert_eq!(session.simulation().vehicle().distance, 0.0);
        assert_eq!(session.simulation().vehicle().lateral_offset, 0.6);
    }

    #[test]
    fn test_own_echo_is_ignored() {
        let now = Instant::now();
        let id = PlayerID::new_v4();
        let other_id = PlayerID::new_v4();
        let me = VehicleState::new(id, "me".to_string(), false, 0, 0);
        let other = VehicleState::new(other_id, "you".to_string(), false, 1, 0);
        let mut session = session(SessionOptions::default(), Track::standard());
        session
            .handle_packet(welcome(id, vec![me.clone(), other.clone()], RacePhase::Racing), now)
            .unwrap();

        let mut echo = me;
        echo.distance = 999.0;
        session
            .handle_packet(ClientBoundPacket::PlayerUpdated(echo), now)
            .unwrap();
        assert_eq!(session.mirror().get(&id).unwrap().state.distance, 0.0);

        let mut theirs = other;
        theirs.distance = 40.0;
        session
            .handle_packet(ClientBoundPacket::PlayerUpdated(theirs), now)
            .unwrap();
        assert_eq!(session.mirror().get(&other_id).unwrap().state.distance, 40.0);
    }

    #[test]
    fn test_rejection_and_kick_end_the_session() {
        let now = Instant::now();
        let mut session = session(SessionOptions::default(), Track::standard());
        let rejected = session.handle_packet(
            ClientBoundPacket::Error {
                message: "That nickname is not allowed".to_string(),
            },
            now,
        );
        assert!(rejected.is_err());

        let id = PlayerID::new_v4();
        let me = VehicleState::new(id, "me".to_string(), false, 0, 0);
        session
            .handle_packet(welcome(id, vec![me], RacePhase::Waiting), now)
            .unwrap();
        let late_error = session.handle_packet(
            ClientBoundPacket::Error {
                message: "You have already joined".to_string(),
            },
            now,
        );
        assert!(late_error.is_ok());

        let kicked = session.handle_packet(
            ClientBoundPacket::Kicked {
                message: "bye".to_string(),
            },
            now,
        );
        assert!(kicked.is_err());
    }

    #[test]
    fn test_kick_target_is_asked_for_once() {
        let now = Instant::now();
        let id = PlayerID::new_v4();
        let me = VehicleState::new(id, "boss".to_string(), false, 0, 0);
        let options = SessionOptions {
            kick: Some("pest".to_string()),
            ..SessionOptions::default()
        };
        let mut session = session(options, Track::standard());

        let out = session
            .handle_packet(welcome(id, vec![me.clone()], RacePhase::Waiting), now)
            .unwrap();
        assert!(out.is_empty());

        let pest = VehicleState::new(PlayerID::new_v4(), "pest".to_string(), false, 1, 0);
        let roster = vec![me, pest.clone()];
        let out = session
            .handle_packet(ClientBoundPacket::State { roster: roster.clone() }, now)
            .unwrap();
        assert_eq!(out, vec![ServerBoundPacket::KickPlayer { target_id: pest.id }]);

        let out = session
            .handle_packet(ClientBoundPacket::State { roster }, now)
            .unwrap();
        assert!(out.is_empty());
    }
}
