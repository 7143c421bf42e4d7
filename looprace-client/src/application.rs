use std::thread;
use std::time::{Duration, Instant};

use anyhow::bail;
use log::info;

use crate::autopilot::InputSource;
use crate::game::GameClient;
use crate::session::RaceSession;

// how often the race is written to the log
const REPORT_INTERVAL: Duration = Duration::from_secs(1);

pub struct Application {
    pub game: GameClient,
    pub session: RaceSession,
    pub input: Box<dyn InputSource>,
    frame_length: Duration,
}

impl Application {
    pub fn new(
        game: GameClient,
        session: RaceSession,
        input: Box<dyn InputSource>,
        frame_length: Duration,
    ) -> Self {
        Self {
            game,
            session,
            input,
            frame_length,
        }
    }

    // runs until the server goes away or turns us out
    pub fn run(&mut self) -> anyhow::Result<()> {
        let mut last_frame = Instant::now();
        let mut last_report = last_frame;

        loop {
            let now = Instant::now();
            let elapsed = now.duration_since(last_frame);
            last_frame = now;

            if let Err(err) = self.update(now, elapsed) {
                self.game.close();
                return Err(err);
            }

            if now.duration_since(last_report) >= REPORT_INTERVAL {
                info!("{}", self.session.summary());
                last_report = now;
            }

            if self.game.is_closed() {
                bail!("lost connection to the race server");
            }

            if let Some(remaining) = self.frame_length.checked_sub(now.elapsed()) {
                thread::sleep(remaining);
            }
        }
    }

    pub fn update(&mut self, now: Instant, elapsed: Duration) -> anyhow::Result<()> {
        self.game.fetch_incoming_packets();
        for packet in self.game.current_packets() {
            for reply in self.session.handle_packet(packet, now)? {
                self.game.send(reply);
            }
        }

        if let Some(lane_index) = self.session.own_lane() {
            self.input.follow_lane(lane_index);
        }
        let inputs = self
            .input
            .poll(self.session.simulation().vehicle(), self.session.view().phase());
        for packet in self.session.frame(&inputs, elapsed, now) {
            self.game.send(packet);
        }

        self.game.sync_outgoing();
        Ok(())
    }
}
