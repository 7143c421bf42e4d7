use std::time::{Duration, Instant};

use looprace_core::race::RacePhase;

pub const COUNTDOWN_PERIOD: Duration = Duration::from_secs(1);

// Fires once per period, on a fixed schedule from when it was started
struct CountdownTicker {
    next_fire: Instant,
}

impl CountdownTicker {
    fn start(now: Instant) -> Self {
        CountdownTicker {
            next_fire: now + COUNTDOWN_PERIOD,
        }
    }

    fn fire(&mut self, now: Instant) -> bool {
        if now < self.next_fire {
            return false;
        }
        self.next_fire += COUNTDOWN_PERIOD;
        true
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseEvent {
    Countdown(i32),
    Racing,
}

/// WAITING -> COUNTDOWN -> RACING -> COUNTDOWN -> ...
///
/// The only way into COUNTDOWN is `begin_countdown`, and the only way out is
/// the ticker running down. The ticker lives here and nowhere else, so a new
/// countdown always replaces the old one.
pub struct RaceStateMachine {
    phase: RacePhase,
    countdown_value: i32,
    countdown_start: i32,
    ticker: Option<CountdownTicker>,
}

impl RaceStateMachine {
    pub fn new(countdown_start: i32) -> Self {
        RaceStateMachine {
            phase: RacePhase::Waiting,
            countdown_value: countdown_start,
            countdown_start,
            ticker: None,
        }
    }

    pub fn phase(&self) -> RacePhase {
        self.phase
    }

    pub fn countdown_value(&self) -> i32 {
        self.countdown_value
    }

    // false when a countdown is already running
    pub fn begin_countdown(&mut self, now: Instant) -> bool {
        if self.phase == RacePhase::Countdown {
            return false;
        }

        self.phase = RacePhase::Countdown;
        self.countdown_value = self.countdown_start;
        self.ticker = Some(CountdownTicker::start(now));
        true
    }

    /* Fire every tick that is due. A stalled caller catches up on the missed
     * seconds in one go rather than stretching the countdown out */
    pub fn tick(&mut self, now: Instant) -> Vec<PhaseEvent> {
        let mut events = Vec::new();

        while let Some(ticker) = self.ticker.as_mut() {
            if !ticker.fire(now) {
                break;
            }

            self.countdown_value -= 1;
            events.push(PhaseEvent::Countdown(self.countdown_value));

            if self.countdown_value <= 0 {
                self.phase = RacePhase::Racing;
                self.ticker = None;
                events.push(PhaseEvent::Racing);
            }
        }

        events
    }
}
