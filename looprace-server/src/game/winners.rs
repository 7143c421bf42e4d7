use looprace_core::race::{is_tracked_lap, LapNumber, LapWinner, RACE_LAPS};

#[derive(Clone, Debug, PartialEq)]
pub enum WinnerEvent {
    Lap { lap: LapNumber, winner: LapWinner },
    FirstLap(LapWinner),
    Race(LapWinner),
}

// First finisher of every tracked lap, plus the two that get their own banner
#[derive(Default)]
pub struct LapWinnerTracker {
    lap_winners: [Option<LapWinner>; RACE_LAPS as usize],
    first_lap_winner: Option<LapWinner>,
    race_winner: Option<LapWinner>,
}

impl LapWinnerTracker {
    pub fn new() -> Self {
        LapWinnerTracker::default()
    }

    pub fn reset(&mut self) {
        *self = LapWinnerTracker::default();
    }

    pub fn lap_winner(&self, lap: LapNumber) -> Option<&LapWinner> {
        if !is_tracked_lap(lap) {
            return None;
        }
        self.lap_winners[(lap - 1) as usize].as_ref()
    }

    pub fn first_lap_winner(&self) -> Option<&LapWinner> {
        self.first_lap_winner.as_ref()
    }

    pub fn race_winner(&self) -> Option<&LapWinner> {
        self.race_winner.as_ref()
    }

    /// Record that `winner` finished `lap`. Returns what became newly true;
    /// a lap somebody already won produces nothing.
    pub fn record(&mut self, lap: LapNumber, winner: &LapWinner) -> Vec<WinnerEvent> {
        let mut events = Vec::new();
        if !is_tracked_lap(lap) {
            return events;
        }

        let slot = &mut self.lap_winners[(lap - 1) as usize];
        if slot.is_none() {
            *slot = Some(winner.clone());
            events.push(WinnerEvent::Lap {
                lap,
                winner: winner.clone(),
            });
        }

        if lap == 1 && self.first_lap_winner.is_none() {
            self.first_lap_winner = Some(winner.clone());
            events.push(WinnerEvent::FirstLap(winner.clone()));
        }

        if lap == RACE_LAPS && self.race_winner.is_none() {
            self.race_winner = Some(winner.clone());
            events.push(WinnerEvent::Race(winner.clone()));
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use looprace_core::PlayerID;

    fn driver(name: &str) -> LapWinner {
        LapWinner {
            id: PlayerID::new_v4(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_first_lap_produces_both_banners() {
        let mut tracker = LapWinnerTracker::new();
        let a = driver("a");

        let events = tracker.record(1, &a);
        assert_eq!(
            events,
            vec![
                WinnerEvent::Lap {
                    lap: 1,
                    winner: a.clone()
                },
                WinnerEvent::FirstLap(a.clone())
            ]
        );
        assert_eq!(tracker.first_lap_winner(), Some(&a));
    }

    #[test]
    fn test_repeat_claims_are_silent() {
        let mut tracker = LapWinnerTracker::new();
        let a = driver("a");
        let b = driver("b");

        assert!(!tracker.record(3, &a).is_empty());
        assert!(tracker.record(3, &a).is_empty());
        assert!(tracker.record(3, &b).is_empty());
        assert_eq!(tracker.lap_winner(3), Some(&a));
    }

    #[test]
    fn test_final_lap_crowns_race_winner() {
        let mut tracker = LapWinnerTracker::new();
        let a = driver("a");
        let b = driver("b");

        let events = tracker.record(RACE_LAPS, &b);
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], WinnerEvent::Race(b.clone()));

        // the race keeps going; later finishers change nothing
        assert!(tracker.record(RACE_LAPS, &a).is_empty());
        assert_eq!(tracker.race_winner(), Some(&b));
    }

    #[test]
    fn test_untracked_laps_are_ignored() {
        let mut tracker = LapWinnerTracker::new();
        assert!(tracker.record(0, &driver("a")).is_empty());
        assert!(tracker.record(RACE_LAPS + 1, &driver("a")).is_empty());
        assert!(tracker.lap_winner(0).is_none());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut tracker = LapWinnerTracker::new();
        let a = driver("a");
        tracker.record(1, &a);
        tracker.record(RACE_LAPS, &a);

        tracker.reset();
        assert!(tracker.first_lap_winner().is_none());
        assert!(tracker.race_winner().is_none());
        assert_eq!(tracker.record(1, &a).len(), 2);
    }
}
