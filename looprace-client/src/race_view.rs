use std::fmt;
use std::time::Instant;

use looprace_core::networking::GameUpdate;
use looprace_core::race::{LapNumber, RacePhase};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BannerKind {
    LapWinner(LapNumber),
    FirstLapWinner,
    RaceWinner,
}

// A winner announcement, shown until expires_at
#[derive(Clone, Debug)]
pub struct Banner {
    pub kind: BannerKind,
    pub name: String,
    pub expires_at: Instant,
}

impl fmt::Display for Banner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            BannerKind::LapWinner(lap) => write!(f, "{} finished lap {} first", self.name, lap),
            BannerKind::FirstLapWinner => write!(f, "{} leads after the first lap", self.name),
            BannerKind::RaceWinner => write!(f, "{} WINS THE RACE", self.name),
        }
    }
}

/// What this peer knows about the shared race, as told by the authority.
/// Nothing here is ever sent back.
pub struct RaceView {
    phase: RacePhase,
    countdown_value: i32,
    banners: Vec<Banner>,
}

impl RaceView {
    pub fn new() -> Self {
        RaceView {
            phase: RacePhase::Waiting,
            countdown_value: 0,
            banners: Vec::new(),
        }
    }

    pub fn phase(&self) -> RacePhase {
        self.phase
    }

    pub fn countdown_value(&self) -> i32 {
        self.countdown_value
    }

    pub fn banners(&self) -> &[Banner] {
        &self.banners
    }

    // the state a welcome hands us
    pub fn sync(&mut self, phase: RacePhase, countdown_value: i32) {
        self.phase = phase;
        self.countdown_value = countdown_value;
    }

    pub fn apply(&mut self, update: &GameUpdate, now: Instant) {
        match update {
            GameUpdate::StateChange { state } => {
                self.phase = *state;
                if *state == RacePhase::Countdown {
                    // last race's banners are stale now
                    self.banners.clear();
                }
            }
            GameUpdate::Countdown { value } => self.countdown_value = *value,
            GameUpdate::ResetPositions { .. } => {}
            GameUpdate::LapWinner {
                lap,
                name,
                display_for,
                ..
            } => self.show(BannerKind::LapWinner(*lap), name, now + *display_for),
            GameUpdate::FirstLapWinner {
                name, display_for, ..
            } => self.show(BannerKind::FirstLapWinner, name, now + *display_for),
            GameUpdate::RaceWinner {
                name, display_for, ..
            } => self.show(BannerKind::RaceWinner, name, now + *display_for),
        }
    }

    // one banner per kind; a newer one replaces the old
    fn show(&mut self, kind: BannerKind, name: &str, expires_at: Instant) {
        self.banners.retain(|banner| banner.kind != kind);
        self.banners.push(Banner {
            kind,
            name: name.to_string(),
            expires_at,
        });
    }

    pub fn expire(&mut self, now: Instant) {
        self.banners.retain(|banner| banner.expires_at > now);
    }
}

impl Default for RaceView {
    fn default() -> Self {
        RaceView::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use looprace_core::PlayerID;

    use super::*;

    fn lap_winner(lap: LapNumber, name: &str) -> GameUpdate {
        GameUpdate::LapWinner {
            lap,
            id: PlayerID::new_v4(),
            name: name.to_string(),
            display_for: Duration::from_secs(4),
        }
    }

    #[test]
    fn test_phase_and_countdown_follow_updates() {
        let now = Instant::now();
        let mut view = RaceView::new();
        view.sync(RacePhase::Waiting, 10);

        view.apply(&GameUpdate::StateChange { state: RacePhase::Countdown }, now);
        view.apply(&GameUpdate::Countdown { value: 3 }, now);
        assert_eq!(view.phase(), RacePhase::Countdown);
        assert_eq!(view.countdown_value(), 3);

        view.apply(&GameUpdate::StateChange { state: RacePhase::Racing }, now);
        assert_eq!(view.phase(), RacePhase::Racing);
    }

    #[test]
    fn test_banners_expire_on_their_own_timers() {
        let now = Instant::now();
        let mut view = RaceView::new();
        view.apply(&lap_winner(5, "a"), now);
        view.apply(
            &GameUpdate::RaceWinner {
                id: PlayerID::new_v4(),
                name: "a".to_string(),
                display_for: Duration::from_secs(15),
            },
            now,
        );
        assert_eq!(view.banners().len(), 2);

        view.expire(now + Duration::from_secs(5));
        assert_eq!(view.banners().len(), 1);
        assert_eq!(view.banners()[0].kind, BannerKind::RaceWinner);
        assert_eq!(view.banners()[0].to_string(), "a WINS THE RACE");

        view.expire(now + Duration::from_secs(15));
        assert!(view.banners().is_empty());
    }

    #[test]
    fn test_newer_lap_banner_replaces_older() {
        let now = Instant::now();
        let mut view = RaceView::new();
        view.apply(&lap_winner(2, "a"), now);
        view.apply(&lap_winner(2, "b"), now + Duration::from_secs(1));

        assert_eq!(view.banners().len(), 1);
        assert_eq!(view.banners()[0].name, "b");

        view.apply(&lap_winner(3, "c"), now);
        assert_eq!(view.banners().len(), 2);
    }

    #[test]
    fn test_countdown_clears_banners() {
        let now = Instant::now();
        let mut view = RaceView::new();
        view.apply(&lap_winner(1, "a"), now);

        view.apply(&GameUpdate::StateChange { state: RacePhase::Countdown }, now);
        assert!(view.banners().is_empty());
    }
}
