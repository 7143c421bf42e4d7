use std::collections::HashMap;

use looprace_core::race::LapNumber;
use looprace_core::{LapVerification, PlayerID};

/// Decides whether a peer's claim to have finished a lap is believed. The
/// room feeds it every relayed distance so implementations can build up their
/// own picture of each car's progress.
pub trait LapClaimVerifier {
    fn observe_distance(&mut self, _id: PlayerID, _reported: f64) {}

    fn forget(&mut self, _id: &PlayerID) {}

    // a new race is starting
    fn reset(&mut self) {}

    fn accept(&self, id: &PlayerID, lap: LapNumber) -> bool;
}

// Believes every claim
pub struct TrustingVerifier;

impl LapClaimVerifier for TrustingVerifier {
    fn accept(&self, _id: &PlayerID, _lap: LapNumber) -> bool {
        true
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Trajectory {
    // last believable position, starting from the grid
    distance: f64,
    wraps: LapNumber,
}

/// Follows each car's reported distance from the grid and counts how often it
/// has crossed the start line, refusing claims that run ahead of that.
/// Updates are throttled, so a claim may be one lap ahead of what has been
/// seen.
///
/// Only forward steps of less than half a loop move a car along. Anything
/// else (a stale update from before the grid reset, a jump) is ignored and the
/// car stays where it was last believed to be.
pub struct TrajectoryVerifier {
    track_distance: f64,
    trajectories: HashMap<PlayerID, Trajectory>,
}

impl TrajectoryVerifier {
    pub fn new(track_distance: f64) -> Self {
        TrajectoryVerifier {
            track_distance,
            trajectories: HashMap::new(),
        }
    }

    pub fn observed_wraps(&self, id: &PlayerID) -> LapNumber {
        self.trajectories
            .get(id)
            .map(|trajectory| trajectory.wraps)
            .unwrap_or(0)
    }
}

impl LapClaimVerifier for TrajectoryVerifier {
    fn observe_distance(&mut self, id: PlayerID, reported: f64) {
        if self.track_distance <= 0.0 || !reported.is_finite() {
            return;
        }

        let reported = reported.rem_euclid(self.track_distance);
        let trajectory = self.trajectories.entry(id).or_default();
        let step = (reported - trajectory.distance).rem_euclid(self.track_distance);
        if step >= self.track_distance / 2.0 {
            return;
        }

        // moving forward yet ending up lower means the line was crossed
        if reported < trajectory.distance {
            trajectory.wraps += 1;
        }
        trajectory.distance = reported;
    }

    fn forget(&mut self, id: &PlayerID) {
        self.trajectories.remove(id);
    }

    // everyone is back on the grid
    fn reset(&mut self) {
        self.trajectories.clear();
    }

    fn accept(&self, id: &PlayerID, lap: LapNumber) -> bool {
        lap <= self.observed_wraps(id) + 1
    }
}

pub fn verifier_for(mode: LapVerification, track_distance: f64) -> Box<dyn LapClaimVerifier> {
    match mode {
        LapVerification::Trust => Box::new(TrustingVerifier),
        LapVerification::Trajectory => Box::new(TrajectoryVerifier::new(track_distance)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trusting_verifier_accepts_anything() {
        assert!(TrustingVerifier.accept(&PlayerID::new_v4(), 5));
    }

    #[test]
    fn test_claims_cannot_run_ahead_of_trajectory() {
        let mut verifier = TrajectoryVerifier::new(2210.0);
        let id = PlayerID::new_v4();

        assert!(verifier.accept(&id, 1));
        assert!(!verifier.accept(&id, 5));

        // driving forward, then across the line
        for distance in [100.0, 900.0, 1600.0, 2150.0, 30.0] {
            verifier.observe_distance(id, distance);
        }

        assert_eq!(verifier.observed_wraps(&id), 1);
        assert!(verifier.accept(&id, 2));
        assert!(!verifier.accept(&id, 3));
    }

    #[test]
    fn test_small_steps_back_are_not_wraps() {
        let mut verifier = TrajectoryVerifier::new(2210.0);
        let id = PlayerID::new_v4();
        verifier.observe_distance(id, 500.0);
        verifier.observe_distance(id, 480.0);
        verifier.observe_distance(id, 510.0);
        assert_eq!(verifier.observed_wraps(&id), 0);
    }

    #[test]
    fn test_reset_forgets_progress() {
        let mut verifier = TrajectoryVerifier::new(300.0);
        let id = PlayerID::new_v4();
        for _ in 0..2 {
            for distance in [100.0, 200.0, 290.0, 5.0] {
                verifier.observe_distance(id, distance);
            }
        }
        assert!(verifier.accept(&id, 3));

        verifier.reset();
        assert!(!verifier.accept(&id, 3));
    }

    #[test]
    fn test_stale_update_after_reset_is_not_a_lap() {
        let mut verifier = TrajectoryVerifier::new(2210.0);
        let id = PlayerID::new_v4();
        for distance in [700.0, 1400.0, 2000.0] {
            verifier.observe_distance(id, distance);
        }

        verifier.reset();
        // sent before the grid reset, arrives after it
        verifier.observe_distance(id, 2000.0);
        verifier.observe_distance(id, 3.0);
        verifier.observe_distance(id, 40.0);

        assert_eq!(verifier.observed_wraps(&id), 0);
        assert!(!verifier.accept(&id, 2));
    }

    #[test]
    fn test_jump_across_the_loop_is_ignored() {
        let mut verifier = TrajectoryVerifier::new(2210.0);
        let id = PlayerID::new_v4();
        verifier.observe_distance(id, 1500.0);
        verifier.observe_distance(id, 10.0);
        assert_eq!(verifier.observed_wraps(&id), 0);
    }
}
