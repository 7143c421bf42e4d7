use serde::{Deserialize, Serialize};

// The loop driven in every race: (curvature, length) pairs, in driving order
const STANDARD_LAYOUT: [(f64, f64); 10] = [
    (0.0, 10.0),
    (0.0, 200.0),
    (0.0, 400.0),
    (-1.0, 100.0),
    (0.0, 200.0),
    (-1.0, 200.0),
    (1.0, 200.0),
    (0.0, 200.0),
    (0.02, 500.0),
    (0.0, 200.0),
];

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct TrackSegment {
    pub curvature: f64,
    pub length: f64,
    pub start_z: f64,
    pub end_z: f64,
}

/// A closed loop of curvature segments. Segments tile `[0, track_distance)`
/// without gaps; the layout never changes once built.
#[derive(Clone, Debug)]
pub struct Track {
    segments: Vec<TrackSegment>,
    track_distance: f64,
}

impl Track {
    pub fn new(layout: &[(f64, f64)]) -> Self {
        let mut track_distance = 0.0;
        let segments = layout
            .iter()
            .map(|&(curvature, length)| {
                let start_z = track_distance;
                track_distance += length;
                TrackSegment {
                    curvature,
                    length,
                    start_z,
                    end_z: track_distance,
                }
            })
            .collect();

        Track {
            segments,
            track_distance,
        }
    }

    pub fn standard() -> Self {
        Track::new(&STANDARD_LAYOUT)
    }

    pub fn segments(&self) -> &[TrackSegment] {
        &self.segments
    }

    pub fn track_distance(&self) -> f64 {
        self.track_distance
    }

    fn is_empty(&self) -> bool {
        self.track_distance <= 0.0
    }

    // wraps any distance into [0, track_distance)
    pub fn wrap(&self, z: f64) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let wrapped = ((z % self.track_distance) + self.track_distance) % self.track_distance;
        // (-tiny % L) + L can round up to exactly L
        if wrapped >= self.track_distance {
            0.0
        } else {
            wrapped
        }
    }

    pub fn curvature_at(&self, z: f64) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let z = self.wrap(z);
        self.segments
            .iter()
            .find(|segment| z >= segment.start_z && z < segment.end_z)
            .map(|segment| segment.curvature)
            .unwrap_or(0.0)
    }

    /// Signed distance to travel from `from` to `to` along the shorter way
    /// around the loop; positive means `to` is ahead.
    pub fn shortest_delta(&self, from: f64, to: f64) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let mut delta = to - from;
        let half = self.track_distance / 2.0;
        if delta > half {
            delta -= self.track_distance;
        }
        if delta < -half {
            delta += self.track_distance;
        }
        delta
    }
}
