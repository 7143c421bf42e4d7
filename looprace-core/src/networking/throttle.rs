use std::time::{Duration, Instant};

/// Rate limit for outgoing vehicle updates. The first call always passes.
pub struct SendThrottle {
    interval: Duration,
    last_sent: Option<Instant>,
}

impl SendThrottle {
    pub fn new(interval: Duration) -> Self {
        SendThrottle {
            interval,
            last_sent: None,
        }
    }

    pub fn ready(&mut self, now: Instant) -> bool {
        match self.last_sent {
            Some(last_sent) if now.saturating_duration_since(last_sent) < self.interval => false,
            _ => {
                self.last_sent = Some(now);
                true
            }
        }
    }

    // next update goes out regardless of timing
    pub fn reset(&mut self) {
        self.last_sent = None;
    }
}
