use super::constants::*;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NitroState {
    pub charge: f64,
    pub active: bool,
    pub boost_factor: f64,
}

impl Default for NitroState {
    fn default() -> Self {
        NitroState {
            charge: NITRO_MAX_CHARGE,
            active: false,
            boost_factor: 1.0,
        }
    }
}

impl NitroState {
    /* Given whether the driver is asking for nitro and holding the throttle,
     * compute next tick's meter: drain while boosting, recharge otherwise, and
     * ease the boost factor toward its target instead of switching it */
    pub fn tick(&self, requested: bool, accelerating: bool, time_step: f64) -> NitroState {
        let active = requested && accelerating && self.charge > 0.0;

        let charge = if active {
            f64::max(
                0.0,
                self.charge - (NITRO_MAX_CHARGE / NITRO_MAX_DURATION_SECS) * time_step,
            )
        } else if self.charge < NITRO_MAX_CHARGE {
            f64::min(
                NITRO_MAX_CHARGE,
                self.charge + (NITRO_MAX_CHARGE / NITRO_RECHARGE_SECS) * time_step,
            )
        } else {
            self.charge
        };

        let target = if active { NITRO_BOOST } else { 1.0 };
        let mut boost_factor = self.boost_factor
            + (target - self.boost_factor) * f64::min(1.0, time_step * NITRO_EASE_RATE);
        if (boost_factor - target).abs() < NITRO_SNAP_EPSILON {
            boost_factor = target;
        }

        NitroState {
            charge,
            active,
            boost_factor,
        }
    }
}
