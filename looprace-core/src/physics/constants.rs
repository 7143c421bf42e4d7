// Speed is a unitless throttle in [0, 1]; these rates are per second
pub const ACCELERATION_RATE: f64 = 0.2;
pub const DECELERATION_RATE: f64 = 1.0;
pub const COUNTDOWN_BRAKE_RATE: f64 = 2.0;

// Distance units covered per second at full throttle without boost
pub const BASE_DISTANCE_RATE: f64 = 70.0;

// Steering authority falls off linearly to half at full speed
pub const STEER_RATE: f64 = 0.7;

// Steering this far away from the road's accumulated bend counts as off track
pub const OFF_TRACK_THRESHOLD: f64 = 0.8;
pub const OFF_TRACK_PENALTY_RATE: f64 = 5.0;

pub const NITRO_MAX_CHARGE: f64 = 100.0;
pub const NITRO_MAX_DURATION_SECS: f64 = 3.0;
pub const NITRO_RECHARGE_SECS: f64 = 15.0;
pub const NITRO_BOOST: f64 = 1.12;
pub const NITRO_EASE_RATE: f64 = 6.0;
pub const NITRO_SNAP_EPSILON: f64 = 0.001;

pub const TRAP_FIRST_POSITION: f64 = 80.0;
pub const TRAP_SPACING: f64 = 800.0;
pub const TRAP_LANE_OFFSETS: [f64; 3] = [-0.35, 0.0, 0.35];
pub const TRAP_NEAR_FIELD: f64 = 5.0;
pub const TRAP_PASSED_THRESHOLD: f64 = 5.0;
pub const TRAP_HIT_RADIUS: f64 = 0.3;
pub const TRAP_SPEED_FACTOR: f64 = 0.5;

// Longest single integration step, however long the frame actually took
pub const MAX_TIME_STEP_SECS: f64 = 0.05;
