pub mod mirror;
pub mod networking;
pub mod physics;
pub mod player_inputs;
pub mod race;
mod settings;
pub mod simulation;
pub mod track;
pub mod vehicle;

pub use settings::{LapVerification, Settings, GLOBAL_CONFIG};

pub type PlayerID = uuid::Uuid;
