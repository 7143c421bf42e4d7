use config::{Config, ConfigError, Environment, File};
use lazy_static::lazy_static;
use serde::Deserialize;

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LapVerification {
    // lap claims are accepted as sent
    Trust,
    // lap claims are checked against the relayed distance trajectory
    Trajectory,
}

#[derive(Deserialize)]
pub struct Settings {
    pub port: String,
    pub server_address: String,
    pub server_tick_ms: u64,
    pub client_frame_ms: u64,
    pub state_send_interval_ms: u64,
    pub max_players: usize,
    pub admin_name: String,
    pub admin_password: String,
    pub countdown_start: i32,
    pub max_name_length: usize,
    pub admin_join_starts_race: bool,
    pub lap_verification: LapVerification,
    #[serde(default)]
    pub banned_words: Vec<String>,
}

impl Settings {
    fn new() -> Result<Settings, ConfigError> {
        let config = Config::builder()
            .set_default("port", "24247")?
            .set_default("server_address", "127.0.0.1")?
            .set_default("server_tick_ms", 10)?
            .set_default("client_frame_ms", 16)?
            .set_default("state_send_interval_ms", 50)?
            .set_default("max_players", 60)?
            .set_default("admin_name", "admin")?
            .set_default("admin_password", "changeme")?
            .set_default("countdown_start", 10)?
            .set_default("max_name_length", 12)?
            .set_default("admin_join_starts_race", true)?
            .set_default("lap_verification", "trust")?
            .add_source(File::with_name("config.yaml").required(false))
            .add_source(Environment::with_prefix("LOOPRACE"))
            .build()?;

        config.try_deserialize()
    }

    pub fn server_socket_address(&self) -> String {
        format!("{}:{}", self.server_address, self.port)
    }
}

lazy_static! {
    pub static ref GLOBAL_CONFIG: Settings = Settings::new().expect("failed to read config file");
}
