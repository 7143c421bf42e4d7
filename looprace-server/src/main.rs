use std::time::Duration;

use env_logger::Env;

use looprace_core::GLOBAL_CONFIG;

mod game;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    // kick off the game loop
    let ip_addr = format!("0.0.0.0:{}", GLOBAL_CONFIG.port);
    let tick = Duration::from_millis(GLOBAL_CONFIG.server_tick_ms);
    let settings = game::RoomSettings::from_config(&GLOBAL_CONFIG);

    let mut server = game::GameServer::new(&ip_addr, tick, settings)?;
    server.start_loop()
}
