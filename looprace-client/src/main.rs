use std::time::Duration;

use clap::Parser;
use env_logger::Env;

use looprace_core::track::Track;
use looprace_core::GLOBAL_CONFIG;

use application::Application;
use autopilot::Autopilot;
use game::GameClient;
use session::{RaceSession, SessionOptions};

mod application;
mod autopilot;
mod game;
mod race_view;
mod session;

#[derive(Parser)]
#[command(name = "looprace-client", about = "Headless loop racing peer")]
struct Cli {
    /// Nickname to race under
    #[arg(default_value = "Guest")]
    name: String,
    /// Race server as host:port; defaults to the configured address
    #[arg(long)]
    server: Option<String>,
    /// Password for the admin nickname
    #[arg(long)]
    admin_password: Option<String>,
    /// Ask for a new race once joined (admin only)
    #[arg(long)]
    start: bool,
    /// Remove the named player once they show up (admin only)
    #[arg(long)]
    kick: Option<String>,
    /// Join as a mobile player
    #[arg(long)]
    mobile: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let ip_addr = cli
        .server
        .unwrap_or_else(|| GLOBAL_CONFIG.server_socket_address());

    let mut game_client = GameClient::new(&ip_addr)?;
    game_client.send_join(&cli.name, cli.mobile, cli.admin_password.as_deref());

    let options = SessionOptions {
        start_race: cli.start,
        mobile: cli.mobile,
        kick: cli.kick,
    };
    let session = RaceSession::new(
        options,
        Track::standard(),
        Duration::from_millis(GLOBAL_CONFIG.state_send_interval_ms),
    );

    let mut application = Application::new(
        game_client,
        session,
        Box::new(Autopilot::new(0.0)),
        Duration::from_millis(GLOBAL_CONFIG.client_frame_ms),
    );
    application.run()
}
