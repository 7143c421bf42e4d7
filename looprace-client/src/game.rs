use log::info;

use looprace_core::networking::{ClientBoundPacket, ServerBoundPacket, ServerConnection};

pub struct GameClient {
    connection: ServerConnection,
}

impl GameClient {
    pub fn new(ip_addr: &str) -> anyhow::Result<GameClient> {
        let connection = ServerConnection::connect(ip_addr)?;
        info!("connected to race server at {}", ip_addr);
        Ok(GameClient { connection })
    }

    pub fn is_closed(&self) -> bool {
        self.connection.is_closed()
    }

    pub fn sync_outgoing(&mut self) {
        self.connection.sync_outgoing();
    }

    pub fn fetch_incoming_packets(&mut self) {
        self.connection.fetch_incoming_packets();
    }

    pub fn current_packets(&mut self) -> Vec<ClientBoundPacket> {
        let mut ret = vec![];
        while let Some(packet) = self.connection.pop_incoming() {
            ret.push(packet);
        }
        ret
    }

    pub fn send(&mut self, packet: ServerBoundPacket) {
        self.connection.push_outgoing(packet);
    }

    pub fn send_join(&mut self, name: &str, mobile: bool, password: Option<&str>) {
        self.send(ServerBoundPacket::Join {
            name: Some(name.to_string()),
            mobile: Some(mobile),
            password: password.map(str::to_string),
        });
        self.sync_outgoing();
    }

    pub fn close(&mut self) {
        self.connection.close();
    }
}
