mod connection;
mod packets;
mod throttle;

pub use connection::Connection;
pub use packets::*;
pub use throttle::SendThrottle;

pub type ClientConnection = Connection<ServerBoundPacket, ClientBoundPacket>;
pub type ServerConnection = Connection<ClientBoundPacket, ServerBoundPacket>;
