use std::collections::VecDeque;
use std::io::ErrorKind;
use std::net::TcpStream;
use std::time::Duration;

use anyhow::{anyhow, Context};
use log::{debug, warn};
use tungstenite::{Error, Message, WebSocket};

use super::Packet;

// how long a new peer gets to finish the upgrade before it is turned away
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(2);

/// One WebSocket peer, carrying JSON text frames. `I` is what we read, `O` is
/// what we write. The socket is non-blocking once the handshake is done, so
/// every call here returns straight away.
pub struct Connection<I: Packet, O: Packet> {
    socket: WebSocket<TcpStream>,
    incoming_packets: VecDeque<I>,
    outgoing_packets: VecDeque<O>,
    closed: bool,
}

impl<I: Packet, O: Packet> Connection<I, O> {
    // server side of the handshake
    pub fn accept(tcp_stream: TcpStream) -> anyhow::Result<Self> {
        Self::accept_with_timeout(tcp_stream, HANDSHAKE_TIMEOUT)
    }

    /// Blocks for at most `timeout` per read or write while the peer upgrades.
    /// A peer that goes quiet mid-handshake is an error, not a hang.
    pub fn accept_with_timeout(tcp_stream: TcpStream, timeout: Duration) -> anyhow::Result<Self> {
        tcp_stream
            .set_nonblocking(false)
            .context("could not block for the handshake")?;
        tcp_stream
            .set_read_timeout(Some(timeout))
            .context("could not set handshake read timeout")?;
        tcp_stream
            .set_write_timeout(Some(timeout))
            .context("could not set handshake write timeout")?;

        let socket = tungstenite::accept(tcp_stream)
            .map_err(|err| anyhow!("websocket handshake failed: {}", err))?;

        socket.get_ref().set_read_timeout(None)?;
        socket.get_ref().set_write_timeout(None)?;
        Self::from_socket(socket)
    }

    // client side; address is host:port
    pub fn connect(address: &str) -> anyhow::Result<Self> {
        let tcp_stream = TcpStream::connect(address)
            .with_context(|| format!("could not reach {}", address))?;
        let (socket, _response) = tungstenite::client(format!("ws://{}/", address), tcp_stream)
            .map_err(|err| anyhow!("websocket handshake with {} failed: {}", address, err))?;
        Self::from_socket(socket)
    }

    fn from_socket(socket: WebSocket<TcpStream>) -> anyhow::Result<Self> {
        // disable the Nagle algorithm to allow for real-time transfers
        socket
            .get_ref()
            .set_nodelay(true)
            .context("could not turn off TCP delay")?;
        socket
            .get_ref()
            .set_nonblocking(true)
            .context("failed to set connection as non-blocking")?;

        Ok(Connection {
            socket,
            incoming_packets: VecDeque::new(),
            outgoing_packets: VecDeque::new(),
            closed: false,
        })
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    // read frames until the socket runs dry
    pub fn fetch_incoming_packets(&mut self) {
        while !self.closed {
            match self.socket.read_message() {
                Ok(Message::Text(text)) => match I::parse_packet(&text) {
                    Ok(packet) => self.incoming_packets.push_back(packet),
                    Err(err) => warn!("dropping malformed frame: {}", err),
                },
                Ok(Message::Close(_)) => {
                    debug!("peer sent close");
                }
                // pings are answered by tungstenite on the next write
                Ok(_) => {}
                Err(Error::Io(ref err)) if err.kind() == ErrorKind::WouldBlock => break,
                Err(Error::ConnectionClosed) | Err(Error::AlreadyClosed) => {
                    self.closed = true;
                }
                Err(err) => {
                    warn!("connection lost: {}", err);
                    self.closed = true;
                }
            }
        }
    }

    pub fn pop_incoming(&mut self) -> Option<I> {
        self.incoming_packets.pop_front()
    }

    pub fn push_outgoing(&mut self, packet: O) {
        self.outgoing_packets.push_back(packet);
    }

    // send packets on this connection until exhausted
    pub fn sync_outgoing(&mut self) {
        if self.closed {
            self.outgoing_packets.clear();
            return;
        }

        while let Some(packet) = self.outgoing_packets.pop_front() {
            let text = match packet.to_text() {
                Ok(text) => text,
                Err(err) => {
                    warn!("could not serialize packet: {}", err);
                    continue;
                }
            };

            match self.socket.write_message(Message::Text(text)) {
                Ok(()) => {}
                // queued inside tungstenite, flushed below or on the next sync
                Err(Error::Io(ref err)) if err.kind() == ErrorKind::WouldBlock => {}
                Err(Error::SendQueueFull(_)) => {
                    warn!("send queue full, dropping packet");
                }
                Err(err) => {
                    warn!("failed to write to socket: {}", err);
                    self.closed = true;
                    self.outgoing_packets.clear();
                    return;
                }
            }
        }

        match self.socket.write_pending() {
            Ok(()) => {}
            Err(Error::Io(ref err)) if err.kind() == ErrorKind::WouldBlock => {}
            Err(Error::ConnectionClosed) | Err(Error::AlreadyClosed) => self.closed = true,
            Err(err) => {
                warn!("failed to flush socket: {}", err);
                self.closed = true;
            }
        }
    }

    /// Flush what is queued, then start the close handshake. The peer is
    /// treated as gone from here on.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.sync_outgoing();
        if let Err(err) = self.socket.close(None) {
            debug!("close handshake: {}", err);
        }
        let _ = self.socket.write_pending();
        self.closed = true;
    }
}
