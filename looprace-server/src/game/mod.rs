use std::collections::HashMap;
use std::io::ErrorKind;
use std::net::TcpListener;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use log::{info, warn};

use looprace_core::networking::ClientConnection;
use looprace_core::PlayerID;

use self::room::{Outbox, RaceRoom, Recipient};

pub use self::room::RoomSettings;

mod phase;
mod room;
mod roster;
mod verification;
mod winners;


pub struct GameServer {
    listener: TcpListener,
    connections: HashMap<PlayerID, ClientConnection>,
    room: RaceRoom,
    tick: Duration,
}

impl GameServer {
    pub fn new(ip_addr: &str, tick: Duration, settings: RoomSettings) -> anyhow::Result<GameServer> {
        // start the TCP listening service
        let listener = TcpListener::bind(ip_addr)
            .with_context(|| format!("could not bind to {}", ip_addr))?;
        listener
            .set_nonblocking(true)
            .context("failed to set listener as non-blocking")?;
        info!("race server now listening on {}", ip_addr);

        Ok(GameServer {
            listener,
            connections: HashMap::new(),
            room: RaceRoom::new(settings),
            tick,
        })
    }

    // WARNING: this function never returns
    pub fn start_loop(&mut self) -> ! {
        loop {
            let start_time = Instant::now();

            self.acquire_new_connections();

            // poll for input events and add them to the incoming packet queue
            self.connections
                .values_mut()
                .for_each(|con| con.fetch_incoming_packets());

            self.drop_closed_connections();
            self.process_incoming_packets(start_time);

            let outbox = self.room.update(Instant::now());
            self.deliver(outbox);

            // empty outgoing packet queue and send to clients
            self.connections
                .values_mut()
                .for_each(|con| con.sync_outgoing());

            // wait until server tick time has elapsed
            if let Some(remaining) = self.tick.checked_sub(start_time.elapsed()) {
                thread::sleep(remaining);
            }
        }
    }

    fn acquire_new_connections(&mut self) {
        loop {
            match self.listener.accept() {
                Ok((socket, addr)) => match ClientConnection::accept(socket) {
                    Ok(connection) => {
                        let id = PlayerID::new_v4();
                        info!("new connection from {} as {}", addr.ip(), id);
                        self.connections.insert(id, connection);
                    }
                    Err(err) => warn!("rejected connection from {}: {:#}", addr, err),
                },
                Err(ref err) if err.kind() == ErrorKind::WouldBlock => break,
                Err(err) => {
                    warn!("couldn't get connecting client info {:?}", err);
                    break;
                }
            }
        }
    }

    // a lost connection is the same as leaving
    fn drop_closed_connections(&mut self) {
        let closed: Vec<PlayerID> = self
            .connections
            .iter()
            .filter(|(_, con)| con.is_closed())
            .map(|(id, _)| *id)
            .collect();

        for id in closed {
            self.connections.remove(&id);
            info!("connection {} closed", id);
            let outbox = self.room.handle_disconnect(id);
            self.deliver(outbox);
        }
    }

    // handle every packet in received order
    fn process_incoming_packets(&mut self, now: Instant) {
        let mut outboxes = Vec::new();
        for (id, connection) in self.connections.iter_mut() {
            while let Some(packet) = connection.pop_incoming() {
                outboxes.push(self.room.handle_packet(*id, packet, now));
            }
        }

        for outbox in outboxes {
            self.deliver(outbox);
        }
    }

    fn deliver(&mut self, outbox: Outbox) {
        for (recipient, packet) in outbox.messages {
            match recipient {
                Recipient::One(id) => {
                    if let Some(con) = self.connections.get_mut(&id) {
                        con.push_outgoing(packet);
                    }
                }
                Recipient::All => self
                    .connections
                    .values_mut()
                    .for_each(|con| con.push_outgoing(packet.clone())),
                Recipient::AllExcept(sender) => self
                    .connections
                    .iter_mut()
                    .filter(|(id, _)| **id != sender)
                    .for_each(|(_, con)| con.push_outgoing(packet.clone())),
            }
        }

        for id in outbox.disconnects {
            if let Some(mut con) = self.connections.remove(&id) {
                con.close();
            }
        }
    }
}
