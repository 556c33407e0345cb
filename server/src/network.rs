//! Server network layer handling TCP connections and session coordination

use crate::session::{GameMessage, GameSession};
use log::{debug, error, info, warn};
use shared::{read_packet, write_packet, Packet, ProtocolError};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Messages sent from network tasks to a session loop
#[derive(Debug)]
pub enum ServerMessage {
    NewConnection {
        stream: TcpStream,
        addr: SocketAddr,
    },
    PacketReceived {
        slot: usize,
        packet: Packet,
    },
    ClientDisconnected {
        slot: usize,
    },
    MalformedPacket {
        slot: usize,
        error: ProtocolError,
    },
}

/// A connection that a session could not seat, returned to the accept loop
#[derive(Debug)]
pub struct UnseatedConnection {
    pub session_id: u64,
    pub stream: TcpStream,
    pub addr: SocketAddr,
}

/// Newest session, which receives every new connection until it reports
/// that it cannot seat one
struct Lobby {
    id: u64,
    sender: mpsc::UnboundedSender<ServerMessage>,
}

/// Accepts players and seats them two per session, each session in its own task
pub struct Server {
    listener: TcpListener,
    next_session_id: u64,
    unseated_tx: mpsc::UnboundedSender<UnseatedConnection>,
    unseated_rx: mpsc::UnboundedReceiver<UnseatedConnection>,
}

impl Server {
    pub async fn new(addr: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let listener = TcpListener::bind(addr).await?;
        info!("Server listening on {}", listener.local_addr()?);

        let (unseated_tx, unseated_rx) = mpsc::unbounded_channel();
        Ok(Server {
            listener,
            next_session_id: 1,
            unseated_tx,
            unseated_rx,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept loop. Only the session knows which of its seats are free, so
    /// every connection goes to the newest session; one it cannot seat comes
    /// back here and opens the next session.
    pub async fn run(&mut self) {
        let mut lobby: Option<Lobby> = None;

        loop {
            let (stream, addr) = tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        info!("Connection from {}", addr);
                        (stream, addr)
                    }
                    Err(e) => {
                        error!("Failed to accept connection: {}", e);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        continue;
                    }
                },
                Some(unseated) = self.unseated_rx.recv() => {
                    debug!(
                        "Session {} could not seat {}",
                        unseated.session_id, unseated.addr
                    );
                    if lobby.as_ref().is_some_and(|open| open.id == unseated.session_id) {
                        lobby = None;
                    }
                    (unseated.stream, unseated.addr)
                }
            };

            self.seat(&mut lobby, stream, addr);
        }
    }

    fn seat(&mut self, lobby: &mut Option<Lobby>, stream: TcpStream, addr: SocketAddr) {
        let mut message = ServerMessage::NewConnection { stream, addr };
        loop {
            let current = match lobby.take() {
                Some(open) if !open.sender.is_closed() => open,
                _ => self.spawn_session(),
            };

            match current.sender.send(message) {
                Ok(()) => {
                    *lobby = Some(current);
                    return;
                }
                // The session ended between the check and the send.
                Err(mpsc::error::SendError(returned)) => message = returned,
            }
        }
    }

    fn spawn_session(&mut self) -> Lobby {
        let id = self.next_session_id;
        self.next_session_id += 1;

        let (sender, receiver) = mpsc::unbounded_channel();
        let runner = SessionRunner::new(id, sender.clone(), receiver, self.unseated_tx.clone());
        tokio::spawn(runner.run());
        info!("Session {} opened", id);

        Lobby { id, sender }
    }
}

struct Connection {
    outgoing: mpsc::UnboundedSender<Packet>,
    receiver_task: JoinHandle<()>,
}

/// Owns one [`GameSession`] and serializes every event touching it
struct SessionRunner {
    id: u64,
    session: GameSession,
    connections: HashMap<usize, Connection>,
    events_tx: mpsc::UnboundedSender<ServerMessage>,
    events_rx: mpsc::UnboundedReceiver<ServerMessage>,
    unseated: mpsc::UnboundedSender<UnseatedConnection>,
}

impl SessionRunner {
    fn new(
        id: u64,
        events_tx: mpsc::UnboundedSender<ServerMessage>,
        events_rx: mpsc::UnboundedReceiver<ServerMessage>,
        unseated: mpsc::UnboundedSender<UnseatedConnection>,
    ) -> Self {
        Self {
            id,
            session: GameSession::new(),
            connections: HashMap::new(),
            events_tx,
            events_rx,
            unseated,
        }
    }

    async fn run(mut self) {
        while let Some(message) = self.events_rx.recv().await {
            match message {
                ServerMessage::NewConnection { stream, addr } => {
                    self.accept_player(stream, addr);
                }
                ServerMessage::PacketReceived { slot, packet } => {
                    self.session.handle_packet(slot, packet);
                }
                ServerMessage::ClientDisconnected { slot } => {
                    info!("Session {}: player {} disconnected", self.id, slot + 1);
                    self.session.player_left(slot);
                }
                ServerMessage::MalformedPacket { slot, error } => {
                    error!(
                        "Session {}: dropping player {} after bad input: {}",
                        self.id,
                        slot + 1,
                        error
                    );
                    self.session.player_left(slot);
                }
            }

            self.dispatch();

            if self.session.is_terminated() {
                break;
            }
        }

        for (_, connection) in self.connections.drain() {
            connection.receiver_task.abort();
        }

        // Connections routed here before the session ended still need a seat.
        self.events_rx.close();
        while let Some(message) = self.events_rx.recv().await {
            if let ServerMessage::NewConnection { stream, addr } = message {
                self.hand_back(stream, addr);
            }
        }
        info!("Session {} closed", self.id);
    }

    fn accept_player(&mut self, stream: TcpStream, addr: SocketAddr) {
        let Some(slot) = self.session.join(addr) else {
            self.hand_back(stream, addr);
            return;
        };

        let (read_half, write_half) = stream.into_split();
        let (outgoing, outgoing_rx) = mpsc::unbounded_channel();

        tokio::spawn(spawn_network_sender(slot, write_half, outgoing_rx));
        let receiver_task = tokio::spawn(spawn_network_receiver(
            slot,
            read_half,
            self.events_tx.clone(),
        ));

        self.connections.insert(
            slot,
            Connection {
                outgoing,
                receiver_task,
            },
        );
    }

    fn hand_back(&self, stream: TcpStream, addr: SocketAddr) {
        let unseated = UnseatedConnection {
            session_id: self.id,
            stream,
            addr,
        };
        if self.unseated.send(unseated).is_err() {
            warn!("Session {}: server stopped, dropping {}", self.id, addr);
        }
    }

    /// Delivers everything the session queued, in order
    fn dispatch(&mut self) {
        for message in self.session.drain() {
            match message {
                GameMessage::SendPacket { slot, packet } => match self.connections.get(&slot) {
                    Some(connection) => {
                        if let Err(e) = connection.outgoing.send(packet) {
                            error!("Failed to queue packet for player {}: {}", slot + 1, e);
                        }
                    }
                    None => warn!("No connection for player {}", slot + 1),
                },
                GameMessage::Close { slot } => {
                    // Dropping the sender lets the writer flush and shut down.
                    if let Some(connection) = self.connections.remove(&slot) {
                        connection.receiver_task.abort();
                    }
                }
            }
        }
    }
}

/// Reads frames from one player until the stream ends or breaks
async fn spawn_network_receiver(
    slot: usize,
    mut reader: OwnedReadHalf,
    events: mpsc::UnboundedSender<ServerMessage>,
) {
    loop {
        let message = match read_packet(&mut reader).await {
            Ok(Some(packet)) => ServerMessage::PacketReceived { slot, packet },
            Ok(None) => ServerMessage::ClientDisconnected { slot },
            Err(ProtocolError::Io(e)) => {
                warn!("Connection error from player {}: {}", slot + 1, e);
                ServerMessage::ClientDisconnected { slot }
            }
            Err(error) => ServerMessage::MalformedPacket { slot, error },
        };

        let finished = !matches!(message, ServerMessage::PacketReceived { .. });
        if events.send(message).is_err() || finished {
            break;
        }
    }
}

/// Writes queued packets to one player, then closes the write side
async fn spawn_network_sender(
    slot: usize,
    mut writer: OwnedWriteHalf,
    mut outgoing: mpsc::UnboundedReceiver<Packet>,
) {
    while let Some(packet) = outgoing.recv().await {
        debug!("Sending {} to player {}", packet.kind(), slot + 1);
        if let Err(e) = write_packet(&mut writer, &packet).await {
            error!("Failed to send {} to player {}: {}", packet.kind(), slot + 1, e);
            break;
        }
    }

    if let Err(e) = writer.shutdown().await {
        debug!("Shutdown of player {} connection failed: {}", slot + 1, e);
    }
}
