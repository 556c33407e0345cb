//! Authoritative state for one two-player game
//!
//! `GameSession` owns the board, the two player seats and the explicit turn
//! phase. It performs no I/O: every operation queues [`GameMessage`]s that
//! the network layer drains with [`GameSession::drain`] and delivers in
//! order. All mutations of one logical turn happen inside a single call, so
//! the owning task applies them atomically with respect to the other player.

use crate::client_manager::ClientManager;
use log::{debug, info, warn};
use shared::{player_name, Board, MoveError, Packet, Placement, Tile};
use std::net::SocketAddr;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// First player seated, second not yet arrived
    WaitingForPlayers,
    /// A game is running and the given slot must move next
    AwaitingMove(usize),
    /// The last game ended (win, draw or quit); replay negotiation is open
    Finished,
    /// Every player is gone; the session will not accept further input
    Terminated,
}

/// Outbound instructions for the network layer
#[derive(Debug, Clone, PartialEq)]
pub enum GameMessage {
    SendPacket { slot: usize, packet: Packet },
    /// Flush anything queued for the slot, then close its connection
    Close { slot: usize },
}

pub struct GameSession {
    board: Board,
    players: ClientManager,
    phase: Phase,
    /// Slot that asked for a rematch first and is waiting on the other
    replay_requester: Option<usize>,
    outbox: Vec<GameMessage>,
}

impl GameSession {
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            players: ClientManager::new(),
            phase: Phase::WaitingForPlayers,
            replay_requester: None,
            outbox: Vec::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn players(&self) -> &ClientManager {
        &self.players
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// No game is currently being played
    pub fn game_over(&self) -> bool {
        !matches!(self.phase, Phase::AwaitingMove(_))
    }

    pub fn replay_pending(&self) -> bool {
        self.replay_requester.is_some()
    }

    pub fn is_terminated(&self) -> bool {
        self.phase == Phase::Terminated
    }

    /// Both seats have been handed out; later connections belong elsewhere
    pub fn is_full(&self) -> bool {
        self.players.is_full()
    }

    /// Takes every message queued since the last drain
    pub fn drain(&mut self) -> Vec<GameMessage> {
        std::mem::take(&mut self.outbox)
    }

    /// Seats a newly connected player.
    ///
    /// The first player is told to wait. When the second arrives both get
    /// their opening handshake and the first player moves first.
    pub fn join(&mut self, addr: SocketAddr) -> Option<usize> {
        if self.is_terminated() {
            return None;
        }
        let slot = self.players.add_client(addr)?;

        if slot == 0 {
            self.send(
                0,
                Packet::Handshake {
                    wait: true,
                    your_move: false,
                },
            );
            return Some(slot);
        }

        // A first player who left before this join reopened the session,
        // so the first seat is occupied here.
        let first = ClientManager::opponent(slot);
        self.send(
            slot,
            Packet::Handshake {
                wait: false,
                your_move: false,
            },
        );
        self.send(
            first,
            Packet::Handshake {
                wait: false,
                your_move: true,
            },
        );
        self.phase = Phase::AwaitingMove(first);
        info!("Both players joined, game started");
        Some(slot)
    }

    /// Applies one packet received from `slot`.
    pub fn handle_packet(&mut self, slot: usize, packet: Packet) {
        if !self.players.is_connected(slot) {
            warn!(
                "Ignoring {} from player {} who is no longer seated",
                packet.kind(),
                slot + 1
            );
            return;
        }
        debug!("Player {} sent {:?}", slot + 1, packet);

        match packet {
            Packet::Hello { name, replay: false } => self.set_name(slot, &name),
            Packet::Hello { replay: true, .. } => self.request_replay(slot),
            Packet::Move { col } => self.play_move(slot, col),
            Packet::Over { quit: true } => self.quit(slot),
            Packet::Over { quit: false } => self.decline(slot),
            other => {
                warn!(
                    "Unexpected {} packet from player {}",
                    other.kind(),
                    slot + 1
                );
                self.reject(slot, "clients may not send server messages");
            }
        }
    }

    /// Drops a player whose connection failed, timed out or sent garbage.
    /// The remaining player cannot continue alone and is released too.
    ///
    /// A player who leaves while still waiting for an opponent frees the
    /// session instead: the next connection is seated as the first player.
    pub fn player_left(&mut self, slot: usize) {
        if !self.players.is_connected(slot) {
            return;
        }
        warn!("Player {} left the session", slot + 1);
        self.remove_player(slot);

        if self.phase == Phase::WaitingForPlayers {
            self.players.reset();
            info!("Session reopened for a new first player");
            return;
        }

        let other = ClientManager::opponent(slot);
        if self.players.is_connected(other) {
            self.terminate_for(other);
        } else {
            self.phase = Phase::Terminated;
        }
    }

    /// Drops `tile` for the player in `slot` into `col` and returns its row.
    /// The board is untouched on error.
    pub fn update_board(&mut self, col: i32, slot: usize) -> Result<usize, MoveError> {
        let tile = self.players.tile(slot);
        self.board.drop_tile(col, tile)
    }

    pub fn check_for_winner(&self, tile: Tile) -> bool {
        self.board.has_five(tile)
    }

    fn set_name(&mut self, slot: usize, name: &str) {
        self.players.set_name(slot, &player_name(name, slot));
        info!("Player {} is called {}", slot + 1, self.players.name(slot));
    }

    fn play_move(&mut self, slot: usize, col: i32) {
        match self.phase {
            Phase::AwaitingMove(turn) if turn == slot => {}
            Phase::AwaitingMove(_) => {
                self.reject(slot, "it is not your turn");
                return;
            }
            _ => {
                self.reject(slot, "no game is in progress");
                return;
            }
        }

        let row = match self.update_board(col, slot) {
            Ok(row) => row,
            Err(e) => {
                warn!("Illegal move from player {}: {}", slot + 1, e);
                self.reject(slot, &e.to_string());
                return;
            }
        };

        let tile = self.players.tile(slot);
        // drop_tile succeeded, so col is a valid index
        let col = col as usize;
        debug!("Player {} placed {} at ({}, {})", slot + 1, tile, row, col);

        let placement = Placement { row, col, tile };
        let opponent = ClientManager::opponent(slot);

        if self.check_for_winner(tile) {
            let name = self.players.name(slot);
            info!("{} wins", name);
            self.broadcast(Packet::GameOver {
                name,
                quit: false,
                is_final: false,
                draw: false,
                placement: Some(placement),
            });
            self.phase = Phase::Finished;
        } else if self.board.is_full() {
            info!("Board is full, game drawn");
            self.broadcast(Packet::GameOver {
                name: String::new(),
                quit: false,
                is_final: false,
                draw: true,
                placement: Some(placement),
            });
            self.phase = Phase::Finished;
        } else {
            self.send(
                slot,
                Packet::Update {
                    your_move: false,
                    row,
                    col,
                    tile,
                },
            );
            self.send(
                opponent,
                Packet::Update {
                    your_move: true,
                    row,
                    col,
                    tile,
                },
            );
            self.phase = Phase::AwaitingMove(opponent);
        }
    }

    /// Mid-game quit: the opponent is announced as winner to both players.
    fn quit(&mut self, slot: usize) {
        if !matches!(self.phase, Phase::AwaitingMove(_)) {
            self.reject(slot, "no game is in progress");
            return;
        }

        let name = self.players.name(ClientManager::opponent(slot));
        info!("Player {} quit, {} wins", slot + 1, name);
        self.broadcast(Packet::GameOver {
            name,
            quit: true,
            is_final: false,
            draw: false,
            placement: None,
        });
        self.phase = Phase::Finished;
        self.replay_requester = None;
    }

    /// The player does not want another game and leaves the session.
    fn decline(&mut self, slot: usize) {
        info!("Player {} declined to play again", slot + 1);
        let was_playing = matches!(self.phase, Phase::AwaitingMove(_));
        self.remove_player(slot);

        let other = ClientManager::opponent(slot);
        if !self.players.is_connected(other) {
            self.phase = Phase::Terminated;
        } else if was_playing || self.replay_requester == Some(other) {
            self.terminate_for(other);
        } else {
            // Other player has not answered yet; their reply ends the session.
            self.phase = Phase::Finished;
        }
    }

    fn request_replay(&mut self, slot: usize) {
        if self.phase != Phase::Finished {
            self.reject(slot, "the current game has not finished");
            return;
        }

        let other = ClientManager::opponent(slot);
        if !self.players.is_connected(other) {
            self.terminate_for(slot);
            return;
        }

        match self.replay_requester {
            Some(first) if first == other => {
                self.board.clear();
                self.replay_requester = None;
                self.send(
                    slot,
                    Packet::Handshake {
                        wait: false,
                        your_move: false,
                    },
                );
                self.send(
                    first,
                    Packet::Handshake {
                        wait: false,
                        your_move: true,
                    },
                );
                self.phase = Phase::AwaitingMove(first);
                info!("Rematch started, player {} moves first", first + 1);
            }
            Some(_) => debug!("Player {} repeated their replay request", slot + 1),
            None => {
                self.send(
                    slot,
                    Packet::Handshake {
                        wait: true,
                        your_move: false,
                    },
                );
                self.replay_requester = Some(slot);
            }
        }
    }

    /// Sends the final notice to the last remaining player and ends the session.
    fn terminate_for(&mut self, slot: usize) {
        let name = self.players.name(slot);
        self.send(
            slot,
            Packet::GameOver {
                name,
                quit: false,
                is_final: true,
                draw: false,
                placement: None,
            },
        );
        self.remove_player(slot);
        self.phase = Phase::Terminated;
        self.replay_requester = None;
        info!("Session terminated");
    }

    fn remove_player(&mut self, slot: usize) {
        if self.players.remove_client(slot).is_some() {
            self.outbox.push(GameMessage::Close { slot });
        }
        if self.replay_requester == Some(slot) {
            self.replay_requester = None;
        }
    }

    fn reject(&mut self, slot: usize, reason: &str) {
        self.send(
            slot,
            Packet::Rejected {
                reason: reason.to_string(),
            },
        );
    }

    fn send(&mut self, slot: usize, packet: Packet) {
        self.outbox.push(GameMessage::SendPacket { slot, packet });
    }

    fn broadcast(&mut self, packet: Packet) {
        for slot in self.players.connected_slots() {
            self.send(slot, packet.clone());
        }
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}
