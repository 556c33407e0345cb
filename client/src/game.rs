//! Client-side mirror of the board and the turn state machine driven by
//! server messages

use crate::error::ClientError;
use log::debug;
use shared::{player_name, Board, MoveError, Packet, QUIT_COLUMN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Unknown,
    WaitingOpponent,
    MyTurn,
    GameOver,
}

/// How a game ended, from this player's point of view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Winner { name: String, you: bool },
    Quit { winner: String, opponent_quit: bool },
    Draw,
    /// The opponent left for good; no rematch is possible
    OpponentLeft,
}

/// Result of applying one server message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    WaitingForOpponent,
    GameStarted { your_move: bool },
    BoardUpdated { your_move: bool },
    MoveRejected { reason: String },
    GameOver(Outcome),
}

/// A validated choice from the local player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Column(i32),
    Quit,
}

impl Choice {
    pub fn into_packet(self) -> Packet {
        match self {
            Choice::Column(col) => Packet::Move { col },
            Choice::Quit => Packet::Over { quit: true },
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientGameState {
    pub board: Board,
    pub name: String,
    pub turn: TurnState,
    pub game_over: bool,
    /// Terminate the client once the current exchange is done
    pub stop: bool,
    /// Another round may still be negotiated
    pub replay: bool,
    /// Seat learned from the opening handshake of the session
    pub slot: Option<usize>,
}

impl ClientGameState {
    pub fn new(name: &str) -> Self {
        Self {
            board: Board::new(),
            name: name.to_string(),
            turn: TurnState::Unknown,
            game_over: true,
            stop: false,
            replay: true,
            slot: None,
        }
    }

    /// Resets per-round flags before waiting for the opening handshake
    pub fn begin_round(&mut self) {
        self.game_over = false;
        self.turn = TurnState::Unknown;
    }

    pub fn is_my_turn(&self) -> bool {
        self.turn == TurnState::MyTurn
    }

    /// Whether a name announced by the server refers to this player, given
    /// that the server trims names and fills in blank ones.
    pub fn is_me(&self, announced: &str) -> bool {
        match self.slot {
            Some(slot) => announced == player_name(&self.name, slot),
            None => announced == self.name.trim(),
        }
    }

    /// Client-side filter for a column the user typed (already zero-based).
    ///
    /// Advisory only: the server validates every move again.
    pub fn check_move(&self, col: i32) -> Result<Choice, MoveError> {
        if col == QUIT_COLUMN {
            return Ok(Choice::Quit);
        }
        let index = Board::column_index(col)?;
        if self.board.is_column_full(index) {
            return Err(MoveError::ColumnFull(index));
        }
        Ok(Choice::Column(col))
    }

    pub fn apply_packet(&mut self, packet: Packet) -> Result<ClientEvent, ClientError> {
        debug!("Applying {:?}", packet);

        match packet {
            Packet::Handshake { wait: true, .. } => {
                // Only the first player is ever told to wait on joining.
                if self.slot.is_none() {
                    self.slot = Some(0);
                }
                self.turn = TurnState::WaitingOpponent;
                Ok(ClientEvent::WaitingForOpponent)
            }
            Packet::Handshake {
                wait: false,
                your_move,
            } => {
                if self.slot.is_none() {
                    self.slot = Some(if your_move { 0 } else { 1 });
                }
                // A new round always starts from an empty board.
                self.board.clear();
                self.game_over = false;
                self.set_turn(your_move);
                Ok(ClientEvent::GameStarted { your_move })
            }
            Packet::Update {
                your_move,
                row,
                col,
                tile,
            } => {
                self.board.place(row, col, tile)?;
                self.set_turn(your_move);
                Ok(ClientEvent::BoardUpdated { your_move })
            }
            Packet::GameOver {
                name,
                quit,
                is_final,
                draw,
                placement,
            } => {
                if let Some(p) = placement {
                    self.board.place(p.row, p.col, p.tile)?;
                }
                self.game_over = true;
                self.turn = TurnState::GameOver;

                let outcome = if is_final {
                    self.stop = true;
                    self.replay = false;
                    Outcome::OpponentLeft
                } else if draw {
                    Outcome::Draw
                } else if quit {
                    Outcome::Quit {
                        opponent_quit: self.is_me(&name),
                        winner: name,
                    }
                } else {
                    Outcome::Winner {
                        you: self.is_me(&name),
                        name,
                    }
                };
                Ok(ClientEvent::GameOver(outcome))
            }
            Packet::Rejected { reason } => {
                self.turn = TurnState::MyTurn;
                Ok(ClientEvent::MoveRejected { reason })
            }
            other => Err(ClientError::UnexpectedPacket(other.kind())),
        }
    }

    fn set_turn(&mut self, your_move: bool) {
        self.turn = if your_move {
            TurnState::MyTurn
        } else {
            TurnState::WaitingOpponent
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Placement, Tile, ROWS};

    fn game_over(name: &str, quit: bool, is_final: bool, draw: bool) -> Packet {
        Packet::GameOver {
            name: name.to_string(),
            quit,
            is_final,
            draw,
            placement: None,
        }
    }

    #[test]
    fn test_initial_state() {
        let state = ClientGameState::new("alice");
        assert_eq!(state.turn, TurnState::Unknown);
        assert!(state.game_over);
        assert!(!state.stop);
        assert!(state.replay);
    }

    #[test]
    fn test_wait_handshake() {
        let mut state = ClientGameState::new("alice");
        state.begin_round();
        let event = state
            .apply_packet(Packet::Handshake {
                wait: true,
                your_move: false,
            })
            .unwrap();
        assert_eq!(event, ClientEvent::WaitingForOpponent);
        assert_eq!(state.turn, TurnState::WaitingOpponent);
        assert!(!state.game_over);
    }

    #[test]
    fn test_start_handshake_sets_turn() {
        let mut state = ClientGameState::new("alice");
        state.begin_round();
        state
            .apply_packet(Packet::Handshake {
                wait: false,
                your_move: true,
            })
            .unwrap();
        assert!(state.is_my_turn());

        state
            .apply_packet(Packet::Handshake {
                wait: false,
                your_move: false,
            })
            .unwrap();
        assert_eq!(state.turn, TurnState::WaitingOpponent);
    }

    #[test]
    fn test_start_handshake_clears_mirror() {
        let mut state = ClientGameState::new("alice");
        state.board.place(5, 0, Tile::X).unwrap();
        state
            .apply_packet(Packet::Handshake {
                wait: false,
                your_move: true,
            })
            .unwrap();
        assert_eq!(state.board, Board::new());
    }

    #[test]
    fn test_update_applies_tile_and_turn() {
        let mut state = ClientGameState::new("alice");
        let event = state
            .apply_packet(Packet::Update {
                your_move: true,
                row: 5,
                col: 3,
                tile: Tile::O,
            })
            .unwrap();
        assert_eq!(event, ClientEvent::BoardUpdated { your_move: true });
        assert_eq!(state.board.get(5, 3), Some(Tile::O));
        assert!(state.is_my_turn());
    }

    #[test]
    fn test_update_with_bad_cell_is_an_error() {
        let mut state = ClientGameState::new("alice");
        let result = state.apply_packet(Packet::Update {
            your_move: true,
            row: 9,
            col: 3,
            tile: Tile::O,
        });
        assert!(matches!(result, Err(ClientError::InvalidPlacement(_))));
    }

    #[test]
    fn test_win_places_final_tile() {
        let mut state = ClientGameState::new("alice");
        let event = state
            .apply_packet(Packet::GameOver {
                name: "alice".to_string(),
                quit: false,
                is_final: false,
                draw: false,
                placement: Some(Placement {
                    row: 5,
                    col: 4,
                    tile: Tile::X,
                }),
            })
            .unwrap();
        assert_eq!(
            event,
            ClientEvent::GameOver(Outcome::Winner {
                name: "alice".to_string(),
                you: true
            })
        );
        assert_eq!(state.board.get(5, 4), Some(Tile::X));
        assert!(state.game_over);
        assert_eq!(state.turn, TurnState::GameOver);
        assert!(!state.stop);
    }

    #[test]
    fn test_opponent_quit() {
        let mut state = ClientGameState::new("alice");
        let event = state.apply_packet(game_over("alice", true, false, false)).unwrap();
        assert_eq!(
            event,
            ClientEvent::GameOver(Outcome::Quit {
                winner: "alice".to_string(),
                opponent_quit: true
            })
        );
        assert!(!state.stop);
    }

    #[test]
    fn test_slot_learned_from_first_handshake() {
        let mut first = ClientGameState::new("alice");
        first
            .apply_packet(Packet::Handshake {
                wait: true,
                your_move: false,
            })
            .unwrap();
        first
            .apply_packet(Packet::Handshake {
                wait: false,
                your_move: true,
            })
            .unwrap();
        assert_eq!(first.slot, Some(0));

        let mut second = ClientGameState::new("bob");
        second
            .apply_packet(Packet::Handshake {
                wait: false,
                your_move: false,
            })
            .unwrap();
        // A rematch handshake does not change the seat.
        second
            .apply_packet(Packet::Handshake {
                wait: false,
                your_move: true,
            })
            .unwrap();
        assert_eq!(second.slot, Some(1));
    }

    #[test]
    fn test_blank_name_recognises_own_win() {
        let mut state = ClientGameState::new("  ");
        state
            .apply_packet(Packet::Handshake {
                wait: false,
                your_move: false,
            })
            .unwrap();
        let event = state.apply_packet(game_over("Player 2", false, false, false)).unwrap();
        assert_eq!(
            event,
            ClientEvent::GameOver(Outcome::Winner {
                name: "Player 2".to_string(),
                you: true
            })
        );
        assert!(!state.is_me("Player 1"));
    }

    #[test]
    fn test_padded_name_recognises_own_win() {
        let mut state = ClientGameState::new(" alice ");
        let event = state.apply_packet(game_over("alice", false, false, false)).unwrap();
        assert_eq!(
            event,
            ClientEvent::GameOver(Outcome::Winner {
                name: "alice".to_string(),
                you: true
            })
        );
    }

    #[test]
    fn test_final_stops_client() {
        let mut state = ClientGameState::new("alice");
        let event = state.apply_packet(game_over("", false, true, false)).unwrap();
        assert_eq!(event, ClientEvent::GameOver(Outcome::OpponentLeft));
        assert!(state.stop);
        assert!(!state.replay);
    }

    #[test]
    fn test_draw() {
        let mut state = ClientGameState::new("alice");
        let event = state.apply_packet(game_over("", false, false, true)).unwrap();
        assert_eq!(event, ClientEvent::GameOver(Outcome::Draw));
    }

    #[test]
    fn test_rejection_returns_turn() {
        let mut state = ClientGameState::new("alice");
        state.turn = TurnState::WaitingOpponent;
        let event = state
            .apply_packet(Packet::Rejected {
                reason: "column 1 is full".to_string(),
            })
            .unwrap();
        assert!(matches!(event, ClientEvent::MoveRejected { .. }));
        assert!(state.is_my_turn());
    }

    #[test]
    fn test_client_packet_from_server_is_an_error() {
        let mut state = ClientGameState::new("alice");
        let result = state.apply_packet(Packet::Move { col: 1 });
        assert!(matches!(result, Err(ClientError::UnexpectedPacket("MOVE"))));
    }

    #[test]
    fn test_check_move() {
        let mut state = ClientGameState::new("alice");
        assert_eq!(state.check_move(0), Ok(Choice::Column(0)));
        assert_eq!(state.check_move(8), Ok(Choice::Column(8)));
        assert_eq!(state.check_move(-1), Ok(Choice::Quit));
        assert_eq!(state.check_move(9), Err(MoveError::InvalidColumn(9)));
        assert_eq!(state.check_move(-2), Err(MoveError::InvalidColumn(-2)));

        for _ in 0..ROWS {
            state.board.drop_tile(2, Tile::X).unwrap();
        }
        assert_eq!(state.check_move(2), Err(MoveError::ColumnFull(2)));
    }

    #[test]
    fn test_choice_packets() {
        assert_eq!(Choice::Column(4).into_packet(), Packet::Move { col: 4 });
        assert_eq!(Choice::Quit.into_packet(), Packet::Over { quit: true });
    }
}
