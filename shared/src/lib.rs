//! Types shared by the Connect-5 server and client: board geometry, the wire
//! protocol and its framing.

pub mod board;
pub mod codec;

pub use board::{Board, MoveError};
pub use codec::{decode_body, encode_frame, read_packet, write_packet, ProtocolError};

use serde::{Deserialize, Serialize};
use std::fmt;

pub const ROWS: usize = 6;
pub const COLS: usize = 9;
pub const WIN_LENGTH: usize = 5;

/// Column value the client uses locally to mean "quit this game".
pub const QUIT_COLUMN: i32 = -1;

/// Largest accepted frame body in bytes.
pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// Name the server announces for the player in `slot`: what they sent,
/// trimmed, or `Player N` when that is blank.
pub fn player_name(sent: &str, slot: usize) -> String {
    let name = sent.trim();
    if name.is_empty() {
        format!("Player {}", slot + 1)
    } else {
        name.to_string()
    }
}

/// Mark identifying a player's pieces. Slot 0 always plays `X`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tile {
    X,
    O,
}

impl Tile {
    pub fn for_slot(slot: usize) -> Self {
        if slot == 0 {
            Tile::X
        } else {
            Tile::O
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Tile::X => 'X',
            Tile::O => 'O',
        }
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A tile that landed on the board, carried alongside the end-of-game notice.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub row: usize,
    pub col: usize,
    pub tile: Tile,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum Packet {
    // Client -> server
    /// Join with a display name, or ask for a rematch when `replay` is set.
    Hello {
        name: String,
        replay: bool,
    },
    Move {
        col: i32,
    },
    /// `quit: true` abandons the running game, `quit: false` declines a rematch.
    Over {
        quit: bool,
    },

    // Server -> client
    Handshake {
        wait: bool,
        your_move: bool,
    },
    Update {
        your_move: bool,
        row: usize,
        col: usize,
        tile: Tile,
    },
    GameOver {
        name: String,
        quit: bool,
        #[serde(rename = "final")]
        is_final: bool,
        draw: bool,
        placement: Option<Placement>,
    },
    Rejected {
        reason: String,
    },
}

impl Packet {
    /// Protocol name of the message, as logged by both peers.
    pub fn kind(&self) -> &'static str {
        match self {
            Packet::Hello { .. } | Packet::Handshake { .. } => "HELLO",
            Packet::Move { .. } | Packet::Update { .. } => "MOVE",
            Packet::Over { .. } | Packet::GameOver { .. } => "OVER",
            Packet::Rejected { .. } => "REJECTED",
        }
    }
}
