//! # Connect-5 Server Library
//!
//! Authoritative server for two-player Connect-5. The server seats players
//! in pairs, owns the only real copy of each board, validates every move and
//! tells both players what happened.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative Board
//! Clients only mirror the board. Gravity placement, move legality and win
//! detection are decided here; an illegal move is answered with a
//! `Rejected` packet and never touches the board.
//!
//! ### Session Protocol
//! Each pair of players walks through the same lifecycle: join handshake,
//! alternating moves, game over (win, draw or quit), then replay
//! negotiation. Turn ownership is an explicit phase of the session rather
//! than something inferred from the last message sent.
//!
//! ### Connection Lifecycle
//! A player whose connection drops or who sends an undecodable frame is
//! removed, and their opponent receives a final notice. Only that session
//! ends; the accept loop keeps seating new pairs.
//!
//! ## Architecture Design
//!
//! ### One Task Per Session
//! Every session runs in its own task that owns its [`session::GameSession`].
//! Per-connection reader tasks forward decoded packets over a channel and
//! per-connection writer tasks drain an outgoing queue, so all board and
//! slot mutations for a turn happen on one task without locks.
//!
//! ### Framed TCP
//! Packets are bincode-encoded and length-prefixed (see `shared::codec`),
//! so message boundaries never depend on how TCP splits the stream.
//!
//! ## Module Organization
//!
//! - `client_manager`: the two player seats, their tiles and names
//! - `session`: the protocol state machine, pure and synchronous
//! - `network`: accept loop, connection tasks and session runner
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut server = Server::new("127.0.0.1:8080").await?;
//!     server.run().await;
//!     Ok(())
//! }
//! ```

pub mod client_manager;
pub mod network;
pub mod session;
