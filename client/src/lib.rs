//! # Connect-5 Client Library
//!
//! Client side of the two-player Connect-5 game. The client keeps a mirror
//! of the board, shows it to the player, collects column choices and applies
//! whatever the server pushes back.
//!
//! ## Architecture Overview
//!
//! The server is the only authority on the board. The client never decides
//! whether a move wins; it only filters obviously unplayable input (a column
//! outside the board or already full) before sending it. Every board change
//! the player sees arrives as a server message.
//!
//! ### Turn State Machine
//! Turn ownership is driven entirely by incoming messages. A waiting
//! handshake, or a start handshake that gives the first move to the
//! opponent, makes the client block for the next message straight away.
//! Updates carry the placed tile and whose turn is next; a game over notice
//! ends the round and may end the session.
//!
//! ### Blocking Receive
//! The client runs on one task. Receiving suspends until exactly one
//! message arrives, with a timeout so a dead server is reported instead of
//! hanging forever.
//!
//! ## Module Organization
//!
//! - `game`: board mirror, turn state, `check_move` filtering
//! - `input`: prompts for names, columns and yes/no answers
//! - `rendering`: text output of the board and game events
//! - `network`: connection handling and the game/replay loop
//! - `error`: the client error type
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::input::InputManager;
//! use client::network::{Client, ClientConfig};
//! use client::rendering::Renderer;
//! use std::time::Duration;
//! use tokio::net::TcpStream;
//!
//! # async fn example() -> Result<(), client::error::ClientError> {
//! let config = ClientConfig {
//!     host: "127.0.0.1".to_string(),
//!     port: 8080,
//!     name: None,
//!     connect_timeout: Duration::from_secs(5),
//!     receive_timeout: Duration::from_secs(600),
//! };
//! let stdin = std::io::stdin();
//! let mut client: Client<TcpStream, _, _> = Client::new(
//!     config,
//!     InputManager::new(stdin.lock()),
//!     Renderer::new(std::io::stdout()),
//! );
//! client.run().await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod game;
pub mod input;
pub mod network;
pub mod rendering;
