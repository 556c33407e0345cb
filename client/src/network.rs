use crate::error::ClientError;
use crate::game::{ClientEvent, ClientGameState};
use crate::input::InputManager;
use crate::rendering::Renderer;
use log::{error, info, warn};
use shared::{read_packet, write_packet, Packet, ProtocolError};
use std::io::{BufRead, Write};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::time::timeout;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    /// Display name; asked interactively when not set
    pub name: Option<String>,
    pub connect_timeout: Duration,
    pub receive_timeout: Duration,
}

impl ClientConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Opens a TCP connection, giving up after `limit`
pub async fn connect(address: &str, limit: Duration) -> Result<TcpStream, ClientError> {
    match timeout(limit, TcpStream::connect(address)).await {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(e)) => Err(ClientError::Connect {
            addr: address.to_string(),
            reason: e.to_string(),
        }),
        Err(_) => Err(ClientError::Connect {
            addr: address.to_string(),
            reason: format!("no answer within {:?}", limit),
        }),
    }
}

/// Drives one player's side of the game: prompts, server messages and the
/// replay loop.
pub struct Client<S, R: BufRead, W: Write> {
    config: ClientConfig,
    stream: Option<S>,
    state: ClientGameState,
    input: InputManager<R>,
    renderer: Renderer<W>,
}

impl<S, R, W> Client<S, R, W>
where
    S: AsyncRead + AsyncWrite + Unpin,
    R: BufRead,
    W: Write,
{
    pub fn new(config: ClientConfig, input: InputManager<R>, renderer: Renderer<W>) -> Self {
        let name = config.name.clone().unwrap_or_default();
        Self {
            config,
            stream: None,
            state: ClientGameState::new(&name),
            input,
            renderer,
        }
    }

    /// Uses an already established connection
    pub fn with_stream(mut self, stream: S) -> Self {
        self.stream = Some(stream);
        self
    }

    pub fn state(&self) -> &ClientGameState {
        &self.state
    }

    pub fn renderer(&self) -> &Renderer<W> {
        &self.renderer
    }

    /// Plays games on the current connection until either side stops.
    pub async fn play(&mut self) -> Result<(), ClientError> {
        let name = self.state.name.clone();
        self.send_packet(&Packet::Hello {
            name,
            replay: false,
        })
        .await?;

        while self.state.replay {
            self.game().await?;
            if self.state.stop {
                break;
            }

            if self
                .input
                .ask_yes_no(&mut self.renderer, "Would you like to play again? (y/n) ")?
            {
                let name = self.state.name.clone();
                self.send_packet(&Packet::Hello { name, replay: true })
                    .await?;
            } else {
                self.send_packet(&Packet::Over { quit: false }).await?;
                self.state.replay = false;
                self.state.stop = true;
            }
        }

        Ok(())
    }

    /// One round: wait for the opening handshake, then alternate between
    /// prompting for moves and waiting for the opponent.
    async fn game(&mut self) -> Result<(), ClientError> {
        self.state.begin_round();
        self.receive().await?;

        while !self.state.game_over {
            self.renderer.render_board(&self.state.board)?;
            if self.state.is_my_turn() {
                let choice = self.input.read_move(&mut self.renderer, &self.state)?;
                self.send_packet(&choice.into_packet()).await?;
            } else {
                self.renderer
                    .message("Waiting for opponent to make their move...")?;
            }
            self.receive().await?;
        }

        self.renderer.render_board(&self.state.board)?;
        Ok(())
    }

    /// Blocks for the next server message and applies it. Handshakes that
    /// leave the opponent to act are followed by another receive.
    async fn receive(&mut self) -> Result<(), ClientError> {
        loop {
            let packet = self.next_packet().await?;
            let event = self.state.apply_packet(packet)?;
            if let ClientEvent::MoveRejected { reason } = &event {
                warn!("Move rejected: {}", reason);
            }
            self.renderer.show_event(&event)?;

            match event {
                ClientEvent::WaitingForOpponent | ClientEvent::GameStarted { your_move: false } => {
                    continue
                }
                _ => return Ok(()),
            }
        }
    }

    async fn next_packet(&mut self) -> Result<Packet, ClientError> {
        let limit = self.config.receive_timeout;
        let stream = self.stream.as_mut().ok_or(ClientError::NotConnected)?;

        match timeout(limit, read_packet(stream)).await {
            Ok(Ok(Some(packet))) => Ok(packet),
            Ok(Ok(None)) => Err(ProtocolError::ConnectionClosed.into()),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(ProtocolError::Timeout("a server message").into()),
        }
    }

    async fn send_packet(&mut self, packet: &Packet) -> Result<(), ClientError> {
        let stream = self.stream.as_mut().ok_or(ClientError::NotConnected)?;
        write_packet(stream, packet).await?;
        Ok(())
    }
}

impl<R: BufRead, W: Write> Client<TcpStream, R, W> {
    /// Full client lifecycle: ask for a name, connect (offering retries),
    /// then play until the session ends.
    pub async fn run(&mut self) -> Result<(), ClientError> {
        self.renderer.message("Connect-5 client started")?;
        if self.state.name.is_empty() {
            self.state.name = self.input.ask_name(&mut self.renderer)?;
        }

        let address = self.config.address();
        while !self.state.stop {
            self.renderer.message("Connecting to server...")?;
            match connect(&address, self.config.connect_timeout).await {
                Ok(stream) => {
                    info!("Connected to {}", address);
                    self.renderer.message("Connected!")?;
                    self.stream = Some(stream);
                    let result = self.play().await;
                    self.stream = None;
                    result?;
                    self.state.stop = true;
                }
                Err(e) => {
                    error!("{}", e);
                    self.renderer.message("Could not connect to server...")?;
                    if !self
                        .input
                        .ask_yes_no(&mut self.renderer, "Would you like to try again? (y/n) ")?
                    {
                        self.state.stop = true;
                    }
                }
            }
        }

        Ok(())
    }
}
