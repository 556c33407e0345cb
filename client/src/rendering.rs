use crate::game::{ClientEvent, Outcome};
use shared::{Board, COLS, ROWS};
use std::io::{self, Write};

/// Text renderer for the board and game messages
pub struct Renderer<W: Write> {
    out: W,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn message(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", text)?;
        self.out.flush()
    }

    /// Writes a prompt without a trailing newline
    pub fn prompt(&mut self, text: &str) -> io::Result<()> {
        write!(self.out, "{}", text)?;
        self.out.flush()
    }

    pub fn render_board(&mut self, board: &Board) -> io::Result<()> {
        writeln!(self.out)?;
        let header: String = (1..=COLS).map(|col| format!(" {} ", col)).collect();
        writeln!(self.out, "{}", header)?;

        for row in 0..ROWS {
            let line: String = (0..COLS)
                .map(|col| match board.get(row, col) {
                    Some(tile) => format!("[{}]", tile),
                    None => "[ ]".to_string(),
                })
                .collect();
            writeln!(self.out, "{}", line)?;
        }
        self.out.flush()
    }

    pub fn show_event(&mut self, event: &ClientEvent) -> io::Result<()> {
        match event {
            ClientEvent::WaitingForOpponent => self.message("Waiting for opponent to respond..."),
            ClientEvent::GameStarted { your_move } => {
                self.message("Game is beginning!")?;
                if *your_move {
                    self.message("You are making the first move.")
                } else {
                    self.message("Your opponent is making their move.")
                }
            }
            ClientEvent::BoardUpdated { .. } => Ok(()),
            ClientEvent::MoveRejected { reason } => {
                self.message(&format!("The server rejected your move: {}", reason))
            }
            ClientEvent::GameOver(outcome) => self.show_outcome(outcome),
        }
    }

    fn show_outcome(&mut self, outcome: &Outcome) -> io::Result<()> {
        match outcome {
            Outcome::OpponentLeft => {
                self.message("Unable to play again, your opponent has left.")
            }
            Outcome::Draw => {
                self.message("Game over!")?;
                self.message("It's a draw!")
            }
            Outcome::Quit {
                winner,
                opponent_quit,
            } => {
                if *opponent_quit {
                    self.message("Your opponent has quit!")?;
                }
                self.message("Game over!")?;
                self.message(&format!("{} is the winner!", winner))
            }
            Outcome::Winner { name, you } => {
                self.message("Game over!")?;
                if *you {
                    self.message("You are the winner!")
                } else {
                    self.message(&format!("{} is the winner!", name))
                }
            }
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
