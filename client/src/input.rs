//! Line-based player input with validation and confirmation prompts

use crate::error::ClientError;
use crate::game::{Choice, ClientGameState};
use crate::rendering::Renderer;
use log::debug;
use shared::MoveError;
use std::io::{BufRead, Write};

/// Reads player answers one line at a time from any buffered source
pub struct InputManager<R: BufRead> {
    input: R,
}

impl<R: BufRead> InputManager<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }

    /// Next trimmed line, or None once the input is exhausted
    pub fn read_line(&mut self) -> Result<Option<String>, ClientError> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    pub fn ask_name<W: Write>(&mut self, renderer: &mut Renderer<W>) -> Result<String, ClientError> {
        renderer.prompt("Please enter your name: ")?;
        Ok(self.read_line()?.unwrap_or_default())
    }

    /// Repeats `question` until the answer is `y` or `n`. Closed input
    /// counts as `n`.
    pub fn ask_yes_no<W: Write>(
        &mut self,
        renderer: &mut Renderer<W>,
        question: &str,
    ) -> Result<bool, ClientError> {
        loop {
            renderer.prompt(question)?;
            match self.read_line()?.as_deref() {
                Some("y") => return Ok(true),
                Some("n") | None => return Ok(false),
                Some(_) => continue,
            }
        }
    }

    /// Prompts until the player picks a playable column or confirms quitting.
    ///
    /// Columns are typed 1-9 and 0 means quit; the returned choice is
    /// zero-based. Closed input is treated as quitting.
    pub fn read_move<W: Write>(
        &mut self,
        renderer: &mut Renderer<W>,
        state: &ClientGameState,
    ) -> Result<Choice, ClientError> {
        loop {
            renderer.prompt("It's your turn, please enter a column between 1-9 (or 0 to quit): ")?;
            let Some(line) = self.read_line()? else {
                debug!("Input closed, quitting");
                return Ok(Choice::Quit);
            };

            let typed: i32 = match line.parse() {
                Ok(n) => n,
                Err(_) => {
                    renderer.message("Please enter a number...")?;
                    continue;
                }
            };

            match state.check_move(typed.saturating_sub(1)) {
                Ok(Choice::Quit) => {
                    if self.ask_yes_no(renderer, "Are you sure you want to quit? (y/n) ")? {
                        return Ok(Choice::Quit);
                    }
                }
                Ok(choice) => return Ok(choice),
                Err(MoveError::ColumnFull(col)) => {
                    renderer.message(&format!("Column {} is full...", col + 1))?;
                }
                Err(_) => renderer.message("Enter a number between 0-9...")?,
            }
        }
    }
}
