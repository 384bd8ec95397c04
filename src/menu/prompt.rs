//! Interactive input
//!
//! Every prompt can be cancelled. Cancellation is reported as `None` and the
//! caller decides what it means (the menus treat it as abort).

use std::io::{BufRead, Write};

use crate::error::Result;

/// Source of user choices and sink for user-facing text.
pub trait Prompter {
    /// Ask the user to pick one of `choices`; returns its index.
    fn select(&mut self, message: &str, choices: &[String]) -> Result<Option<usize>>;

    /// Ask for a line of text.
    fn text(&mut self, message: &str) -> Result<Option<String>>;

    /// Show a line to the user.
    fn say(&mut self, line: &str) -> Result<()>;
}

/// Line-based prompts over any reader/writer pair.
///
/// Choices are numbered from 1. End of input cancels the prompt; anything
/// that is not a listed number asks again.
pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Read one line; `None` at end of input.
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn select(&mut self, message: &str, choices: &[String]) -> Result<Option<usize>> {
        writeln!(self.output, "? {}", message)?;
        for (i, choice) in choices.iter().enumerate() {
            writeln!(self.output, "  {}) {}", i + 1, choice)?;
        }

        loop {
            write!(self.output, "> ")?;
            self.output.flush()?;

            let line = match self.read_line()? {
                Some(line) => line,
                None => return Ok(None),
            };

            match line.trim().parse::<usize>() {
                Ok(n) if (1..=choices.len()).contains(&n) => return Ok(Some(n - 1)),
                _ => writeln!(self.output, "Please enter a number from 1 to {}", choices.len())?,
            }
        }
    }

    fn text(&mut self, message: &str) -> Result<Option<String>> {
        write!(self.output, "? {} ", message)?;
        self.output.flush()?;
        Ok(self.read_line()?.map(|line| line.trim().to_string()))
    }

    fn say(&mut self, line: &str) -> Result<()> {
        writeln!(self.output, "{}", line)?;
        Ok(())
    }
}
