//! Interactive prompts for the provisioning command.
//!
//! Provisioning asks two optional questions (configure WiFi, write the
//! credential file) using a single-keypress convention: Enter accepts,
//! Escape skips. The trait keeps the provisioning sequence testable
//! without a terminal; the real implementation uses crossterm raw mode
//! for the keypress and plain line reads for values.

use crate::error::{DeployError, Result};
use crossterm::event::{read, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::io::{BufRead, IsTerminal, Write};

/// Interaction seam for the provisioning sequence.
pub trait Prompt {
    /// Ask a yes/no question. Enter = yes, Escape = no.
    fn confirm(&mut self, question: &str) -> Result<bool>;

    /// Read one line of input for `label`.
    fn read_line(&mut self, label: &str) -> Result<String>;
}

/// Terminal-backed prompt.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        // Without a terminal there is nobody to ask; treat as Escape.
        if !std::io::stdin().is_terminal() {
            return Ok(false);
        }

        print!("{} [Enter = yes, Esc = no] ", question);
        std::io::stdout()
            .flush()
            .map_err(|e| DeployError::prompt(e.to_string()))?;

        enable_raw_mode().map_err(|e| DeployError::prompt(e.to_string()))?;
        let answer = loop {
            match read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Enter => break Ok(true),
                    KeyCode::Esc => break Ok(false),
                    _ => continue,
                },
                Ok(_) => continue,
                Err(e) => break Err(DeployError::prompt(e.to_string())),
            }
        };
        // Always restore the terminal, even if the read failed
        let _ = disable_raw_mode();
        println!();
        answer
    }

    fn read_line(&mut self, label: &str) -> Result<String> {
        print!("{}: ", label);
        std::io::stdout()
            .flush()
            .map_err(|e| DeployError::prompt(e.to_string()))?;

        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| DeployError::prompt(e.to_string()))?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

#[cfg(test)]
pub mod testing {
    //! Scripted prompt for sequence tests.

    use super::*;
    use std::collections::VecDeque;

    /// Prompt that replays pre-seeded answers and records every question.
    #[derive(Debug, Default)]
    pub struct ScriptedPrompt {
        confirms: VecDeque<bool>,
        lines: VecDeque<String>,
        /// Questions asked, in order.
        pub asked: Vec<String>,
    }

    impl ScriptedPrompt {
        pub fn new(confirms: &[bool], lines: &[&str]) -> Self {
            Self {
                confirms: confirms.iter().copied().collect(),
                lines: lines.iter().map(|s| s.to_string()).collect(),
                asked: Vec::new(),
            }
        }
    }

    impl Prompt for ScriptedPrompt {
        fn confirm(&mut self, question: &str) -> Result<bool> {
            self.asked.push(question.to_string());
            Ok(self.confirms.pop_front().unwrap_or(false))
        }

        fn read_line(&mut self, label: &str) -> Result<String> {
            self.asked.push(label.to_string());
            Ok(self.lines.pop_front().unwrap_or_default())
        }
    }
}
