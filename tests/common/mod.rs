//! Shared test doubles for the sequence tests.

// Each test binary compiles this module; not every binary uses every helper.
#![allow(dead_code)]

use pideploy::error::Result;
use pideploy::runner::{CommandOutput, CommandRunner, CommandSpec};
use pideploy::Prompt;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::Write;

/// Scripted command runner: records every invocation and replays canned
/// results matched by substring against the rendered command line.
#[derive(Debug, Default)]
pub struct FakeRunner {
    calls: RefCell<Vec<String>>,
    stdin_writes: RefCell<Vec<(String, String)>>,
    responses: Vec<(String, CommandOutput)>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands whose rendered line contains `pattern` succeed with `stdout`.
    pub fn respond(mut self, pattern: &str, stdout: &str) -> Self {
        self.responses.push((
            pattern.to_string(),
            CommandOutput {
                stdout: stdout.to_string(),
                stderr: String::new(),
                exit_code: Some(0),
                success: true,
            },
        ));
        self
    }

    /// Commands whose rendered line contains `pattern` fail with `stderr`.
    pub fn fail_on(mut self, pattern: &str, stderr: &str) -> Self {
        self.responses.push((
            pattern.to_string(),
            CommandOutput {
                stdout: String::new(),
                stderr: stderr.to_string(),
                exit_code: Some(1),
                success: false,
            },
        ));
        self
    }

    /// Every command line recorded so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Number of recorded command lines containing `pattern`.
    pub fn count_matching(&self, pattern: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.contains(pattern))
            .count()
    }

    /// Index of the first recorded command line containing `pattern`.
    pub fn position_of(&self, pattern: &str) -> Option<usize> {
        self.calls
            .borrow()
            .iter()
            .position(|call| call.contains(pattern))
    }

    /// Stdin payloads written via `run_with_input`, with their command lines.
    pub fn stdin_writes(&self) -> Vec<(String, String)> {
        self.stdin_writes.borrow().clone()
    }

    fn output_for(&self, display: &str) -> CommandOutput {
        for (pattern, output) in &self.responses {
            if display.contains(pattern.as_str()) {
                return output.clone();
            }
        }
        CommandOutput {
            stdout: String::new(),
            stderr: String::new(),
            exit_code: Some(0),
            success: true,
        }
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        let display = spec.display();
        self.calls.borrow_mut().push(display.clone());
        Ok(self.output_for(&display))
    }

    fn run_with_input(&self, spec: &CommandSpec, input: &str) -> Result<CommandOutput> {
        let display = spec.display();
        self.calls.borrow_mut().push(display.clone());
        self.stdin_writes
            .borrow_mut()
            .push((display.clone(), input.to_string()));
        Ok(self.output_for(&display))
    }

    fn run_streamed(&self, spec: &CommandSpec, sink: &mut dyn Write) -> Result<CommandOutput> {
        let display = spec.display();
        self.calls.borrow_mut().push(display.clone());
        let output = self.output_for(&display);
        write!(sink, "{}", output.stdout)?;
        Ok(output)
    }
}

/// Prompt that replays pre-seeded answers.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    confirms: VecDeque<bool>,
    lines: VecDeque<String>,
}

impl ScriptedPrompt {
    pub fn new(confirms: &[bool], lines: &[&str]) -> Self {
        Self {
            confirms: confirms.iter().copied().collect(),
            lines: lines.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Prompt for ScriptedPrompt {
    fn confirm(&mut self, _question: &str) -> Result<bool> {
        Ok(self.confirms.pop_front().unwrap_or(false))
    }

    fn read_line(&mut self, _label: &str) -> Result<String> {
        Ok(self.lines.pop_front().unwrap_or_default())
    }
}
