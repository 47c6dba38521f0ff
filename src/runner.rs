//! External command execution.
//!
//! All provisioning and launcher steps shell out to system tools (`apt-get`,
//! `git`, `systemctl`, `nmcli`, ...). Every invocation goes through the
//! `CommandRunner` trait so the step sequencing can be exercised in tests
//! with a scripted runner instead of a live Pi.

use crate::error::{DeployError, Result};
use log::info;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;

/// Typed description of one external command invocation.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    /// Program name, resolved via `PATH` unless absolute.
    pub program: String,
    /// Arguments, in order.
    pub args: Vec<String>,
    /// Extra environment variables injected into the child.
    pub envs: Vec<(String, String)>,
    /// Working directory for the child, if any.
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    /// Build a spec from a program and argument list.
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|s| s.to_string()).collect(),
            envs: Vec::new(),
            cwd: None,
        }
    }

    /// Set the child's working directory.
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Add environment variables for the child.
    pub fn with_envs(mut self, envs: &[(String, String)]) -> Self {
        self.envs.extend(envs.iter().cloned());
        self
    }

    /// Human-readable rendering for log lines.
    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// Captured result of a command execution.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Standard output from the command.
    pub stdout: String,
    /// Standard error from the command.
    pub stderr: String,
    /// Exit code (None if terminated by signal).
    pub exit_code: Option<i32>,
    /// Whether the command exited successfully (exit code 0).
    pub success: bool,
}

impl CommandOutput {
    /// Check that the command succeeded and return an error if not.
    pub fn ensure_success(&self, context: &str) -> Result<()> {
        if self.success {
            Ok(())
        } else {
            let code = self.exit_code.unwrap_or(-1);
            Err(DeployError::command(format!(
                "{} failed (exit code {}): {}",
                context,
                code,
                self.stderr.trim()
            )))
        }
    }
}

/// Execution seam for external commands.
pub trait CommandRunner {
    /// Run a command to completion, capturing stdout and stderr.
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput>;

    /// Run a command, writing `input` to its stdin before waiting.
    fn run_with_input(&self, spec: &CommandSpec, input: &str) -> Result<CommandOutput>;

    /// Run a command, streaming its combined stdout and stderr into `sink`
    /// line by line, in arrival order, while the child runs.
    ///
    /// The returned `stdout` field holds the combined text; `stderr` is
    /// empty in this mode.
    fn run_streamed(&self, spec: &CommandSpec, sink: &mut dyn Write) -> Result<CommandOutput>;
}

/// Real implementation backed by `std::process::Command`.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl SystemRunner {
    fn command(spec: &CommandSpec) -> Command {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);
        for (key, value) in &spec.envs {
            cmd.env(key, value);
        }
        if let Some(cwd) = &spec.cwd {
            cmd.current_dir(cwd);
        }
        cmd
    }

    fn spawn_error(spec: &CommandSpec, err: std::io::Error) -> DeployError {
        DeployError::command(format!("failed to spawn {}: {}", spec.display(), err))
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        info!("run: {}", spec.display());
        let output = Self::command(spec)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| Self::spawn_error(spec, e))?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code(),
            success: output.status.success(),
        })
    }

    fn run_with_input(&self, spec: &CommandSpec, input: &str) -> Result<CommandOutput> {
        info!("run (stdin piped): {}", spec.display());
        let mut child = Self::command(spec)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Self::spawn_error(spec, e))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(input.as_bytes())?;
            // Pipe closes here so the child sees EOF
        }

        let output = child.wait_with_output()?;
        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code(),
            success: output.status.success(),
        })
    }

    fn run_streamed(&self, spec: &CommandSpec, sink: &mut dyn Write) -> Result<CommandOutput> {
        info!("run (streamed): {}", spec.display());
        let mut child = Self::command(spec)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Self::spawn_error(spec, e))?;

        // Both pipes must be drained while the child runs; a full stderr
        // buffer would otherwise block a chatty child forever. Each pipe
        // gets a reader thread feeding one channel, and lines land in the
        // sink in arrival order.
        let (tx, rx) = mpsc::channel::<Vec<u8>>();
        let mut readers = Vec::new();
        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_line_reader(stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_line_reader(stderr, tx.clone()));
        }
        drop(tx);

        let mut combined: Vec<u8> = Vec::new();
        for line in rx {
            if let Err(e) = sink.write_all(&line) {
                // Sink is gone; stop the child rather than leaving it
                // writing into a dead pipe.
                let _ = child.kill();
                let _ = child.wait();
                return Err(e.into());
            }
            combined.extend_from_slice(&line);
        }
        if combined.last().is_some_and(|last| *last != b'\n') {
            writeln!(sink)?;
        }
        sink.flush()?;

        for reader in readers {
            let _ = reader.join();
        }
        let status = child.wait()?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&combined).to_string(),
            stderr: String::new(),
            exit_code: status.code(),
            success: status.success(),
        })
    }
}

/// Forward one child pipe to `tx`, one line at a time, bytes untouched.
///
/// Raw bytes rather than `str` lines: application output is not required
/// to be UTF-8 and must stream through unaltered.
fn spawn_line_reader<R>(pipe: R, tx: mpsc::Sender<Vec<u8>>) -> thread::JoinHandle<()>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut reader = BufReader::new(pipe);
        let mut line = Vec::new();
        loop {
            line.clear();
            match reader.read_until(b'\n', &mut line) {
                Ok(0) => break,
                Ok(_) => {
                    if tx.send(line.clone()).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    })
}
