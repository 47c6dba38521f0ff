//! pideploy library
//!
//! Provisioning and boot-launcher logic for the Raspberry Pi hosted voice
//! assistant. The binary is a thin dispatcher over these modules.

pub mod audio;
pub mod cli;
pub mod config;
pub mod crontab;
pub mod error;
pub mod journal;
pub mod launch;
pub mod prompt;
pub mod provision;
pub mod runner;
pub mod systemd;
pub mod venv;
pub mod wifi;

// Re-export main types for convenience
pub use config::DeployConfig;
pub use error::{DeployError, Result};
pub use journal::Journal;
pub use launch::launch;
pub use prompt::{Prompt, TerminalPrompt};
pub use provision::{provision, Scheduler};
pub use runner::{CommandOutput, CommandRunner, CommandSpec, SystemRunner};
pub use systemd::{render_unit, UnitSpec};
pub use wifi::WifiCredentials;
