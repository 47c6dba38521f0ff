//! Manual audio smoke tests over the ALSA command-line tools.
//!
//! Two thin wrappers: record a short clip from the capture device, play a
//! WAV file through the speaker. No internal state; failure is the tool's
//! own non-zero exit.

use crate::config::DeployConfig;
use crate::error::{DeployError, Result};
use crate::runner::{CommandRunner, CommandSpec};
use std::path::Path;

/// Default length of the record test, in seconds.
pub const DEFAULT_RECORD_SECS: u32 = 5;

/// Record a short mono 16-bit clip from the configured capture device.
pub fn record_test(
    runner: &dyn CommandRunner,
    config: &DeployConfig,
    output: &Path,
    seconds: u32,
) -> Result<()> {
    let duration = seconds.to_string();
    let spec = CommandSpec::new(
        "arecord",
        &[
            "-D",
            &config.capture_device,
            "-f",
            "S16_LE",
            "-r",
            "44100",
            "-c",
            "1",
            "-d",
            &duration,
            &output.display().to_string(),
        ],
    );
    runner.run(&spec)?.ensure_success("arecord")?;
    println!("recorded {}s to {}", seconds, output.display());
    Ok(())
}

/// Play a WAV file through the configured playback device.
pub fn playback_test(runner: &dyn CommandRunner, config: &DeployConfig, file: &Path) -> Result<()> {
    if !file.is_file() {
        return Err(DeployError::validation(format!(
            "{} does not exist",
            file.display()
        )));
    }
    let spec = CommandSpec::new(
        "aplay",
        &["-D", &config.playback_device, &file.display().to_string()],
    );
    runner.run(&spec)?.ensure_success("aplay")?;
    println!("played {}", file.display());
    Ok(())
}
