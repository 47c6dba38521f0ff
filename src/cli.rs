use crate::provision::Scheduler;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// pideploy - provisioning and boot launcher for the Pi appliance
#[derive(Parser)]
#[command(name = "pideploy")]
#[command(about = "Provision a Raspberry Pi and launch the voice assistant at boot")]
#[command(version)]
pub struct Cli {
    /// JSON file overriding the embedded deployment defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Provision this machine and register the boot launcher
    Setup {
        /// Auto-start mechanism to register
        #[arg(long, value_enum, default_value = "systemd")]
        scheduler: Scheduler,
    },
    /// Update the checkout and run the application (invoked at boot)
    Start,
    /// Create or update the WiFi connection profile
    Wifi {
        /// Network SSID
        #[arg(long)]
        ssid: Option<String>,
        /// Network password (WPA-PSK)
        #[arg(long)]
        password: Option<String>,
    },
    /// Manual audio smoke tests
    Audio {
        #[command(subcommand)]
        test: AudioCommands,
    },
}

#[derive(Subcommand)]
pub enum AudioCommands {
    /// Record a short clip from the microphone
    Record {
        /// Output WAV file
        #[arg(long, default_value = "/tmp/pideploy-audio-test.wav")]
        output: PathBuf,
        /// Recording length in seconds
        #[arg(long, default_value_t = crate::audio::DEFAULT_RECORD_SECS)]
        seconds: u32,
    },
    /// Play a WAV file through the speaker
    Playback {
        /// WAV file to play
        #[arg(long, default_value = "/tmp/pideploy-audio-test.wav")]
        file: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }
}
