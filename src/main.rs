//! pideploy - Main entry point
//!
//! One subcommand per operational task: provision the machine, run the
//! boot launcher, manage the WiFi profile, run the audio smoke tests.

use anyhow::Context;
use log::{error, info};
use pideploy::cli::{AudioCommands, Cli, Commands};
use pideploy::{audio, launch, provision, wifi};
use pideploy::{DeployConfig, Journal, SystemRunner, TerminalPrompt, WifiCredentials};

/// Initialize the logger with appropriate settings
fn init_logger() {
    use env_logger::Builder;
    use std::io::Write;

    Builder::from_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}:{}] {}",
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .filter_level(log::LevelFilter::Info)
        .parse_default_env() // Allows RUST_LOG env var to override
        .init();
}

/// Main application entry point
fn main() {
    init_logger();

    let cli = Cli::parse_args();

    let config = match &cli.config {
        Some(path) => DeployConfig::load_from_file(path),
        None => {
            let config = DeployConfig::default();
            config.validate().map(|_| config)
        }
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            eprintln!("pideploy: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&cli, &config) {
        error!("{:#}", e);
        eprintln!("pideploy: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli, config: &DeployConfig) -> anyhow::Result<()> {
    let runner = SystemRunner;

    match &cli.command {
        Commands::Setup { scheduler } => {
            info!("provisioning with {:?} scheduler", scheduler);
            let mut journal = Journal::open(&config.setup_log_path())?;
            let mut prompt = TerminalPrompt;
            provision::provision(&runner, config, &mut prompt, &mut journal, *scheduler)
                .context("provisioning failed")
        }
        Commands::Start => {
            let mut journal = Journal::open(&config.start_log_path())?;
            launch::launch(&runner, config, &mut journal).context("boot launcher failed")
        }
        Commands::Wifi { ssid, password } => {
            let credentials = WifiCredentials {
                ssid: ssid.clone().unwrap_or_default(),
                password: password.clone().unwrap_or_default(),
            };
            // Journal opens before validation so a rejected flag set still
            // leaves a trace in the setup log
            let mut journal = Journal::open(&config.setup_log_path())?;
            wifi::configure(&runner, config, &credentials, &mut journal)
                .context("wifi setup failed")
        }
        Commands::Audio { test } => match test {
            AudioCommands::Record { output, seconds } => {
                audio::record_test(&runner, config, output, *seconds)
                    .context("audio record test failed")
            }
            AudioCommands::Playback { file } => {
                audio::playback_test(&runner, config, file).context("audio playback test failed")
            }
        },
    }
}
