//! WiFi connection profile management via the NetworkManager CLI.
//!
//! Creates or updates a single WPA-PSK profile for the appliance and brings
//! it up. Also exposes the best-effort autoconnect priority bump the
//! provisioning sequence applies.

use crate::config::DeployConfig;
use crate::error::{DeployError, Result};
use crate::journal::Journal;
use crate::runner::{CommandRunner, CommandSpec};

/// Credentials for the managed wireless profile.
#[derive(Debug, Clone)]
pub struct WifiCredentials {
    pub ssid: String,
    pub password: String,
}

impl WifiCredentials {
    /// Reject empty SSID or password. Both are fatal conditions (exit 1).
    pub fn validate(&self) -> Result<()> {
        if self.ssid.trim().is_empty() {
            return Err(DeployError::validation("SSID must not be empty"));
        }
        if self.password.trim().is_empty() {
            return Err(DeployError::validation("WiFi password must not be empty"));
        }
        Ok(())
    }
}

/// Whether the managed profile already exists in NetworkManager.
fn profile_exists(runner: &dyn CommandRunner, profile: &str) -> Result<bool> {
    let output = runner.run(&CommandSpec::new(
        "nmcli",
        &["-t", "-f", "NAME", "connection", "show"],
    ))?;
    output.ensure_success("nmcli connection show")?;
    Ok(output.stdout.lines().any(|line| line == profile))
}

/// Create or update the wireless profile and bring it up.
///
/// Every nmcli invocation is checked and fatal on failure, including
/// credential validation; rejected credentials are journaled before the
/// error propagates so the setup log records why nothing was configured.
pub fn configure(
    runner: &dyn CommandRunner,
    config: &DeployConfig,
    credentials: &WifiCredentials,
    journal: &mut Journal,
) -> Result<()> {
    if let Err(e) = credentials.validate() {
        journal.error(&e.to_string())?;
        return Err(e);
    }

    let profile = config.wifi_profile.as_str();
    if profile_exists(runner, profile)? {
        journal.log(&format!("updating wifi profile {}", profile))?;
        let modify = CommandSpec::new(
            "nmcli",
            &[
                "connection",
                "modify",
                profile,
                "802-11-wireless.ssid",
                &credentials.ssid,
                "wifi-sec.key-mgmt",
                "wpa-psk",
                "wifi-sec.psk",
                &credentials.password,
            ],
        );
        runner.run(&modify)?.ensure_success("nmcli connection modify")?;
    } else {
        journal.log(&format!("creating wifi profile {}", profile))?;
        let add = CommandSpec::new(
            "nmcli",
            &[
                "connection",
                "add",
                "type",
                "wifi",
                "ifname",
                &config.wifi_interface,
                "con-name",
                profile,
                "ssid",
                &credentials.ssid,
                "wifi-sec.key-mgmt",
                "wpa-psk",
                "wifi-sec.psk",
                &credentials.password,
            ],
        );
        runner.run(&add)?.ensure_success("nmcli connection add")?;
    }

    let priority = config.wifi_priority.to_string();
    let autoconnect = CommandSpec::new(
        "nmcli",
        &[
            "connection",
            "modify",
            profile,
            "connection.autoconnect",
            "yes",
            "connection.autoconnect-priority",
            &priority,
        ],
    );
    runner
        .run(&autoconnect)?
        .ensure_success("nmcli autoconnect modify")?;

    journal.log(&format!("activating wifi profile {}", profile))?;
    let up = CommandSpec::new("nmcli", &["connection", "up", profile]);
    runner.run(&up)?.ensure_success("nmcli connection up")?;

    journal.log(&format!("wifi profile {} configured", profile))?;
    Ok(())
}

/// Bump the profile's autoconnect priority, best effort.
///
/// Provisioning calls this unconditionally; a failure (profile absent,
/// NetworkManager not running) is journaled as a warning and ignored.
pub fn set_autoconnect_priority(
    runner: &dyn CommandRunner,
    config: &DeployConfig,
    journal: &mut Journal,
) -> Result<()> {
    let priority = config.wifi_priority.to_string();
    let spec = CommandSpec::new(
        "nmcli",
        &[
            "connection",
            "modify",
            &config.wifi_profile,
            "connection.autoconnect-priority",
            &priority,
        ],
    );
    match runner.run(&spec) {
        Ok(output) if output.success => {
            journal.log(&format!(
                "autoconnect priority for {} set to {}",
                config.wifi_profile, priority
            ))?;
        }
        Ok(output) => {
            journal.warn(&format!(
                "could not set autoconnect priority for {}: {}",
                config.wifi_profile,
                output.stderr.trim()
            ))?;
        }
        Err(e) => {
            journal.warn(&format!(
                "could not set autoconnect priority for {}: {}",
                config.wifi_profile, e
            ))?;
        }
    }
    Ok(())
}
