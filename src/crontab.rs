//! Crontab fallback for auto-start registration.
//!
//! Alternative to the systemd unit on systems without it. A single
//! `@reboot` line invokes the boot launcher; insertion is guarded by an
//! exact text match against the existing table so re-running provisioning
//! never duplicates the entry.

use crate::config::DeployConfig;
use crate::error::{DeployError, Result};
use crate::journal::Journal;
use crate::runner::{CommandRunner, CommandSpec};

/// The `@reboot` line registered for the launcher.
pub fn reboot_entry(config: &DeployConfig) -> Result<String> {
    let launcher = config.resolve_launcher()?;
    Ok(format!(
        "@reboot {} start >> {} 2>&1",
        launcher.display(),
        config.start_log_path().display()
    ))
}

/// Merge `entry` into an existing crontab body, idempotently.
///
/// Returns `None` when the exact line is already present, otherwise the
/// new table text to install.
pub fn merge_entry(existing: &str, entry: &str) -> Option<String> {
    if existing.lines().any(|line| line == entry) {
        return None;
    }
    let mut table = existing.trim_end().to_string();
    if !table.is_empty() {
        table.push('\n');
    }
    table.push_str(entry);
    table.push('\n');
    Some(table)
}

/// Register the launcher's `@reboot` entry in the service user's crontab.
///
/// Provisioning runs as root, so both crontab calls carry `-u` to land the
/// entry in `config.user`'s table, the same account the systemd unit runs
/// under. Returns `true` when the entry was added, `false` when it already
/// existed. A missing crontab ("no crontab for <user>") counts as an empty
/// table; any other `crontab -l` failure is fatal.
pub fn register_reboot_entry(
    runner: &dyn CommandRunner,
    config: &DeployConfig,
    journal: &mut Journal,
) -> Result<bool> {
    let entry = reboot_entry(config)?;

    let list = runner.run(&CommandSpec::new("crontab", &["-u", &config.user, "-l"]))?;
    let existing = if list.success {
        list.stdout
    } else if list.stderr.contains("no crontab for") {
        String::new()
    } else {
        let msg = format!("crontab -l failed: {}", list.stderr.trim());
        journal.error(&msg)?;
        return Err(DeployError::crontab(msg));
    };

    let Some(table) = merge_entry(&existing, &entry) else {
        journal.log("crontab @reboot entry already present, skipping")?;
        return Ok(false);
    };

    let install =
        runner.run_with_input(&CommandSpec::new("crontab", &["-u", &config.user, "-"]), &table)?;
    if !install.success {
        let msg = format!("crontab install failed: {}", install.stderr.trim());
        journal.error(&msg)?;
        return Err(DeployError::crontab(msg));
    }

    journal.log(&format!("crontab entry added: {}", entry))?;
    Ok(true)
}
