//! Provisioning sequence.
//!
//! Brings a fresh machine to a runnable state: OS packages, virtualenv,
//! auto-start registration, WiFi priority, and two optional interactive
//! steps (WiFi setup, credential file). Run once, manually, with root
//! privileges. There is no rollback; a fatal step leaves earlier side
//! effects in place for the next manual run.

use crate::config::DeployConfig;
use crate::crontab;
use crate::error::{DeployError, Result};
use crate::journal::Journal;
use crate::prompt::Prompt;
use crate::runner::{CommandRunner, CommandSpec};
use crate::systemd;
use crate::venv;
use crate::wifi::{self, WifiCredentials};
use clap::ValueEnum;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

/// Auto-start mechanism to register.
///
/// The two mechanisms are alternatives, never combined; the choice is an
/// explicit flag with systemd as the declared default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Scheduler {
    /// Generate and enable a systemd unit.
    #[default]
    Systemd,
    /// Add an idempotent `@reboot` crontab entry.
    Crontab,
}

/// Run the full provisioning sequence.
pub fn provision(
    runner: &dyn CommandRunner,
    config: &DeployConfig,
    prompt: &mut dyn Prompt,
    journal: &mut Journal,
    scheduler: Scheduler,
) -> Result<()> {
    journal.log("provisioning starting")?;

    // 1. OS packages. Checked: a failed install aborts provisioning.
    install_os_packages(runner, config, journal)?;

    // 2. Virtualenv plus pinned dependencies.
    venv::ensure_venv(runner, config, journal)?;
    venv::install_requirements(runner, config, journal)?;

    // 3. The launcher the scheduler will invoke must exist and be
    //    executable. Checked, fatal.
    let launcher = config.resolve_launcher()?;
    verify_launcher(&launcher, journal)?;

    // 4. Auto-start registration.
    match scheduler {
        Scheduler::Systemd => systemd::register_service(runner, config, journal)?,
        Scheduler::Crontab => {
            crontab::register_reboot_entry(runner, config, journal)?;
        }
    }

    // Ownership of the provisioned directories. Side effect, not gated.
    fix_ownership(runner, config, journal)?;

    // 5. WiFi autoconnect priority, best effort.
    wifi::set_autoconnect_priority(runner, config, journal)?;

    // 6. Optional WiFi setup.
    if prompt.confirm("Configure WiFi now?")? {
        let ssid = prompt.read_line("SSID")?;
        let password = prompt.read_line("Password")?;
        wifi::configure(runner, config, &WifiCredentials { ssid, password }, journal)?;
    } else {
        journal.log("wifi setup skipped")?;
    }

    // 7. Optional credential file.
    prompt_credential_file(config, prompt, journal)?;

    journal.log("provisioning complete")?;
    Ok(())
}

fn install_os_packages(
    runner: &dyn CommandRunner,
    config: &DeployConfig,
    journal: &mut Journal,
) -> Result<()> {
    journal.log(&format!("installing OS packages: {}", config.os_packages.join(" ")))?;
    let mut args: Vec<&str> = vec!["install", "-y"];
    args.extend(config.os_packages.iter().map(|s| s.as_str()));
    let output = runner.run(&CommandSpec::new("apt-get", &args))?;
    if !output.success {
        let msg = format!(
            "apt-get install failed (exit code {}): {}",
            output.exit_code.unwrap_or(-1),
            output.stderr.trim()
        );
        journal.error(&msg)?;
        return Err(DeployError::command(msg));
    }
    journal.log("OS packages installed")?;
    Ok(())
}

fn verify_launcher(launcher: &Path, journal: &mut Journal) -> Result<()> {
    let metadata = fs::metadata(launcher).map_err(|e| {
        DeployError::validation(format!(
            "launcher {} is not accessible: {}",
            launcher.display(),
            e
        ))
    })?;
    if metadata.permissions().mode() & 0o111 == 0 {
        let msg = format!("launcher {} is not executable", launcher.display());
        journal.error(&msg)?;
        return Err(DeployError::validation(msg));
    }
    journal.log(&format!("boot launcher verified at {}", launcher.display()))?;
    Ok(())
}

fn fix_ownership(
    runner: &dyn CommandRunner,
    config: &DeployConfig,
    journal: &mut Journal,
) -> Result<()> {
    let owner = format!("{}:{}", config.user, config.user);
    for dir in [&config.app_dir, &config.log_dir] {
        let spec = CommandSpec::new(
            "chown",
            &["-R", &owner, &dir.display().to_string()],
        );
        match runner.run(&spec) {
            Ok(output) if output.success => {
                journal.log(&format!("ownership of {} set to {}", dir.display(), owner))?;
            }
            Ok(output) => {
                journal.warn(&format!(
                    "chown {} failed: {}",
                    dir.display(),
                    output.stderr.trim()
                ))?;
            }
            Err(e) => {
                journal.warn(&format!("chown {} failed: {}", dir.display(), e))?;
            }
        }
    }
    Ok(())
}

fn prompt_credential_file(
    config: &DeployConfig,
    prompt: &mut dyn Prompt,
    journal: &mut Journal,
) -> Result<()> {
    let path = config.credential_path();
    let question = if path.exists() {
        format!("Overwrite credential file {}?", path.display())
    } else {
        format!("Create credential file {}?", path.display())
    };

    if !prompt.confirm(&question)? {
        journal.log("credential file skipped")?;
        return Ok(());
    }

    let value = prompt.read_line(&config.credential_key)?;
    if value.trim().is_empty() {
        journal.warn("empty credential value, not writing credential file")?;
        return Ok(());
    }
    write_credential_file(&path, &config.credential_key, value.trim())?;
    journal.log(&format!("credential file written to {}", path.display()))?;
    Ok(())
}

/// Write the single-line `KEY=VALUE` credential file.
pub fn write_credential_file(path: &Path, key: &str, value: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, format!("{}={}\n", key, value))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_file_is_single_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        write_credential_file(&path, "OPENAI_API_KEY", "sk-test-123").unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "OPENAI_API_KEY=sk-test-123\n");
        assert_eq!(contents.lines().count(), 1);
    }

    #[test]
    fn test_credential_file_overwrites_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        write_credential_file(&path, "OPENAI_API_KEY", "old").unwrap();
        write_credential_file(&path, "OPENAI_API_KEY", "new").unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "OPENAI_API_KEY=new\n");
    }

    #[test]
    fn test_scheduler_default_is_systemd() {
        assert_eq!(Scheduler::default(), Scheduler::Systemd);
    }
}
