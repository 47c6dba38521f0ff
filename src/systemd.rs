//! Systemd unit generation and registration.
//!
//! The generated unit is plain text with a fixed section layout. Rendering
//! is a pure function of its inputs so repeated provisioning runs produce
//! byte-identical files. Registration writes the unit into the system unit
//! directory and cycles it through `daemon-reload` / `enable` / `restart`.

use crate::config::DeployConfig;
use crate::error::{DeployError, Result};
use crate::journal::Journal;
use crate::runner::{CommandRunner, CommandSpec};
use std::fs;
use std::path::Path;

/// Inputs for the unit file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitSpec {
    /// `Description=` line.
    pub description: String,
    /// Account the service runs as.
    pub user: String,
    /// `WorkingDirectory=` for the launcher.
    pub working_dir: String,
    /// Full launcher invocation, e.g. `/usr/local/bin/pideploy start`.
    pub exec_start: String,
    /// Log file both output streams are appended to.
    pub log_file: String,
}

impl UnitSpec {
    /// Build the unit inputs from the deployment configuration.
    pub fn from_config(config: &DeployConfig) -> Result<Self> {
        let launcher = config.resolve_launcher()?;
        Ok(Self {
            description: format!("{} boot launcher", config.service_name),
            user: config.user.clone(),
            working_dir: config.app_dir.display().to_string(),
            exec_start: format!("{} start", launcher.display()),
            log_file: config.start_log_path().display().to_string(),
        })
    }
}

/// Render the unit file text.
///
/// Deterministic: equal specs always produce identical bytes.
pub fn render_unit(spec: &UnitSpec) -> String {
    format!(
        "[Unit]\n\
         Description={description}\n\
         Wants=network-online.target\n\
         After=network-online.target\n\
         \n\
         [Service]\n\
         Type=simple\n\
         User={user}\n\
         WorkingDirectory={working_dir}\n\
         ExecStart={exec_start}\n\
         Restart=on-failure\n\
         RestartSec=10\n\
         StandardOutput=append:{log_file}\n\
         StandardError=append:{log_file}\n\
         \n\
         [Install]\n\
         WantedBy=multi-user.target\n",
        description = spec.description,
        user = spec.user,
        working_dir = spec.working_dir,
        exec_start = spec.exec_start,
        log_file = spec.log_file,
    )
}

/// Write the unit file into the unit directory.
pub fn write_unit(unit_path: &Path, spec: &UnitSpec) -> Result<()> {
    if let Some(parent) = unit_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(unit_path, render_unit(spec)).map_err(|e| {
        DeployError::systemd(format!("failed to write {}: {}", unit_path.display(), e))
    })
}

/// Register the service: write the unit, reload systemd, enable and restart.
///
/// Each lifecycle command is checked and fatal on failure.
pub fn register_service(
    runner: &dyn CommandRunner,
    config: &DeployConfig,
    journal: &mut Journal,
) -> Result<()> {
    let spec = UnitSpec::from_config(config)?;
    let unit_path = config.unit_path();

    journal.log(&format!("installing systemd unit {}", unit_path.display()))?;
    write_unit(&unit_path, &spec)?;

    let service = format!("{}.service", config.service_name);
    for args in [
        vec!["daemon-reload"],
        vec!["enable", service.as_str()],
        vec!["restart", service.as_str()],
    ] {
        let spec = CommandSpec::new("systemctl", &args);
        let output = runner.run(&spec)?;
        if !output.success {
            let msg = format!(
                "systemctl {} failed (exit code {}): {}",
                args.join(" "),
                output.exit_code.unwrap_or(-1),
                output.stderr.trim()
            );
            journal.error(&msg)?;
            return Err(DeployError::systemd(msg));
        }
    }

    journal.log(&format!("service {} enabled and restarted", service))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_spec() -> UnitSpec {
        UnitSpec {
            description: "desktop-ai boot launcher".to_string(),
            user: "pi".to_string(),
            working_dir: "/home/pi/desktop-ai".to_string(),
            exec_start: "/usr/local/bin/pideploy start".to_string(),
            log_file: "/home/pi/desktop-ai-logs/start.log".to_string(),
        }
    }

    #[test]
    fn test_render_has_fixed_section_layout() {
        let text = render_unit(&sample_spec());
        let unit_pos = text.find("[Unit]").unwrap();
        let service_pos = text.find("[Service]").unwrap();
        let install_pos = text.find("[Install]").unwrap();
        assert!(unit_pos < service_pos && service_pos < install_pos);

        assert!(text.contains("After=network-online.target"));
        assert!(text.contains("Restart=on-failure"));
        assert!(text.contains("WorkingDirectory=/home/pi/desktop-ai"));
        assert!(text.contains("ExecStart=/usr/local/bin/pideploy start"));
        assert!(text.contains("StandardOutput=append:/home/pi/desktop-ai-logs/start.log"));
        assert!(text.contains("WantedBy=multi-user.target"));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_render_is_byte_identical_across_runs() {
        let first = render_unit(&sample_spec());
        let second = render_unit(&sample_spec());
        assert_eq!(first.as_bytes(), second.as_bytes());
    }

    #[test]
    fn test_write_unit_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let unit_path = dir.path().join("systemd/system/desktop-ai.service");
        write_unit(&unit_path, &sample_spec()).unwrap();

        let written = fs::read_to_string(&unit_path).unwrap();
        assert_eq!(written, render_unit(&sample_spec()));
    }

    #[test]
    fn test_unit_spec_from_config_uses_launcher_override() {
        let config = DeployConfig {
            launcher_path: Some("/opt/bin/pideploy".into()),
            ..DeployConfig::default()
        };
        let spec = UnitSpec::from_config(&config).unwrap();
        assert_eq!(spec.exec_start, "/opt/bin/pideploy start");
        assert_eq!(spec.user, "pi");
        assert_eq!(spec.log_file, "/home/pi/desktop-ai-logs/start.log");
    }
}
