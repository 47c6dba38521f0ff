//! Deployment configuration.
//!
//! All behavior of the tool is driven by a fixed set of paths and names that
//! default to the layout the appliance image uses. A JSON file can override
//! individual fields (`--config`), which is mainly useful for testing on a
//! machine that is not the Pi itself.

use crate::error::{DeployError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Complete configuration for provisioning and the boot launcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    // Application checkout
    /// Source checkout of the application, owned by `user`.
    pub app_dir: PathBuf,
    /// Account that owns the checkout and runs the service.
    pub user: String,
    /// Git remote to pull from.
    pub git_remote: String,
    /// Branch tracked on every boot.
    pub git_branch: String,
    /// Application entry point, relative to `app_dir`.
    pub entry_point: String,

    // Python environment
    /// Virtualenv directory, relative to `app_dir`.
    pub venv_dir: String,
    /// Dependency manifest, relative to `app_dir`.
    pub requirements: String,
    /// Interpreter used to create the virtualenv.
    pub python: String,

    // Logging
    /// Directory holding the append-only journals.
    pub log_dir: PathBuf,

    // Auto-start registration
    /// Systemd service name (without the `.service` suffix).
    pub service_name: String,
    /// Directory systemd units are installed into.
    pub unit_dir: PathBuf,
    /// Launcher binary the scheduler invokes. Defaults to the running
    /// executable when unset.
    pub launcher_path: Option<PathBuf>,

    // Network
    /// NetworkManager connection profile managed by the wifi command.
    pub wifi_profile: String,
    /// Wireless interface the profile binds to.
    pub wifi_interface: String,
    /// Autoconnect priority applied during provisioning.
    pub wifi_priority: i32,

    // Credential file
    /// Environment file written during provisioning, relative to `app_dir`.
    pub credential_file: String,
    /// Key stored in the credential file.
    pub credential_key: String,

    // Audio smoke tests
    /// ALSA capture device for the record test.
    pub capture_device: String,
    /// ALSA playback device for the playback test.
    pub playback_device: String,

    /// OS packages installed during provisioning.
    pub os_packages: Vec<String>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            app_dir: PathBuf::from("/home/pi/desktop-ai"),
            user: "pi".to_string(),
            git_remote: "origin".to_string(),
            git_branch: "main".to_string(),
            entry_point: "main.py".to_string(),
            venv_dir: "venv".to_string(),
            requirements: "requirements.txt".to_string(),
            python: "python3".to_string(),
            log_dir: PathBuf::from("/home/pi/desktop-ai-logs"),
            service_name: "desktop-ai".to_string(),
            unit_dir: PathBuf::from("/etc/systemd/system"),
            launcher_path: None,
            wifi_profile: "desktop-ai-wifi".to_string(),
            wifi_interface: "wlan0".to_string(),
            wifi_priority: 10,
            credential_file: ".env".to_string(),
            credential_key: "OPENAI_API_KEY".to_string(),
            capture_device: "plughw:1,0".to_string(),
            playback_device: "plughw:0,0".to_string(),
            os_packages: vec![
                "vim".to_string(),
                "python3".to_string(),
                "python3-venv".to_string(),
                "python3-pip".to_string(),
                "libasound2-dev".to_string(),
                "portaudio19-dev".to_string(),
            ],
        }
    }
}

impl DeployConfig {
    /// Load configuration from a JSON file and validate it.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            DeployError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config: DeployConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<()> {
        if !self.app_dir.is_absolute() {
            return Err(DeployError::config("app_dir must be an absolute path"));
        }
        if !self.log_dir.is_absolute() {
            return Err(DeployError::config("log_dir must be an absolute path"));
        }
        if !self.unit_dir.is_absolute() {
            return Err(DeployError::config("unit_dir must be an absolute path"));
        }
        if self.user.trim().is_empty() {
            return Err(DeployError::config("user must not be empty"));
        }
        if self.service_name.trim().is_empty() {
            return Err(DeployError::config("service_name must not be empty"));
        }
        if self.wifi_profile.trim().is_empty() {
            return Err(DeployError::config("wifi_profile must not be empty"));
        }
        if self.os_packages.is_empty() {
            return Err(DeployError::config("os_packages must not be empty"));
        }
        Ok(())
    }

    /// Virtualenv directory as an absolute path.
    pub fn venv_path(&self) -> PathBuf {
        self.app_dir.join(&self.venv_dir)
    }

    /// Dependency manifest as an absolute path.
    pub fn requirements_path(&self) -> PathBuf {
        self.app_dir.join(&self.requirements)
    }

    /// Entry point as an absolute path.
    pub fn entry_point_path(&self) -> PathBuf {
        self.app_dir.join(&self.entry_point)
    }

    /// Credential file as an absolute path.
    pub fn credential_path(&self) -> PathBuf {
        self.app_dir.join(&self.credential_file)
    }

    /// Journal written by the boot launcher.
    pub fn start_log_path(&self) -> PathBuf {
        self.log_dir.join("start.log")
    }

    /// Journal written by the provisioning command.
    pub fn setup_log_path(&self) -> PathBuf {
        self.log_dir.join("setup.log")
    }

    /// Installed path of the generated systemd unit.
    pub fn unit_path(&self) -> PathBuf {
        self.unit_dir.join(format!("{}.service", self.service_name))
    }

    /// Launcher binary the auto-start mechanism should invoke.
    ///
    /// Falls back to the currently running executable when no override is
    /// configured.
    pub fn resolve_launcher(&self) -> Result<PathBuf> {
        match &self.launcher_path {
            Some(path) => Ok(path.clone()),
            None => std::env::current_exe().map_err(|e| {
                DeployError::config(format!("cannot resolve launcher executable: {}", e))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = DeployConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.venv_path(), PathBuf::from("/home/pi/desktop-ai/venv"));
        assert_eq!(
            config.unit_path(),
            PathBuf::from("/etc/systemd/system/desktop-ai.service")
        );
        assert_eq!(
            config.start_log_path(),
            PathBuf::from("/home/pi/desktop-ai-logs/start.log")
        );
    }

    #[test]
    fn test_relative_app_dir_rejected() {
        let config = DeployConfig {
            app_dir: PathBuf::from("desktop-ai"),
            ..DeployConfig::default()
        };
        assert!(matches!(config.validate(), Err(DeployError::Config(_))));
    }

    #[test]
    fn test_empty_service_name_rejected() {
        let config = DeployConfig {
            service_name: "  ".to_string(),
            ..DeployConfig::default()
        };
        assert!(matches!(config.validate(), Err(DeployError::Config(_))));
    }

    #[test]
    fn test_load_from_file_partial_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"app_dir": "/opt/desktop-ai", "git_branch": "develop"}}"#
        )
        .unwrap();

        let config = DeployConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.app_dir, PathBuf::from("/opt/desktop-ai"));
        assert_eq!(config.git_branch, "develop");
        // Untouched fields keep their defaults
        assert_eq!(config.user, "pi");
        assert_eq!(config.service_name, "desktop-ai");
    }

    #[test]
    fn test_load_from_file_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not json").unwrap();
        assert!(DeployConfig::load_from_file(file.path()).is_err());
    }

    #[test]
    fn test_resolve_launcher_override() {
        let config = DeployConfig {
            launcher_path: Some(PathBuf::from("/usr/local/bin/pideploy")),
            ..DeployConfig::default()
        };
        assert_eq!(
            config.resolve_launcher().unwrap(),
            PathBuf::from("/usr/local/bin/pideploy")
        );
    }
}
