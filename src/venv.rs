//! Python virtualenv management.
//!
//! The application runs out of an isolated interpreter directory inside the
//! checkout. This module creates it on demand and installs the pinned
//! dependency manifest with the environment's own pip. "Activation" is
//! expressed by invoking `<venv>/bin/...` directly and handing child
//! processes the same environment a shell-level `source bin/activate`
//! would produce.

use crate::config::DeployConfig;
use crate::error::{DeployError, Result};
use crate::journal::Journal;
use crate::runner::{CommandRunner, CommandSpec};
use std::path::{Path, PathBuf};

/// Python interpreter inside the virtualenv.
pub fn venv_python(venv_dir: &Path) -> PathBuf {
    venv_dir.join("bin/python")
}

/// Pip inside the virtualenv.
pub fn venv_pip(venv_dir: &Path) -> PathBuf {
    venv_dir.join("bin/pip")
}

/// Environment variables equivalent to activating the virtualenv.
pub fn activation_env(venv_dir: &Path) -> Vec<(String, String)> {
    let bin_dir = venv_dir.join("bin");
    let path = match std::env::var("PATH") {
        Ok(existing) => format!("{}:{}", bin_dir.display(), existing),
        Err(_) => bin_dir.display().to_string(),
    };
    vec![
        ("VIRTUAL_ENV".to_string(), venv_dir.display().to_string()),
        ("PATH".to_string(), path),
    ]
}

/// Create the virtualenv if it does not exist yet.
///
/// Returns `true` when a new environment was created, `false` when an
/// existing one is reused. Creation failure is fatal.
pub fn ensure_venv(
    runner: &dyn CommandRunner,
    config: &DeployConfig,
    journal: &mut Journal,
) -> Result<bool> {
    let venv = config.venv_path();
    if venv.is_dir() {
        journal.log(&format!("virtualenv {} already exists, reusing", venv.display()))?;
        return Ok(false);
    }

    journal.log(&format!("creating virtualenv at {}", venv.display()))?;
    let spec = CommandSpec::new(
        config.python.clone(),
        &["-m", "venv", &venv.display().to_string()],
    );
    let output = runner.run(&spec)?;
    if !output.success {
        let msg = format!(
            "virtualenv creation failed (exit code {}): {}",
            output.exit_code.unwrap_or(-1),
            output.stderr.trim()
        );
        journal.error(&msg)?;
        return Err(DeployError::venv(msg));
    }
    journal.log("virtualenv created")?;
    Ok(true)
}

/// Install the pinned dependency manifest with the virtualenv's pip.
///
/// A missing manifest is a warning, not an error: the launcher proceeds
/// without installing anything. A failing install is fatal.
pub fn install_requirements(
    runner: &dyn CommandRunner,
    config: &DeployConfig,
    journal: &mut Journal,
) -> Result<()> {
    let manifest = config.requirements_path();
    if !manifest.is_file() {
        journal.warn(&format!(
            "{} not found, skipping dependency install",
            manifest.display()
        ))?;
        return Ok(());
    }

    let venv = config.venv_path();
    let pip = venv_pip(&venv).display().to_string();
    let envs = activation_env(&venv);

    journal.log("upgrading pip")?;
    let upgrade = CommandSpec::new(pip.clone(), &["install", "--upgrade", "pip"]).with_envs(&envs);
    let output = runner.run(&upgrade)?;
    if !output.success {
        let msg = format!("pip upgrade failed: {}", output.stderr.trim());
        journal.error(&msg)?;
        return Err(DeployError::dependency(msg));
    }

    journal.log(&format!("installing dependencies from {}", manifest.display()))?;
    let install = CommandSpec::new(pip, &["install", "-r", &manifest.display().to_string()])
        .with_envs(&envs);
    let output = runner.run(&install)?;
    if !output.success {
        let msg = format!("dependency install failed: {}", output.stderr.trim());
        journal.error(&msg)?;
        return Err(DeployError::dependency(msg));
    }

    journal.log("dependencies installed")?;
    Ok(())
}
