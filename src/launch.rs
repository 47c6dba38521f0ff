//! Boot launcher sequence.
//!
//! Runs once per boot, invoked by the registered scheduler: refresh the
//! checkout, make sure the virtualenv and dependencies are in place, then
//! run the application with its output streamed into the journal. Every
//! decision is re-derived from the filesystem at start; nothing is cached
//! between boots. Retries are the supervisor's job, not ours.

use crate::config::DeployConfig;
use crate::error::{DeployError, Result};
use crate::journal::Journal;
use crate::runner::{CommandRunner, CommandSpec};
use crate::venv;

/// Run the full boot launcher sequence.
pub fn launch(
    runner: &dyn CommandRunner,
    config: &DeployConfig,
    journal: &mut Journal,
) -> Result<()> {
    journal.log("boot launcher starting")?;

    // 1. The checkout must exist before anything else happens.
    let git_dir = config.app_dir.join(".git");
    if !git_dir.is_dir() {
        let msg = format!(
            "source checkout not found at {} (missing .git)",
            config.app_dir.display()
        );
        journal.error(&msg)?;
        return Err(DeployError::checkout(msg));
    }

    // 2. Pull the tracked branch. A failed pull aborts the boot; the entry
    //    point must not run against a half-updated tree.
    journal.log(&format!(
        "pulling {} {} in {}",
        config.git_remote,
        config.git_branch,
        config.app_dir.display()
    ))?;
    let pull = CommandSpec::new("git", &["pull", &config.git_remote, &config.git_branch])
        .with_cwd(&config.app_dir);
    let output = runner.run(&pull)?;
    if !output.success {
        let msg = format!(
            "git pull failed (exit code {}): {}",
            output.exit_code.unwrap_or(-1),
            output.stderr.trim()
        );
        journal.error(&msg)?;
        return Err(DeployError::git(msg));
    }
    journal.log("pull complete")?;

    // 3. Virtualenv: created once, reused on later boots.
    venv::ensure_venv(runner, config, journal)?;

    // 4-5. Install the pinned manifest with the environment's own tooling.
    //      A missing manifest is only a warning.
    venv::install_requirements(runner, config, journal)?;

    // 6. Run the application, streaming combined output into the journal.
    let entry = config.entry_point_path();
    if !entry.is_file() {
        let msg = format!("entry point {} not found", entry.display());
        journal.error(&msg)?;
        return Err(DeployError::entry_point(msg));
    }

    journal.log(&format!("starting application {}", entry.display()))?;
    let venv_dir = config.venv_path();
    let python = venv::venv_python(&venv_dir).display().to_string();
    let run = CommandSpec::new(python, &[&entry.display().to_string()])
        .with_cwd(&config.app_dir)
        .with_envs(&venv::activation_env(&venv_dir));
    let output = runner.run_streamed(&run, journal.raw_writer())?;

    // The application's exit status is recorded but never acted on. The
    // original launcher behaved this way across all revisions; restarts
    // are the supervisor's restart policy, applied to this whole sequence.
    journal.log(&format!(
        "application exited (status {})",
        output
            .exit_code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".to_string())
    ))?;

    Ok(())
}
