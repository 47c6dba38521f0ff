//! Append-only, timestamped status journal.
//!
//! Every provisioning and boot-launcher step appends one line of the form
//! `[YYYY-MM-DD HH:MM:SS] message` to a per-command log file. The file is
//! opened in append mode and never truncated; the application's own output
//! is streamed into the same file when the launcher runs it.

use crate::error::Result;
use chrono::Local;
use log::{info, warn};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Handle to one append-only journal file.
#[derive(Debug)]
pub struct Journal {
    path: PathBuf,
    file: File,
}

impl Journal {
    /// Open (or create) the journal at `path`, creating parent directories
    /// as needed. Existing content is preserved.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    /// Path of the underlying log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one timestamped status line.
    pub fn log(&mut self, message: &str) -> Result<()> {
        info!("{}", message);
        self.append_line(message)
    }

    /// Append one timestamped warning line.
    pub fn warn(&mut self, message: &str) -> Result<()> {
        warn!("{}", message);
        self.append_line(&format!("WARNING: {}", message))
    }

    /// Append one timestamped error line.
    pub fn error(&mut self, message: &str) -> Result<()> {
        log::error!("{}", message);
        self.append_line(&format!("ERROR: {}", message))
    }

    fn append_line(&mut self, message: &str) -> Result<()> {
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(self.file, "[{}] {}", stamp, message)?;
        self.file.flush()?;
        Ok(())
    }

    /// Writer for streaming a child process's output into the journal.
    ///
    /// Raw output lines are appended as-is, without a timestamp prefix, so
    /// the application's own log format is preserved verbatim.
    pub fn raw_writer(&mut self) -> &mut File {
        &mut self.file
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_lines_are_timestamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("start.log");

        let mut journal = Journal::open(&path).unwrap();
        journal.log("pulling latest code").unwrap();
        journal.warn("requirements.txt not found").unwrap();
        journal.error("main.py not found").unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        for line in &lines {
            // "[YYYY-MM-DD HH:MM:SS] ..." prefix
            assert!(line.starts_with('['));
            assert_eq!(&line[11..12], " ");
            assert_eq!(&line[20..22], "] ");
        }
        assert!(lines[0].ends_with("pulling latest code"));
        assert!(lines[1].contains("WARNING: requirements.txt not found"));
        assert!(lines[2].contains("ERROR: main.py not found"));
    }

    #[test]
    fn test_reopen_appends_instead_of_truncating() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("setup.log");

        {
            let mut journal = Journal::open(&path).unwrap();
            journal.log("first boot").unwrap();
        }
        {
            let mut journal = Journal::open(&path).unwrap();
            journal.log("second boot").unwrap();
        }

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.contains("first boot"));
        assert!(contents.contains("second boot"));
    }

    #[test]
    fn test_open_creates_missing_log_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/nested/start.log");
        let mut journal = Journal::open(&path).unwrap();
        journal.log("hello").unwrap();
        assert!(path.exists());
    }
}
