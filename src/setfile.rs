//! Setting a file's creation date through macOS's `SetFile` utility.
//!
//! `SetFile -d "MM/DD/YYYY HH:MM:SS" <path>` rewrites the creation date
//! attribute; it ships with the Xcode command line tools. Only the exit status
//! is interpreted.

use anyhow::{bail, Result};
use chrono::NaiveDateTime;
use std::io;
use std::path::Path;
use std::process::Command;

/// Date layout expected by `SetFile -d`.
pub const SETFILE_DATE_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// Exit information of an external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// The process exited with status zero.
    pub success: bool,
    pub stderr: String,
}

/// Runs external commands.
///
/// [`SystemRunner`] spawns real processes; tests substitute a recorder.
pub trait CommandRunner {
    /// Run `program` with `args` to completion.
    ///
    /// An `Err` means the process could not be spawned at all (for example
    /// the program is not installed).
    fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput>;
}

/// Spawns processes with [`std::process::Command`], blocking until they exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput> {
        let output = Command::new(program).args(args).output()?;
        Ok(CommandOutput {
            success: output.status.success(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Format a date the way `SetFile -d` expects it (`MM/DD/YYYY HH:MM:SS`).
pub fn format_setfile_date(date: NaiveDateTime) -> String {
    date.format(SETFILE_DATE_FORMAT).to_string()
}

/// The creation-date invoker.
#[derive(Debug, Clone)]
pub struct SetFile<R = SystemRunner> {
    program: String,
    runner: R,
}

impl SetFile<SystemRunner> {
    /// Invoke `program` (normally `"SetFile"`) as a real process.
    pub fn new(program: impl Into<String>) -> Self {
        Self::with_runner(program, SystemRunner)
    }
}

impl<R: CommandRunner> SetFile<R> {
    pub fn with_runner(program: impl Into<String>, runner: R) -> Self {
        Self {
            program: program.into(),
            runner,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Probe the utility with `-h`. Missing binary or non-zero exit means unavailable.
    pub fn is_available(&self) -> bool {
        match self.runner.run(&self.program, &["-h".to_string()]) {
            Ok(output) => output.success,
            Err(e) => {
                log::debug!("{} probe failed: {e}", self.program);
                false
            }
        }
    }

    /// Set the creation date of `path` to `date`.
    ///
    /// Returns `true` only if the command exited with status zero. Failures
    /// are logged, never propagated.
    pub fn update_creation_date(&self, path: &Path, date: NaiveDateTime) -> bool {
        let date_str = format_setfile_date(date);
        let args = [
            "-d".to_string(),
            date_str.clone(),
            path.to_string_lossy().into_owned(),
        ];

        match self.runner.run(&self.program, &args) {
            Ok(output) if output.success => {
                log::info!("Updated creation date for {} to {date_str}", path.display());
                true
            }
            Ok(output) => {
                log::error!("Failed to update {}: {}", path.display(), output.stderr);
                false
            }
            Err(e) => {
                log::error!("Error updating creation date for {}: {e}", path.display());
                false
            }
        }
    }
}

/// Fail unless running on macOS, the only OS that ships `SetFile`.
pub fn ensure_supported_platform() -> Result<()> {
    if !cfg!(target_os = "macos") {
        bail!("This tool is designed for macOS only");
    }
    Ok(())
}

/// Fail unless `setter` answers its `-h` probe.
pub fn ensure_available<R: CommandRunner>(setter: &SetFile<R>) -> Result<()> {
    if !setter.is_available() {
        bail!(
            "{} command not found. This tool requires macOS with the Xcode command line tools.",
            setter.program()
        );
    }
    Ok(())
}

/// Checks run before the updater touches any file. An `Err` means exit status 1.
///
/// The platform is checked first, so the probe never runs off macOS.
pub fn preflight<R: CommandRunner>(setter: &SetFile<R>) -> Result<()> {
    ensure_supported_platform()?;
    ensure_available(setter)
}
