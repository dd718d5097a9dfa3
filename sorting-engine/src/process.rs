//! External command execution.

use std::io;
use std::process::Command;

/// Exit status of a finished command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStatus {
    pub success: bool,
    /// Exit code, if the process exited normally.
    pub code: Option<i32>,
}

impl RunStatus {
    pub fn from_code(code: i32) -> Self {
        Self {
            success: code == 0,
            code: Some(code),
        }
    }
}

/// Runs a fully rendered argv and waits for it to finish.
pub trait ProcessRunner {
    /// `Err` means the process could not be started at all.
    fn run(&self, argv: &[String]) -> io::Result<RunStatus>;
}

/// Spawns real processes with inherited stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, argv: &[String]) -> io::Result<RunStatus> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command"))?;
        tracing::debug!(program = %program, ?args, "spawning conversion");
        let status = Command::new(program).args(args).status()?;
        Ok(RunStatus {
            success: status.success(),
            code: status.code(),
        })
    }
}
