//! Balance source backed by an external report command

use std::path::PathBuf;
use std::process::Command;

use crate::config::ReconcileConfig;
use crate::traits::*;
use crate::types::*;
use crate::utils::validate_command;

/// Runs a program such as `ledger balance --flat --no-total` and returns its output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSource {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
}

impl CommandSource {
    /// Create a source from a program and its arguments
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            current_dir: None,
        }
    }

    /// Create a source from a full argv, program first
    pub fn from_argv(argv: &[String]) -> ReconcileResult<Self> {
        validate_command(argv)?;
        Ok(Self::new(argv[0].clone(), argv[1..].to_vec()))
    }

    pub fn from_config(config: &ReconcileConfig) -> ReconcileResult<Self> {
        Self::from_argv(&config.command)
    }

    /// Run the command in `dir` instead of the current directory
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }
}

impl BalanceSource for CommandSource {
    fn fetch(&self) -> ReconcileResult<String> {
        tracing::debug!(program = %self.program, args = ?self.args, "Running balance report command");

        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }
        let output = command.output()?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        // Anything on stderr means the report cannot be trusted, even on exit 0
        if !output.status.success() || !output.stderr.is_empty() {
            return Err(ReconcileError::Process {
                status: output.status.code(),
                stdout,
                stderr,
            });
        }

        Ok(stdout)
    }
}
