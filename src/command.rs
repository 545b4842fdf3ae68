use crate::config::resolve_in;
use crate::error::SeqDbError;
use std::{
    io::ErrorKind,
    path::PathBuf,
    process::{Command, Output},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub command: String,
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Turns a non-zero exit into [`SeqDbError::CommandFailed`].
    pub fn into_result(self, action: &str) -> Result<Self, SeqDbError> {
        if self.success() {
            return Ok(self);
        }
        Err(SeqDbError::CommandFailed {
            action: action.to_string(),
            command: self.command,
            status: self.status,
            stdout: self.stdout,
            stderr: self.stderr,
        })
    }
}

pub trait CommandRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<ToolOutput, SeqDbError>;
}

/// Quotes arguments containing whitespace so the printed command line can be
/// pasted back into a shell.
pub fn render_command_line(executable: &str, args: &[String]) -> String {
    std::iter::once(executable)
        .chain(args.iter().map(String::as_str))
        .map(|part| {
            if part.is_empty() || part.chars().any(|c| c.is_whitespace() || c == '\'') {
                format!("'{}'", part.replace('\'', r"'\''"))
            } else {
                part.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Spawns real processes, resolving program names against an optional binary
/// directory.
#[derive(Debug, Clone, Default)]
pub struct SystemCommandRunner {
    bin_dir: Option<PathBuf>,
}

impl SystemCommandRunner {
    pub fn new(bin_dir: Option<PathBuf>) -> Self {
        Self { bin_dir }
    }

    fn spawn(&self, executable: &str, args: &[String]) -> Result<Output, SeqDbError> {
        Command::new(executable).args(args).output().map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                SeqDbError::ToolNotFound {
                    executable: executable.to_string(),
                }
            } else {
                SeqDbError::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Could not run '{}': {e}",
                        render_command_line(executable, args)
                    ),
                ))
            }
        })
    }
}

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<ToolOutput, SeqDbError> {
        let executable = resolve_in(self.bin_dir.as_deref(), program);
        let command = render_command_line(&executable, args);
        log::info!("running {command}");
        let output = self.spawn(&executable, args)?;
        let result = ToolOutput {
            command,
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };
        log::debug!("{} exited with {:?}", result.command, result.status);
        Ok(result)
    }
}
