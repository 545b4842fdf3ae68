use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum SeqDbError {
    /// The listing command could not be run or exited non-zero. Nothing can be
    /// decided without it.
    ListingUnavailable {
        command: String,
        reason: String,
    },
    ToolNotFound {
        executable: String,
    },
    CommandFailed {
        action: String,
        command: String,
        status: Option<i32>,
        stdout: String,
        stderr: String,
    },
    Config(String),
    Prompt(String),
    Io(std::io::Error),
    Json(serde_json::Error),
    Walk(walkdir::Error),
}

impl Error for SeqDbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Walk(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for SeqDbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ListingUnavailable { command, reason } => write!(
                f,
                "Could not list indexed databases: {reason}\nTried: {command}"
            ),
            Self::ToolNotFound { executable } => write!(
                f,
                "Could not find executable '{executable}'. Install BLAST+ or set the binary directory"
            ),
            Self::CommandFailed {
                action,
                command,
                status,
                stdout,
                stderr,
            } => write!(
                f,
                "Could not {action} (exit status {}).\nTried: {command}\nstdout:\n{}\nstderr:\n{}",
                status.map_or_else(|| "unknown".to_string(), |code| code.to_string()),
                stdout.trim_end(),
                stderr.trim_end()
            ),
            Self::Config(message) => write!(f, "Configuration error: {message}"),
            Self::Prompt(message) => write!(f, "Operator input ended: {message}"),
            Self::Io(e) => write!(f, "{e}"),
            Self::Json(e) => write!(f, "{e}"),
            Self::Walk(e) => write!(f, "{e}"),
        }
    }
}

impl From<std::io::Error> for SeqDbError {
    fn from(err: std::io::Error) -> Self {
        SeqDbError::Io(err)
    }
}

impl From<serde_json::Error> for SeqDbError {
    fn from(err: serde_json::Error) -> Self {
        SeqDbError::Json(err)
    }
}

impl From<walkdir::Error> for SeqDbError {
    fn from(err: walkdir::Error) -> Self {
        SeqDbError::Walk(err)
    }
}
