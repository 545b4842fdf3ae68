use crate::error::SeqDbError;
use crate::molecule_type::RequiredExtensions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DATABASE_DIR_ENV: &str = "SEQDB_DATABASE_DIR";
pub const BIN_DIR_ENV: &str = "SEQDB_BIN_DIR";
pub const DEFAULT_SAMPLE_BYTES: usize = 1_048_576;

const DEFAULT_LIST_PROGRAM: &str = "blastdbcmd";
const DEFAULT_BUILD_PROGRAM: &str = "makeblastdb";
const DEFAULT_EXTRACT_PROGRAM: &str = "blastdbcmd";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database_dir: PathBuf,
    /// Directory holding the BLAST+ binaries. `None` means PATH lookup.
    pub bin_dir: Option<PathBuf>,
    pub list_program: String,
    pub build_program: String,
    pub extract_program: String,
    pub required_extensions: RequiredExtensions,
    pub sample_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_dir: PathBuf::from("."),
            bin_dir: None,
            list_program: DEFAULT_LIST_PROGRAM.to_string(),
            build_program: DEFAULT_BUILD_PROGRAM.to_string(),
            extract_program: DEFAULT_EXTRACT_PROGRAM.to_string(),
            required_extensions: RequiredExtensions::default(),
            sample_bytes: DEFAULT_SAMPLE_BYTES,
        }
    }
}

fn normalized_non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Resolves a program name against an optional binary directory. Absolute
/// program paths are used as given.
pub fn resolve_in(bin_dir: Option<&Path>, program: &str) -> String {
    match bin_dir {
        Some(dir) if !Path::new(program).is_absolute() => {
            dir.join(program).to_string_lossy().to_string()
        }
        _ => program.to_string(),
    }
}

impl Config {
    pub fn from_json_file(path: &str) -> Result<Self, SeqDbError> {
        let text = fs::read_to_string(path).map_err(|e| {
            SeqDbError::Config(format!("Could not read config file '{path}': {e}"))
        })?;
        Self::from_json_str(&text)
            .map_err(|e| SeqDbError::Config(format!("Could not parse config file '{path}': {e}")))
    }

    pub fn from_json_str(text: &str) -> Result<Self, SeqDbError> {
        let config: Config = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `SEQDB_DATABASE_DIR` and `SEQDB_BIN_DIR` from `lookup`; blank
    /// values leave the current setting alone.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(DATABASE_DIR_ENV).and_then(|v| normalized_non_empty(&v)) {
            self.database_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(BIN_DIR_ENV).and_then(|v| normalized_non_empty(&v)) {
            self.bin_dir = Some(PathBuf::from(dir));
        }
    }

    pub fn apply_process_env(&mut self) {
        self.apply_env(|name| std::env::var(name).ok());
    }

    pub fn validate(&self) -> Result<(), SeqDbError> {
        if self.sample_bytes == 0 {
            return Err(SeqDbError::Config(
                "sample_bytes must be greater than zero".to_string(),
            ));
        }
        for (key, program) in [
            ("list_program", &self.list_program),
            ("build_program", &self.build_program),
            ("extract_program", &self.extract_program),
        ] {
            if program.trim().is_empty() {
                return Err(SeqDbError::Config(format!("{key} is empty")));
            }
        }
        self.required_extensions.validate()
    }

    pub fn resolve_executable(&self, program: &str) -> String {
        resolve_in(self.bin_dir.as_deref(), program)
    }

    pub fn active_resolution_label(&self, program: &str) -> String {
        match &self.bin_dir {
            Some(_) => self.resolve_executable(program),
            None => format!("PATH lookup: {program}"),
        }
    }
}
