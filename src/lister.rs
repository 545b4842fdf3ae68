use crate::command::{CommandRunner, render_command_line};
use crate::error::SeqDbError;
use crate::molecule_type::MoleculeType;
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// `blastdbcmd -list_outfmt` spec for path, title and molecule type.
pub const LIST_FORMAT: &str = "%f\t%t\t%p";

static MULTIPART_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r".+/\S+\.\d{2,3}$").expect("multipart pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexedRecord {
    pub path: PathBuf,
    pub title: String,
    pub molecule_type: MoleculeType,
}

/// Default multipart predicate: a volume of a split database such as
/// `/db/nt.00` or `/db/nr.123`.
pub fn is_multipart_database_name(path: &str) -> bool {
    MULTIPART_NAME.is_match(path)
}

pub struct IndexedFileLister<'a> {
    runner: &'a dyn CommandRunner,
    program: String,
    is_multipart: Box<dyn Fn(&str) -> bool + 'a>,
}

impl<'a> IndexedFileLister<'a> {
    pub fn new(runner: &'a dyn CommandRunner, program: &str) -> Self {
        Self {
            runner,
            program: program.to_string(),
            is_multipart: Box::new(is_multipart_database_name),
        }
    }

    pub fn with_multipart_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + 'a,
    {
        self.is_multipart = Box::new(predicate);
        self
    }

    pub fn list(&self, directory: &Path) -> Result<Vec<IndexedRecord>, SeqDbError> {
        let args = vec![
            "-recursive".to_string(),
            "-list".to_string(),
            directory.to_string_lossy().to_string(),
            "-list_outfmt".to_string(),
            LIST_FORMAT.to_string(),
        ];
        let output = self.runner.run(&self.program, &args).map_err(|e| {
            SeqDbError::ListingUnavailable {
                command: render_command_line(&self.program, &args),
                reason: e.to_string(),
            }
        })?;
        if !output.success() {
            return Err(SeqDbError::ListingUnavailable {
                reason: format!(
                    "exit status {:?}: {}",
                    output.status,
                    output.stderr.trim()
                ),
                command: output.command,
            });
        }
        Ok(self.parse(&output.stdout))
    }

    fn parse(&self, stdout: &str) -> Vec<IndexedRecord> {
        stdout
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| {
                let record = parse_line(line)?;
                if (self.is_multipart)(&record.path.to_string_lossy()) {
                    log::debug!("ignoring multipart database {}", record.path.display());
                    return None;
                }
                Some(record)
            })
            .collect()
    }
}

fn parse_line(line: &str) -> Option<IndexedRecord> {
    let mut fields = line.split('\t');
    let (Some(path), Some(title), Some(raw_type)) = (fields.next(), fields.next(), fields.next())
    else {
        log::warn!("skipping malformed listing line '{line}'");
        return None;
    };
    let Some(molecule_type) = MoleculeType::from_listing(raw_type) else {
        log::warn!("skipping '{path}': unknown molecule type '{}'", raw_type.trim());
        return None;
    };
    Some(IndexedRecord {
        path: PathBuf::from(path),
        title: title.to_string(),
        molecule_type,
    })
}
