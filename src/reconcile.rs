use crate::command::CommandRunner;
use crate::config::Config;
use crate::error::SeqDbError;
use crate::lister::{IndexedFileLister, IndexedRecord};
use crate::molecule_type::{MoleculeType, RequiredExtensions};
use crate::sniffer::{Guess, SequenceSniffer};
use crate::title::title_from_filename;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkReason {
    Unformatted,
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorklistEntry {
    pub path: PathBuf,
    pub title: String,
    pub molecule_type: MoleculeType,
    pub reason: WorkReason,
}

/// Files needing a (re)build, in discovery order followed by listing order.
/// No path appears twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Worklist {
    entries: Vec<WorklistEntry>,
    #[serde(skip)]
    seen: HashSet<PathBuf>,
}

impl Worklist {
    fn push(&mut self, entry: WorklistEntry) {
        if self.seen.insert(entry.path.clone()) {
            self.entries.push(entry);
        }
    }

    pub fn entries(&self) -> &[WorklistEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for Worklist {
    type Item = WorklistEntry;
    type IntoIter = std::vec::IntoIter<WorklistEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

pub struct ReformatDecisionEngine<'a> {
    sniffer: SequenceSniffer,
    required: &'a RequiredExtensions,
}

impl<'a> ReformatDecisionEngine<'a> {
    pub fn new(sniffer: SequenceSniffer, required: &'a RequiredExtensions) -> Self {
        Self { sniffer, required }
    }

    pub fn reconcile(
        &self,
        records: &[IndexedRecord],
        root: &Path,
    ) -> Result<Worklist, SeqDbError> {
        let mut worklist = Worklist::default();
        self.find_unformatted(records, root, &mut worklist)?;
        self.find_stale(records, &mut worklist)?;
        Ok(worklist)
    }

    fn find_unformatted(
        &self,
        records: &[IndexedRecord],
        root: &Path,
        worklist: &mut Worklist,
    ) -> Result<(), SeqDbError> {
        let indexed: HashSet<&Path> = records.iter().map(|r| r.path.as_path()).collect();
        let walker = WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => return Err(e.into()),
                Err(e) => {
                    log::warn!("skipping unreadable entry: {e}");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            match self.sniffer.looks_like_sequence_data(path) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    log::warn!("skipping {}: {e}", path.display());
                    continue;
                }
            }
            if indexed.contains(path) {
                log::debug!("{} is already indexed", path.display());
                continue;
            }
            let molecule_type = match self.sniffer.guess_molecule_type(path) {
                Ok(Guess::Unanimous(molecule_type)) => molecule_type,
                Ok(Guess::Ambiguous) => {
                    log::warn!(
                        "skipping {}: could not tell whether it holds nucleotide or protein sequences",
                        path.display()
                    );
                    continue;
                }
                Err(e) => {
                    log::warn!("skipping {}: {e}", path.display());
                    continue;
                }
            };
            let file_name = entry.file_name().to_string_lossy();
            log::debug!("{} is unformatted ({molecule_type})", path.display());
            worklist.push(WorklistEntry {
                path: path.to_path_buf(),
                title: title_from_filename(&file_name),
                molecule_type,
                reason: WorkReason::Unformatted,
            });
        }
        Ok(())
    }

    fn find_stale(
        &self,
        records: &[IndexedRecord],
        worklist: &mut Worklist,
    ) -> Result<(), SeqDbError> {
        for record in records {
            let present = sibling_extensions(&record.path)?;
            if self.required.is_complete(record.molecule_type, &present) {
                continue;
            }
            log::debug!(
                "{} is missing {:?}",
                record.path.display(),
                self.required
                    .for_type(record.molecule_type)
                    .difference(&present)
                    .collect::<Vec<_>>()
            );
            worklist.push(WorklistEntry {
                path: record.path.clone(),
                title: record.title.clone(),
                molecule_type: record.molecule_type,
                reason: WorkReason::Stale,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Scan {
    pub root: PathBuf,
    pub records: Vec<IndexedRecord>,
    pub worklist: Worklist,
}

/// Lists what is indexed under `config.database_dir` and works out what needs
/// building. Fails before any decision if the directory or the listing tool is
/// unavailable.
pub fn scan_directory(config: &Config, runner: &dyn CommandRunner) -> Result<Scan, SeqDbError> {
    config.validate()?;
    let root = fs::canonicalize(&config.database_dir).map_err(|e| {
        SeqDbError::Config(format!(
            "Could not open database directory '{}': {e}",
            config.database_dir.display()
        ))
    })?;
    if !root.is_dir() {
        return Err(SeqDbError::Config(format!(
            "'{}' is not a directory",
            root.display()
        )));
    }
    let records = IndexedFileLister::new(runner, &config.list_program).list(&root)?;
    let engine = ReformatDecisionEngine::new(
        SequenceSniffer::new(config.sample_bytes),
        &config.required_extensions,
    );
    let worklist = engine.reconcile(&records, &root)?;
    log::info!(
        "{}: {} indexed, {} to build",
        root.display(),
        records.len(),
        worklist.len()
    );
    Ok(Scan {
        root,
        records,
        worklist,
    })
}

/// Lower-cased extensions of the files next to `path` whose names start with
/// `<file name>.`. A missing parent directory yields an empty set.
pub fn sibling_extensions(path: &Path) -> io::Result<BTreeSet<String>> {
    let mut extensions = BTreeSet::new();
    let Some(file_name) = path.file_name() else {
        return Ok(extensions);
    };
    let prefix = format!("{}.", file_name.to_string_lossy());
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let dir = match fs::read_dir(parent) {
        Ok(dir) => dir,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(extensions),
        Err(e) => return Err(e),
    };
    for entry in dir {
        let name = entry?.file_name().to_string_lossy().to_string();
        let Some(rest) = name.strip_prefix(&prefix) else {
            continue;
        };
        if let Some(ext) = rest.rsplit('.').next().filter(|ext| !ext.is_empty()) {
            extensions.insert(ext.to_lowercase());
        }
    }
    Ok(extensions)
}
