use crate::molecule_type::MoleculeType;
use bio::alphabets::Alphabet;
use itertools::Itertools;
use regex::Regex;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::sync::LazyLock;

pub const RECORD_START_MARKER: u8 = b'>';

/// Fragments with fewer informative residues than this are not classified.
const MIN_CLASSIFIABLE_RESIDUES: usize = 10;
/// Percentage of nucleic acid letters above which a fragment is nucleotide.
const NUCLEOTIDE_THRESHOLD_PERCENT: usize = 90;

static HEADER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^>.+$").expect("header line pattern is valid"));

static NUCLEIC_ACIDS: LazyLock<Alphabet> = LazyLock::new(|| Alphabet::new(b"ACGTUacgtu"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guess {
    Unanimous(MoleculeType),
    Ambiguous,
}

#[derive(Debug, Clone, Copy)]
pub struct SequenceSniffer {
    sample_bytes: usize,
}

impl SequenceSniffer {
    pub fn new(sample_bytes: usize) -> Self {
        Self { sample_bytes }
    }

    /// True iff the file's first byte is the record-start marker. Empty files
    /// are not sequence data.
    pub fn looks_like_sequence_data(&self, path: &Path) -> io::Result<bool> {
        let mut first = [0u8; 1];
        let n = File::open(path)?.read(&mut first)?;
        Ok(n == 1 && first[0] == RECORD_START_MARKER)
    }

    pub fn guess_molecule_type(&self, path: &Path) -> io::Result<Guess> {
        let mut sample = Vec::with_capacity(self.sample_bytes.min(64 * 1024));
        File::open(path)?
            .take(self.sample_bytes as u64)
            .read_to_end(&mut sample)?;
        Ok(guess_from_sample(&String::from_utf8_lossy(&sample)))
    }
}

pub fn guess_from_sample(sample: &str) -> Guess {
    let types: Vec<MoleculeType> = HEADER_LINE
        .split(sample)
        .filter(|fragment| !fragment.is_empty())
        .filter_map(classify_fragment)
        .unique()
        .collect();
    match types.as_slice() {
        [only] => Guess::Unanimous(*only),
        _ => Guess::Ambiguous,
    }
}

/// Residue-alphabet heuristic for one record body. `N` and `X` are ignored as
/// they occur in both alphabets.
pub fn classify_fragment(fragment: &str) -> Option<MoleculeType> {
    let residues: Vec<u8> = fragment
        .bytes()
        .filter(|b| b.is_ascii_alphabetic() && !matches!(b.to_ascii_uppercase(), b'N' | b'X'))
        .collect();
    if residues.len() < MIN_CLASSIFIABLE_RESIDUES {
        return None;
    }
    let nucleic = residues
        .iter()
        .filter(|b| NUCLEIC_ACIDS.is_word([**b]))
        .count();
    if nucleic * 100 > residues.len() * NUCLEOTIDE_THRESHOLD_PERCENT {
        Some(MoleculeType::Nucleotide)
    } else {
        Some(MoleculeType::Protein)
    }
}
