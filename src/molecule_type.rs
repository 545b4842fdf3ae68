use crate::error::SeqDbError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

const NUCLEOTIDE_EXTENSIONS: [&str; 9] = [
    "ndb", "nhr", "nin", "nog", "nos", "not", "nsq", "ntf", "nto",
];
const PROTEIN_EXTENSIONS: [&str; 9] = [
    "pdb", "phr", "pin", "pog", "pos", "pot", "psq", "ptf", "pto",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoleculeType {
    Nucleotide,
    Protein,
}

impl MoleculeType {
    /// Parses the type column printed by the listing tool ("Protein",
    /// " nucleotide ", ...).
    pub fn from_listing(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "nucleotide" => Some(Self::Nucleotide),
            "protein" => Some(Self::Protein),
            _ => None,
        }
    }

    pub fn tool_code(&self) -> &'static str {
        match self {
            Self::Nucleotide => "nucl",
            Self::Protein => "prot",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nucleotide => "nucleotide",
            Self::Protein => "protein",
        }
    }
}

impl fmt::Display for MoleculeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File suffixes a complete index must have, one set per molecule type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredExtensions {
    nucleotide: BTreeSet<String>,
    protein: BTreeSet<String>,
}

impl Default for RequiredExtensions {
    fn default() -> Self {
        Self {
            nucleotide: NUCLEOTIDE_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            protein: PROTEIN_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl RequiredExtensions {
    pub fn new<N, P>(nucleotide: N, protein: P) -> Result<Self, SeqDbError>
    where
        N: IntoIterator,
        N::Item: AsRef<str>,
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        Ok(Self {
            nucleotide: normalized_set(MoleculeType::Nucleotide, nucleotide)?,
            protein: normalized_set(MoleculeType::Protein, protein)?,
        })
    }

    pub fn for_type(&self, molecule_type: MoleculeType) -> &BTreeSet<String> {
        match molecule_type {
            MoleculeType::Nucleotide => &self.nucleotide,
            MoleculeType::Protein => &self.protein,
        }
    }

    /// True iff every required extension for `molecule_type` is in `present`.
    /// Extra extensions on disk are ignored.
    pub fn is_complete(&self, molecule_type: MoleculeType, present: &BTreeSet<String>) -> bool {
        let required = self.for_type(molecule_type);
        required.intersection(present).count() == required.len()
    }

    pub fn validate(&self) -> Result<(), SeqDbError> {
        for molecule_type in [MoleculeType::Nucleotide, MoleculeType::Protein] {
            let set = self.for_type(molecule_type);
            let renormalized = normalized_set(molecule_type, set.iter())?;
            if renormalized != *set {
                return Err(SeqDbError::Config(format!(
                    "{molecule_type} extensions must be lower-case without leading dots"
                )));
            }
        }
        Ok(())
    }
}

fn normalized_set<I>(molecule_type: MoleculeType, raw: I) -> Result<BTreeSet<String>, SeqDbError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut set = BTreeSet::new();
    for ext in raw {
        let ext = ext.as_ref().trim().trim_start_matches('.').to_lowercase();
        if ext.is_empty() {
            return Err(SeqDbError::Config(format!(
                "empty extension in the {molecule_type} extension set"
            )));
        }
        if !set.insert(ext.clone()) {
            return Err(SeqDbError::Config(format!(
                "duplicate extension '{ext}' in the {molecule_type} extension set"
            )));
        }
    }
    if set.is_empty() {
        return Err(SeqDbError::Config(format!(
            "the {molecule_type} extension set is empty"
        )));
    }
    Ok(set)
}
