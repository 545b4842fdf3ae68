pub mod about;
pub mod build_driver;
pub mod command;
pub mod config;
pub mod error;
pub mod lister;
pub mod molecule_type;
pub mod prompt;
pub mod reconcile;
pub mod sniffer;
pub mod title;

pub use build_driver::{BuildDriver, BuildRequest, RunSummary};
pub use command::{CommandRunner, SystemCommandRunner, ToolOutput};
pub use config::Config;
pub use error::SeqDbError;
pub use lister::{IndexedFileLister, IndexedRecord};
pub use molecule_type::{MoleculeType, RequiredExtensions};
pub use reconcile::{ReformatDecisionEngine, Scan, Worklist, WorklistEntry, scan_directory};
pub use sniffer::SequenceSniffer;
