pub const SEQDB_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SEQDB_BUILD_N: &str = env!("SEQDB_BUILD_N");

pub fn version_cli_text() -> String {
    format!(
        "seqdb {}\nBuild {}\nBLAST database maintenance for FASTA directories",
        SEQDB_VERSION, SEQDB_BUILD_N
    )
}
