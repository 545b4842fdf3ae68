use crate::command::{CommandRunner, ToolOutput};
use crate::config::Config;
use crate::error::SeqDbError;
use crate::molecule_type::MoleculeType;
use crate::prompt::Prompter;
use crate::reconcile::{WorkReason, Worklist, WorklistEntry, sibling_extensions};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Taxid value meaning "pass no `-taxid` option".
pub const NO_TAXID: u32 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub path: PathBuf,
    pub molecule_type: MoleculeType,
    pub title: String,
    pub taxid: u32,
}

impl BuildRequest {
    pub fn makeblastdb_args(&self) -> Vec<String> {
        let mut args = vec![
            "-parse_seqids".to_string(),
            "-hash_index".to_string(),
            "-in".to_string(),
            self.path.to_string_lossy().to_string(),
            "-dbtype".to_string(),
            self.molecule_type.tool_code().to_string(),
            "-title".to_string(),
            self.title.clone(),
        ];
        if self.taxid != NO_TAXID {
            args.push("-taxid".to_string());
            args.push(self.taxid.to_string());
        }
        args
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub built: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

pub struct BuildDriver<'a, W: Write> {
    runner: &'a dyn CommandRunner,
    prompter: &'a mut dyn Prompter,
    out: W,
    build_program: String,
    extract_program: String,
}

impl<'a, W: Write> BuildDriver<'a, W> {
    pub fn new(
        config: &Config,
        runner: &'a dyn CommandRunner,
        prompter: &'a mut dyn Prompter,
        out: W,
    ) -> Self {
        Self {
            runner,
            prompter,
            out,
            build_program: config.build_program.clone(),
            extract_program: config.extract_program.clone(),
        }
    }

    pub fn run(&mut self, worklist: Worklist) -> Result<RunSummary, SeqDbError> {
        let mut summary = RunSummary::default();
        for entry in worklist {
            match self.confirm(&entry)? {
                Some(request) => {
                    self.build(&request)?;
                    summary.built.push(request.path);
                }
                None => summary.skipped.push(entry.path),
            }
        }
        Ok(summary)
    }

    /// Runs the prompts for one entry. `None` means the operator declined.
    pub fn confirm(&mut self, entry: &WorklistEntry) -> Result<Option<BuildRequest>, SeqDbError> {
        let verb = match entry.reason {
            WorkReason::Unformatted => "Create",
            WorkReason::Stale => "Rebuild incomplete",
        };
        let answer = self.prompter.ask(&format!(
            "{verb} {} database for {}? [Y/n] ",
            entry.molecule_type,
            entry.path.display()
        ))?;
        if answer.to_lowercase().contains('n') {
            writeln!(self.out, "Skipping {}", entry.path.display())?;
            return Ok(None);
        }

        let answer = self
            .prompter
            .ask(&format!("Title [{}]: ", entry.title))?;
        let title = match answer.trim() {
            "" => entry.title.clone(),
            custom => custom.to_string(),
        };

        let taxid = self.ask_taxid()?;

        Ok(Some(BuildRequest {
            path: entry.path.clone(),
            molecule_type: entry.molecule_type,
            title,
            taxid,
        }))
    }

    fn ask_taxid(&mut self) -> Result<u32, SeqDbError> {
        loop {
            let answer = self.prompter.ask("Taxonomy ID (optional): ")?;
            let answer = answer.trim();
            if answer.is_empty() {
                return Ok(NO_TAXID);
            }
            match answer.parse::<u32>() {
                Ok(taxid) => return Ok(taxid),
                Err(_) => writeln!(
                    self.out,
                    "'{answer}' is not a taxonomy ID. Enter a number or leave it empty."
                )?,
            }
        }
    }

    pub fn build(&mut self, request: &BuildRequest) -> Result<(), SeqDbError> {
        if !request.path.exists() && !sibling_extensions(&request.path)?.is_empty() {
            self.extract(&request.path)?;
        }

        let args = request.makeblastdb_args();
        let output = self.runner.run(&self.build_program, &args)?;
        self.echo(
            output,
            &format!("create BLAST database for {}", request.path.display()),
        )?;
        writeln!(self.out, "Done: {}", request.path.display())?;
        Ok(())
    }

    /// Recovers the FASTA source from a partial database at the same path.
    fn extract(&mut self, path: &Path) -> Result<(), SeqDbError> {
        let db = path.to_string_lossy().to_string();
        let args = vec![
            "-entry".to_string(),
            "all".to_string(),
            "-db".to_string(),
            db.clone(),
            "-out".to_string(),
            db,
        ];
        writeln!(
            self.out,
            "{} is missing; extracting sequences from its database",
            path.display()
        )?;
        let output = self.runner.run(&self.extract_program, &args)?;
        self.echo(output, &format!("extract sequences for {}", path.display()))
    }

    // A failed command's streams travel in the error report instead, so the
    // operator sees them once.
    fn echo(&mut self, output: ToolOutput, action: &str) -> Result<(), SeqDbError> {
        let output = output.into_result(action)?;
        self.out.write_all(output.stdout.as_bytes())?;
        self.out.write_all(output.stderr.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::scripted::{ScriptedCommandRunner, output};
    use crate::molecule_type::RequiredExtensions;
    use crate::prompt::{AcceptDefaults, ScriptedPrompter};
    use crate::reconcile::ReformatDecisionEngine;
    use crate::sniffer::SequenceSniffer;
    use std::fs;
    use tempfile::tempdir;

    const DNA: &str = "ACGTACGTACGTTTGACCAGTACGATCGATCG";

    fn ok_runner() -> ScriptedCommandRunner {
        ScriptedCommandRunner::new(|program, args| {
            Ok(output(program, args, 0, "Building a new DB\n", "warning: none\n"))
        })
    }

    fn worklist_for(root: &Path) -> Worklist {
        let required = RequiredExtensions::default();
        ReformatDecisionEngine::new(SequenceSniffer::new(1_048_576), &required)
            .reconcile(&[], root)
            .unwrap()
    }

    fn fasta_dir(names: &[&str]) -> (tempfile::TempDir, PathBuf) {
        let td = tempdir().unwrap();
        let root = fs::canonicalize(td.path()).unwrap();
        for name in names {
            fs::write(root.join(name), format!(">s\n{DNA}\n")).unwrap();
        }
        (td, root)
    }

    #[test]
    fn test_makeblastdb_args_omit_zero_taxid() {
        let mut request = BuildRequest {
            path: PathBuf::from("/db/seqs.fa"),
            molecule_type: MoleculeType::Protein,
            title: "My seqs".to_string(),
            taxid: NO_TAXID,
        };
        assert_eq!(
            request.makeblastdb_args(),
            vec![
                "-parse_seqids",
                "-hash_index",
                "-in",
                "/db/seqs.fa",
                "-dbtype",
                "prot",
                "-title",
                "My seqs"
            ]
        );
        request.taxid = 9606;
        assert!(request.makeblastdb_args().ends_with(&["-taxid".to_string(), "9606".to_string()]));
    }

    #[test]
    fn test_defaults_build_every_entry() {
        let (_td, root) = fasta_dir(&["a.fa", "b.fa"]);
        let runner = ok_runner();
        let mut prompter = AcceptDefaults;
        let mut out = Vec::new();
        let summary = BuildDriver::new(&Config::default(), &runner, &mut prompter, &mut out)
            .run(worklist_for(&root))
            .unwrap();
        assert_eq!(summary.built, vec![root.join("a.fa"), root.join("b.fa")]);
        assert!(summary.skipped.is_empty());
        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0][0], "makeblastdb");
        assert!(calls[0].contains(&"nucl".to_string()));
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Building a new DB"));
        assert!(text.contains("warning: none"));
    }

    #[test]
    fn test_declined_entry_is_skipped() {
        let (_td, root) = fasta_dir(&["a.fa", "b.fa"]);
        let runner = ok_runner();
        let mut prompter = ScriptedPrompter::new(["No", "y", "Custom title", "9606"]);
        let mut out = Vec::new();
        let summary = BuildDriver::new(&Config::default(), &runner, &mut prompter, &mut out)
            .run(worklist_for(&root))
            .unwrap();
        assert_eq!(summary.skipped, vec![root.join("a.fa")]);
        assert_eq!(summary.built, vec![root.join("b.fa")]);
        let call = &runner.calls()[0];
        assert!(call.contains(&"Custom title".to_string()));
        assert!(call.ends_with(&["-taxid".to_string(), "9606".to_string()]));
    }

    #[test]
    fn test_bad_taxid_reprompts_and_empty_means_none() {
        let (_td, root) = fasta_dir(&["seqs.fasta"]);
        let runner = ok_runner();
        let mut prompter = ScriptedPrompter::new(["", "", "abc", ""]);
        let mut out = Vec::new();
        let mut driver = BuildDriver::new(&Config::default(), &runner, &mut prompter, &mut out);
        let entry = worklist_for(&root).into_iter().next().unwrap();
        let request = driver.confirm(&entry).unwrap().unwrap();
        assert_eq!(request.title, "seqs");
        assert_eq!(request.taxid, NO_TAXID);
        drop(driver);
        let taxid_prompts = prompter
            .asked()
            .iter()
            .filter(|p| p.starts_with("Taxonomy ID"))
            .count();
        assert_eq!(taxid_prompts, 2);
        assert!(String::from_utf8(out).unwrap().contains("'abc' is not a taxonomy ID"));
    }

    #[test]
    fn test_build_failure_aborts_the_run() {
        let (_td, root) = fasta_dir(&["a.fa", "b.fa"]);
        let runner = ScriptedCommandRunner::new(|program, args| {
            Ok(output(program, args, 1, "partial output\n", "BLAST options error\n"))
        });
        let mut prompter = AcceptDefaults;
        let mut out = Vec::new();
        let err = BuildDriver::new(&Config::default(), &runner, &mut prompter, &mut out)
            .run(worklist_for(&root))
            .unwrap_err();
        assert_eq!(runner.calls().len(), 1);
        match &err {
            SeqDbError::CommandFailed {
                command,
                stdout,
                stderr,
                ..
            } => {
                assert!(command.starts_with("makeblastdb -parse_seqids -hash_index -in"));
                assert!(command.contains("a.fa"));
                assert_eq!(stdout, "partial output\n");
                assert_eq!(stderr, "BLAST options error\n");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().starts_with("Could not create BLAST database for"));
        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains("BLAST options error"));
        assert!(!text.contains("partial output"));
    }

    #[test]
    fn test_missing_source_is_extracted_before_rebuild() {
        let td = tempdir().unwrap();
        let root = fs::canonicalize(td.path()).unwrap();
        let db = root.join("db1");
        fs::write(root.join("db1.pin"), b"\0").unwrap();
        let runner = ScriptedCommandRunner::new(|program, args| {
            Ok(match program {
                "blastdbcmd" => output(
                    program,
                    args,
                    0,
                    "extracted 12 sequences\n",
                    "extract note\n",
                ),
                _ => output(program, args, 0, "Building a new DB\n", ""),
            })
        });
        let mut prompter = AcceptDefaults;
        let mut out = Vec::new();
        let request = BuildRequest {
            path: db.clone(),
            molecule_type: MoleculeType::Protein,
            title: "db1".to_string(),
            taxid: NO_TAXID,
        };
        BuildDriver::new(&Config::default(), &runner, &mut prompter, &mut out)
            .build(&request)
            .unwrap();
        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        let db = db.to_string_lossy().to_string();
        assert_eq!(
            calls[0],
            vec!["blastdbcmd", "-entry", "all", "-db", db.as_str(), "-out", db.as_str()]
        );
        assert_eq!(calls[1][0], "makeblastdb");
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("extracted 12 sequences"));
        assert!(text.contains("extract note"));
        assert!(text.contains("Building a new DB"));
    }

    #[test]
    fn test_failed_extraction_is_fatal() {
        let td = tempdir().unwrap();
        let root = fs::canonicalize(td.path()).unwrap();
        fs::write(root.join("db1.pin"), b"\0").unwrap();
        let runner = ScriptedCommandRunner::new(|program, args| {
            let status = if program == "blastdbcmd" { 2 } else { 0 };
            Ok(output(program, args, status, "", "BLAST Database error: No alias or index file found"))
        });
        let mut prompter = AcceptDefaults;
        let mut out = Vec::new();
        let request = BuildRequest {
            path: root.join("db1"),
            molecule_type: MoleculeType::Protein,
            title: "db1".to_string(),
            taxid: NO_TAXID,
        };
        let err = BuildDriver::new(&Config::default(), &runner, &mut prompter, &mut out)
            .build(&request)
            .unwrap_err();
        assert_eq!(runner.calls().len(), 1);
        let text = err.to_string();
        assert!(text.starts_with("Could not extract sequences for"));
        assert!(text.contains("No alias or index file found"));
        assert!(!String::from_utf8(out).unwrap().contains("No alias or index file found"));
    }
}
