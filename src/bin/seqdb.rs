//! List, check or build the BLAST databases under a directory.

use anyhow::{Context, Result};
use seqdb::{
    BuildDriver, Config, SystemCommandRunner, about,
    lister::IndexedFileLister,
    prompt::{AcceptDefaults, InteractivePrompter, Prompter},
    scan_directory,
};
use serde::Serialize;
use std::{env, fs, io, path::PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CliCommand {
    List,
    Check,
    Build,
}

#[derive(Debug, Default)]
struct CliArgs {
    show_help: bool,
    show_version: bool,
    config_path: Option<String>,
    database_dir: Option<String>,
    bin_dir: Option<String>,
    assume_yes: bool,
    command: Option<CliCommand>,
}

fn print_help() {
    println!(
        "Usage:\n  \
seqdb [--help|-h] [--version|-V]\n  \
seqdb [--config PATH] [--dir DIR] [--bin-dir DIR] [--yes] list|check|build\n\n  \
list   print the databases BLAST+ reports under DIR\n  \
check  print the files that need a database built or rebuilt\n  \
build  confirm and build each of those files with makeblastdb\n\n  \
--yes accepts every default without asking. SEQDB_DATABASE_DIR and\n  \
SEQDB_BIN_DIR are read from the environment; RUST_LOG sets log verbosity."
    );
}

fn option_value(args: &[String], idx: usize, flag: &str) -> Result<String, String> {
    args.get(idx + 1)
        .cloned()
        .ok_or_else(|| format!("Missing value after {flag}"))
}

fn parse_cli_args(args: &[String]) -> Result<CliArgs, String> {
    let mut parsed = CliArgs::default();
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "--help" | "-h" => {
                parsed.show_help = true;
                idx += 1;
            }
            "--version" | "-V" => {
                parsed.show_version = true;
                idx += 1;
            }
            "--yes" | "-y" => {
                parsed.assume_yes = true;
                idx += 1;
            }
            flag @ ("--config" | "--dir" | "--bin-dir") => {
                let value = option_value(args, idx, flag)?;
                match flag {
                    "--config" => parsed.config_path = Some(value),
                    "--dir" => parsed.database_dir = Some(value),
                    _ => parsed.bin_dir = Some(value),
                }
                idx += 2;
            }
            arg if arg.starts_with('-') => {
                return Err(format!("Unknown option '{arg}'"));
            }
            command => {
                if parsed.command.is_some() {
                    return Err(format!("Unexpected argument '{command}'"));
                }
                parsed.command = Some(match command {
                    "list" => CliCommand::List,
                    "check" => CliCommand::Check,
                    "build" => CliCommand::Build,
                    other => return Err(format!("Unknown command '{other}'")),
                });
                idx += 1;
            }
        }
    }
    Ok(parsed)
}

fn load_config(cli: &CliArgs) -> Result<Config> {
    let mut config = match &cli.config_path {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };
    config.apply_process_env();
    if let Some(dir) = &cli.database_dir {
        config.database_dir = PathBuf::from(dir);
    }
    if let Some(dir) = &cli.bin_dir {
        config.bin_dir = Some(PathBuf::from(dir));
    }
    config.validate()?;
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Could not serialize JSON output")?;
    println!("{text}");
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    if let Err(e) = run() {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let cli = match parse_cli_args(&args) {
        Ok(parsed) => parsed,
        Err(e) => {
            print_help();
            anyhow::bail!(e);
        }
    };
    if cli.show_help {
        print_help();
        return Ok(());
    }
    if cli.show_version {
        println!("{}", about::version_cli_text());
        return Ok(());
    }
    let Some(command) = cli.command else {
        print_help();
        anyhow::bail!("Missing command");
    };

    let config = load_config(&cli)?;
    log::debug!(
        "using {} for BLAST+",
        config.active_resolution_label(&config.build_program)
    );
    let runner = SystemCommandRunner::new(config.bin_dir.clone());

    match command {
        CliCommand::List => {
            let dir = fs::canonicalize(&config.database_dir).with_context(|| {
                format!(
                    "Could not open database directory '{}'",
                    config.database_dir.display()
                )
            })?;
            let records = IndexedFileLister::new(&runner, &config.list_program).list(&dir)?;
            print_json(&records)
        }
        CliCommand::Check => {
            let scan = scan_directory(&config, &runner)?;
            print_json(&scan.worklist.entries())
        }
        CliCommand::Build => {
            let scan = scan_directory(&config, &runner)?;
            if scan.worklist.is_empty() {
                println!("All databases under {} are up to date", scan.root.display());
                return Ok(());
            }
            println!(
                "{} file(s) under {} need a BLAST database",
                scan.worklist.len(),
                scan.root.display()
            );
            let mut prompter: Box<dyn Prompter> = if cli.assume_yes {
                Box::new(AcceptDefaults)
            } else {
                Box::new(InteractivePrompter::new()?)
            };
            let stdout = io::stdout();
            let summary =
                BuildDriver::new(&config, &runner, prompter.as_mut(), stdout.lock())
                    .run(scan.worklist)?;
            println!(
                "Built {} database(s), skipped {}",
                summary.built.len(),
                summary.skipped.len()
            );
            Ok(())
        }
    }
}
