//! records: command-line front end for the academic records store
//!
//! ## Usage
//!
//! ```bash
//! # Enroll a learner and track progress
//! records register Ana
//! records enroll Ana 1
//! records complete Ana 1 "Variáveis"
//! records progress Ana
//!
//! # Issue and look up certificates
//! records issue Ana 1
//! records certificates Ana
//! records find CERT-9F3A1B2C4D5E
//!
//! # Use another data directory
//! records --data-dir /srv/pim courses
//! ```
//!
//! Routine refusals (not enrolled, modules pending) exit with status 2;
//! genuine failures exit with status 1.

mod cli;

use std::path::PathBuf;

use academic_records::RecordsConfig;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{Commands, Session};

#[derive(Parser, Debug)]
#[command(name = "records")]
#[command(about = "Course progress tracking and certificate issuance")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "RECORDS_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory (overrides config file)
    #[arg(short, long, env = "RECORDS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("records_cli=info".parse()?)
                .add_directive("academic_records=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Load config
    let mut config = match &cli.config {
        Some(path) => RecordsConfig::load(path)?,
        None => RecordsConfig::default(),
    };

    // Apply CLI overrides
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    info!(data_dir = %config.data_dir.display(), "Using data directory");

    let mut session = Session::open(&config)?;

    match cli::execute(&mut session, cli.command) {
        Ok(output) => {
            println!("{output}");
            Ok(())
        }
        Err(e) if e.is_routine() => {
            eprintln!("{e}");
            std::process::exit(2);
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_find_with_learner() {
        let cli = Cli::try_parse_from(["records", "find", "CERT-9F3A1B2C4D5E", "--learner", "Ana"])
            .unwrap();
        match cli.command {
            Commands::Find { code, learner } => {
                assert_eq!(code, "CERT-9F3A1B2C4D5E");
                assert_eq!(learner.as_deref(), Some("Ana"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_data_dir_flag() {
        let cli = Cli::try_parse_from(["records", "--data-dir", "/srv/pim", "courses"]).unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/srv/pim")));
    }
}
