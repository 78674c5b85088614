//! photo-squeeze CLI
//!
//! Compresses photos below a byte ceiling, stores them under a sanitized
//! person name, and retrieves them by filename search.
//!
//! # Commands
//!
//! - `compress`: compress a local file only
//! - `upload`: compress and store a photo for a person
//! - `search`: list stored photos whose name contains a term
//! - `download`: fetch a stored photo by id
//! - `lookup`: find a person in the identity directory
//! - `id encode|decode`: apply the identifier transform

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod config;
mod error;
mod logging;

use crate::config::Settings;
use crate::error::{exit_code_for_error, CliError, CliExitCode};

#[derive(Parser)]
#[command(name = "photo-squeeze")]
#[command(version)]
#[command(about = "Compress photos below a size ceiling and keep them in a photo store")]
#[command(propagate_version = true)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "PHOTO_SQUEEZE_CONFIG")]
    config: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a photo into a local file without storing it
    Compress {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Override the configured ceiling in bytes
        #[arg(long)]
        ceiling: Option<usize>,
        /// Write the smallest attempt even if it misses the ceiling
        #[arg(long)]
        keep_oversize: bool,
    },
    /// Compress a photo and store it as <name>.jpg
    Upload {
        /// Person's name
        name: String,
        /// Photo file (JPEG or PNG)
        photo: PathBuf,
        /// Also write the uploaded bytes to this path
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// List stored photos whose filename contains TERM
    Search { term: String },
    /// Fetch a stored photo by id
    Download {
        file_id: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Look a person up by plain identifier
    Lookup { identifier: String },
    /// Identifier transform
    Id {
        #[command(subcommand)]
        action: commands::IdCommands,
    },
}

fn run(cli: Cli) -> Result<(), CliError> {
    let settings = || -> Result<Settings, CliError> {
        let settings = Settings::new(cli.config.as_deref())?;
        tracing::debug!(?settings, "loaded configuration");
        Ok(settings)
    };

    match cli.command {
        Commands::Compress {
            input,
            output,
            ceiling,
            keep_oversize,
        } => commands::handle_compress(&settings()?, &input, &output, ceiling, keep_oversize),
        Commands::Upload { name, photo, save } => {
            commands::handle_upload(&settings()?, &name, &photo, save.as_deref())
        }
        Commands::Search { term } => commands::handle_search(&settings()?, &term),
        Commands::Download { file_id, output } => {
            commands::handle_download(&settings()?, &file_id, output.as_deref())
        }
        Commands::Lookup { identifier } => commands::handle_lookup(&settings()?, &identifier),
        Commands::Id { action } => {
            println!("{}", commands::handle_id(action));
            Ok(())
        }
    }
}

fn main() {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose);

    let exit_code = match run(cli) {
        Ok(()) => CliExitCode::Success,
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            eprintln!("error: {err}");
            exit_code_for_error(&err)
        }
    };

    std::process::exit(exit_code as i32);
}
