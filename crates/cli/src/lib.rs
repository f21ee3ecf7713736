mod check;
mod outline;
mod view;

use clap::{Parser, Subcommand};
use srcsync_core::{SyncError, SyncSettings};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "srcsync",
    version,
    about = "Structural model and interface synchronization for Java sources",
    long_about = "srcsync parses Java compilation units into a live structural model and keeps \
                  classes in line with the interfaces they implement."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Also log to stderr
    #[arg(long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the declarations of a Java file
    Outline {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Emit JSON instead of a tree
        #[arg(long)]
        json: bool,
    },
    /// Report interface methods missing from the classes of the given files
    #[command(
        long_about = "Opens every file in one session and runs the deep source check over each. \
                      With --apply the missing methods are added and the files rewritten."
    )]
    Check {
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Add the missing methods and write the files back
        #[arg(long)]
        apply: bool,

        /// Settings file (JSON)
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },
    /// Print the effective settings as JSON
    Config {
        /// Print the JSON schema of the settings file instead
        #[arg(long)]
        schema: bool,

        /// Settings file (JSON)
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let _guard = srcsync_core::logging::init_logging("cli", cli.verbose);

    match cli.command {
        Commands::Outline { file, json } => outline::run(&file, json),
        Commands::Check {
            files,
            apply,
            config,
        } => {
            let settings = load_settings(config.as_deref())?;
            check::run(&files, apply, settings)
        }
        Commands::Config { schema, config } => {
            let value = if schema {
                SyncSettings::json_schema()
            } else {
                serde_json::to_value(load_settings(config.as_deref())?)?
            };
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
    }
}

fn load_settings(path: Option<&Path>) -> Result<SyncSettings, SyncError> {
    match path {
        Some(path) => SyncSettings::load(path),
        None => Ok(SyncSettings::default()),
    }
}

pub(crate) fn read_source(path: &Path) -> Result<String, SyncError> {
    Ok(std::fs::read_to_string(path)?)
}

/// Name a file is registered under inside a session.
pub(crate) fn source_name(path: &Path) -> String {
    path.display().to_string()
}
