use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use spectralio::formats::Format;

mod config;
mod convert;
mod dump;
mod info;

pub use config::Config;

/// spectralio - Binary NIR/MIR Spectroscopy Format Tool
#[derive(Parser)]
#[command(name = "spectralio")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Load reader/writer settings from a TOML config file
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display a summary of the spectra in a file
    Info {
        /// Input file path (a trailing .gz is decompressed)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Input format (nir, cal, opus, opus-legacy, spa); guessed from the extension
        /// when omitted
        #[arg(short, long)]
        format: Option<Format>,
    },

    /// Dump the spectra in a file as JSON
    Dump {
        /// Input file path (a trailing .gz is decompressed)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Input format; guessed from the extension when omitted
        #[arg(short, long)]
        format: Option<Format>,

        /// Write JSON to this file instead of stdout
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },

    /// Convert spectra from one format to another
    Convert {
        /// Input file path
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output file path (a trailing .gz compresses the output)
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Input format; guessed from the extension when omitted
        #[arg(long)]
        from: Option<Format>,

        /// Output format (nir or cal); guessed from the extension when omitted
        #[arg(long)]
        to: Option<Format>,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

/// Explicit format, or the one registered for the file's extension
fn resolve_format(explicit: Option<Format>, path: &Path) -> Result<Format> {
    match explicit {
        Some(format) => Ok(format),
        None => Format::from_path(path).with_context(|| {
            format!(
                "Cannot determine the format of {}; pass it explicitly",
                path.display()
            )
        }),
    }
}

pub fn dispatch(cli: Cli) -> Result<()> {
    let options = Config::load(cli.config.as_deref())?.into_options();

    match cli.command {
        Commands::Info { file, format } => {
            let format = resolve_format(format, &file)?;
            info::run(&file, format, &options)
        }
        Commands::Dump {
            file,
            format,
            output,
            compact,
        } => {
            let format = resolve_format(format, &file)?;
            dump::run(&file, format, &options, output.as_deref(), compact)
        }
        Commands::Convert {
            input,
            output,
            from,
            to,
        } => {
            let from = resolve_format(from, &input)?;
            let to = resolve_format(to, &output)?;
            convert::run(&input, from, &output, to, &options)
        }
    }
}
