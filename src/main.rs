//! # spectralio
//!
//! A command-line tool for inspecting and converting binary NIR/MIR spectroscopy files.
//!
//! ## Usage
//!
//! ```bash
//! # Summarise a FOSS calibration file
//! spectralio info VALK10.CAL
//!
//! # Dump an OPUS file as JSON (OPUS extensions are numeric, so name the format)
//! spectralio dump sample.0 --format opus
//!
//! # Convert a Thermo SPA file to a gzipped FOSS NIR file
//! spectralio --config spectralio.toml convert scan.spa scan.nir.gz
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
