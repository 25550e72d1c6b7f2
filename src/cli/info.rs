use anyhow::{Context, Result};
use std::path::Path;

use spectralio::formats::{read_file_bytes, Format, FormatOptions};
use spectralio::foss::{FossFile, FossFileSerialiser};
use spectralio::serialisation::Serialiser;
use spectralio::Spectrum;

/// Display a summary of the spectra in a file
pub fn run(file: &Path, format: Format, options: &FormatOptions) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {}", file.display());
    }

    let reader = format.reader(options);
    let spectra = reader
        .read_path(file)
        .with_context(|| format!("Failed to read {} as {}", file.display(), format))?;

    println!("{}", heading("Spectrum File Information"));
    println!("{}", heading("========================="));
    println!("File:    {}", file.display());
    println!("Format:  {}", format);
    println!("Spectra: {}", spectra.len());
    println!();

    if matches!(format, Format::Nir | Format::Cal) {
        let buffer = read_file_bytes(file).context("Failed to read file")?;
        let foss = FossFileSerialiser::new()?
            .deserialise_from_bytes(&buffer)
            .context("Failed to decode FOSS headers")?;
        print_foss_headers(&foss);
    }

    println!("{}", heading("Spectra:"));
    for (index, spectrum) in spectra.iter().enumerate() {
        println!("  {:4}. {}", index + 1, summarise(spectrum));
    }

    Ok(())
}

fn summarise(spectrum: &Spectrum) -> String {
    let range = match (spectrum.waves().first(), spectrum.waves().last()) {
        (Some(first), Some(last)) => format!("{} .. {}", first, last),
        _ => "-".to_string(),
    };
    format!(
        "{} ({} points, waves {}, {} fields)",
        spectrum.id,
        spectrum.len(),
        range,
        spectrum.sample_data.len()
    )
}

fn print_foss_headers(file: &FossFile) {
    let general = &file.general_header;
    let instrument = &file.instrument_header;

    println!("{}", heading("General Header:"));
    println!("  File type:     {}", general.file_type);
    println!("  Live samples:  {}", general.count);
    println!("  Deleted:       {}", general.deleted);
    println!("  Points:        {}", general.num_points);
    println!("  Constituents:  {}", general.num_consts);
    println!("  Created:       {} {}", general.creation_date, general.time.time());
    println!("  File ID:       {}", general.file_id);
    println!();

    println!("{}", heading("Instrument Header:"));
    println!("  Type:          {:?}", instrument.instrument_type);
    println!("  Model:         {}", instrument.model);
    println!("  Serial:        {}", instrument.serial);
    println!("  Segments:      {}", instrument.num_seg);
    println!("  Spacing mode:  {}", instrument.spacing_mode);
    let names: Vec<&str> = instrument
        .constituents
        .iter()
        .map(String::as_str)
        .filter(|name| !name.is_empty())
        .collect();
    if !names.is_empty() {
        println!("  Constituents:  {}", names.join(", "));
    }
    println!();
}

#[cfg(feature = "colorized_output")]
fn heading(text: &str) -> String {
    console::style(text).bold().cyan().to_string()
}

#[cfg(not(feature = "colorized_output"))]
fn heading(text: &str) -> String {
    text.to_string()
}
