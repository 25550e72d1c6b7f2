use anyhow::{Context, Result};
use log::{info, warn};
use std::path::Path;

use spectralio::formats::{Format, FormatOptions};

/// Convert spectra from one format to another
pub fn run(
    input: &Path,
    from: Format,
    output: &Path,
    to: Format,
    options: &FormatOptions,
) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }

    info!("Input:  {} ({})", input.display(), from);
    info!("Output: {} ({})", output.display(), to);

    let writer = to
        .writer(options)
        .with_context(|| format!("Cannot write {} files", to))?;

    let spectra = from
        .reader(options)
        .read_path(input)
        .with_context(|| format!("Failed to read {} as {}", input.display(), from))?;

    if spectra.is_empty() {
        warn!("No spectra found in {}", input.display());
        anyhow::bail!("Nothing to convert");
    }

    writer
        .write_path(&spectra, output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let file_size = std::fs::metadata(output).map(|m| m.len()).unwrap_or(0);
    info!("Conversion complete!");
    info!("  Spectra converted: {}", spectra.len());
    info!("  Output file size: {} bytes", file_size);

    Ok(())
}
