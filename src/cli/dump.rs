use anyhow::{Context, Result};
use log::info;
use std::io::Write;
use std::path::Path;

use spectralio::formats::{Format, FormatOptions};

/// Dump the spectra in a file as JSON
pub fn run(
    file: &Path,
    format: Format,
    options: &FormatOptions,
    output: Option<&Path>,
    compact: bool,
) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {}", file.display());
    }

    let spectra = format
        .reader(options)
        .read_path(file)
        .with_context(|| format!("Failed to read {} as {}", file.display(), format))?;
    info!("Read {} spectra from {}", spectra.len(), file.display());

    let json = if compact {
        serde_json::to_string(&spectra)?
    } else {
        serde_json::to_string_pretty(&spectra)?
    };

    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote JSON to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", json)?;
        }
    }

    Ok(())
}
