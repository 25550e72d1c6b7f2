//! Whole-file reads and writes with transparent gzip handling.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::debug;

/// Whether a path names a gzip-compressed file
pub fn is_gzip_path(path: &Path) -> bool {
    path.to_string_lossy().ends_with(".gz")
}

/// Read a whole file, gunzipping it if the path ends in `.gz`
pub fn read_file_bytes(path: &Path) -> io::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut file = BufReader::new(File::open(path)?);

    if is_gzip_path(path) {
        GzDecoder::new(file).read_to_end(&mut buffer)?;
    } else {
        file.read_to_end(&mut buffer)?;
    }

    debug!("Read {} bytes from {}", buffer.len(), path.display());
    Ok(buffer)
}

/// Write a whole file, gzipping it if the path ends in `.gz`.
///
/// Missing parent directories are created.
pub fn write_file_bytes(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut file = BufWriter::new(File::create(path)?);

    if is_gzip_path(path) {
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(bytes)?;
        encoder.finish()?.flush()?;
    } else {
        file.write_all(bytes)?;
        file.flush()?;
    }

    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
