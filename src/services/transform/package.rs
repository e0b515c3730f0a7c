use super::TransformError;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;
use zip::CompressionMethod;
use zip::write::{FileOptions, ZipWriter};

/// Wraps `input`, unmodified, as the single entry `entry_name` of a new zip.
///
/// Archives are wrapped too even though they rarely shrink further.
pub fn zip_file(input: &Path, output: &Path, entry_name: &str) -> Result<(), TransformError> {
    let mut reader = BufReader::new(File::open(input)?);
    let mut zip = ZipWriter::new(BufWriter::new(File::create(output)?));

    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(9))
        .large_file(input.metadata()?.len() >= u32::MAX as u64);

    zip.start_file(entry_name, options)?;
    io::copy(&mut reader, &mut zip)?;
    zip.finish()?.flush()?;
    Ok(())
}
