use super::TransformError;
use flate2::{Compression, GzBuilder};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

/// Gzips `input` into `output` at the highest level, streaming through
/// fixed-size buffers so memory use does not grow with the input.
pub fn gzip_file(input: &Path, output: &Path, original_name: &str) -> Result<(), TransformError> {
    let mut reader = BufReader::new(File::open(input)?);
    let writer = BufWriter::new(File::create(output)?);

    // The header name must not contain NUL
    let header_name: Vec<u8> = original_name.bytes().filter(|b| *b != 0).collect();
    let mut encoder = GzBuilder::new()
        .filename(header_name)
        .write(writer, Compression::best());

    io::copy(&mut reader, &mut encoder)?;
    encoder.finish()?.flush()?;
    Ok(())
}
