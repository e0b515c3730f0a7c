use super::TransformError;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

pub const PDF_SIGNATURE: &[u8] = b"%PDF-";

/// Checks the leading bytes of the file without parsing it.
pub fn has_pdf_signature(path: &Path) -> io::Result<bool> {
    let mut header = [0u8; PDF_SIGNATURE.len()];
    match File::open(path)?.read_exact(&mut header) {
        Ok(()) => Ok(header == PDF_SIGNATURE),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e),
    }
}

/// Re-serializes the document with object streams and a cross-reference
/// stream. The Info dictionary is carried over as-is.
pub fn rewrite_pdf(input: &Path, output: &Path) -> Result<(), TransformError> {
    if !has_pdf_signature(input)? {
        return Err(TransformError::InvalidDocument);
    }

    let mut doc = lopdf::Document::load(input)?;
    doc.compress();

    let mut writer = BufWriter::new(File::create(output)?);
    doc.save_modern(&mut writer)?;
    writer.flush()?;
    Ok(())
}
