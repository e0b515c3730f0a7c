/// Sanitizes an uploaded filename so it is safe to embed in a
/// `Content-Disposition` header, a gzip header or a zip entry.
///
/// Leading dots are kept: `.txt` is a valid upload with an empty base name.
/// Length is not capped; the name never becomes part of a storage path.
pub fn sanitize_filename(filename: &str) -> String {
    // Browsers may send either separator; keep only the last component
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("")
        .trim();

    if name != filename.trim() {
        tracing::warn!("Path components stripped from upload name: {}", filename);
    }

    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_control()
                || c == ':'
                || c == '*'
                || c == '?'
                || c == '"'
                || c == '<'
                || c == '>'
                || c == '|'
                || c == ';'
            {
                '_'
            } else {
                c
            }
        })
        .collect();

    if sanitized.is_empty() || sanitized == "." || sanitized == ".." {
        return "unnamed".to_string();
    }

    sanitized
}

/// Splits a filename at its final dot into `(base, lowercased extension)`.
///
/// A name without a dot has an empty extension.
pub fn split_extension(filename: &str) -> (&str, String) {
    match filename.rsplit_once('.') {
        Some((base, ext)) => (base, ext.to_lowercase()),
        None => (filename, String::new()),
    }
}
