//! Upload checks that run before any parsing.

use crate::errors::AppError;
use crate::extraction::DocumentFormat;

const SNIFF_WINDOW: usize = 1024;
const MAX_FILENAME_CHARS: usize = 120;

/// Markers of active content that have no business in a resume upload.
const ACTIVE_CONTENT_MARKERS: &[&str] = &[
    "<script",
    "javascript:",
    "vbscript:",
    "onload=",
    "onerror=",
    "<iframe",
];

/// Stem used when nothing of the client's stem survives sanitizing.
const FALLBACK_STEM: &str = "resume";

fn basename(raw: &str) -> &str {
    raw.rsplit(['/', '\\']).next().unwrap_or_default().trim()
}

/// Collapses everything outside `[A-Za-z0-9.-]` into single underscores.
fn sanitize_part(part: &str) -> String {
    let mut out = String::with_capacity(part.len());
    let mut last_underscore = false;
    for c in part.chars() {
        if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
            out.push(c);
            last_underscore = false;
        } else if !last_underscore {
            out.push('_');
            last_underscore = true;
        }
    }
    out.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Reduces a client filename to a safe basename of `[A-Za-z0-9._-]`.
/// The extension is kept; a stem that sanitizes to nothing becomes `resume`.
pub fn sanitize_filename(raw: &str) -> String {
    let name = basename(raw);
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) if !ext.is_empty() => (stem, sanitize_part(ext)),
        _ => (name, String::new()),
    };

    let mut stem = sanitize_part(stem);
    if stem.is_empty() {
        stem = FALLBACK_STEM.to_string();
    }
    if ext.is_empty() {
        stem.truncate(MAX_FILENAME_CHARS);
        return stem;
    }
    // ASCII only by now, so byte truncation is char-safe.
    stem.truncate(MAX_FILENAME_CHARS.saturating_sub(ext.len() + 1).max(1));
    format!("{stem}.{ext}")
}

/// Validates an uploaded file and returns its format and safe filename.
/// The format comes from the client's own extension, before sanitizing.
pub fn validate_upload(
    filename: &str,
    bytes: &[u8],
    max_bytes: usize,
) -> Result<(DocumentFormat, String), AppError> {
    if filename.trim().is_empty() {
        return Err(AppError::Validation("No file selected".to_string()));
    }
    let format = DocumentFormat::from_filename(basename(filename))?;
    let safe_name = sanitize_filename(filename);

    if bytes.is_empty() {
        return Err(AppError::Validation("File is empty".to_string()));
    }
    if bytes.len() > max_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "File is {} bytes; the limit is {max_bytes} bytes",
            bytes.len()
        )));
    }
    if has_active_content(bytes) {
        return Err(AppError::Validation(
            "File contains potentially malicious content".to_string(),
        ));
    }
    Ok((format, safe_name))
}

fn has_active_content(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(SNIFF_WINDOW)];
    let head = String::from_utf8_lossy(window).to_ascii_lowercase();
    ACTIVE_CONTENT_MARKERS.iter().any(|m| head.contains(m))
}
