//! Text recovery for Word 97-2003 `.doc` files.
//!
//! There is no maintained pure-Rust reader for the binary Word format, so this
//! walks the OLE2 container bytes and keeps runs of printable text, both
//! 8-bit (cp1252-ish) and UTF-16LE. Good enough for keyword scoring.

use super::ExtractError;

const OLE_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Shortest run worth keeping. Shorter runs are mostly structure noise.
const MIN_RUN_CHARS: usize = 8;

pub(super) fn extract(bytes: &[u8]) -> Result<String, ExtractError> {
    if !bytes.starts_with(&OLE_MAGIC) {
        return Err(ExtractError::CorruptDocument(
            "file is neither an OLE2 Word document nor OOXML".to_string(),
        ));
    }

    let body = &bytes[OLE_MAGIC.len()..];
    let mut runs = utf16_runs(body);
    if runs.is_empty() {
        runs = ascii_runs(body);
    }

    Ok(runs.join("\n"))
}

fn is_text_char(c: char) -> bool {
    c.is_ascii_graphic() || c == ' ' || c == '\t' || (c as u32 >= 0xA0 && !c.is_control())
}

fn keep_run(run: &str) -> bool {
    let trimmed = run.trim();
    if trimmed.chars().count() < MIN_RUN_CHARS {
        return false;
    }
    let letters = trimmed.chars().filter(|c| c.is_alphabetic()).count();
    letters * 2 >= trimmed.chars().count()
}

fn flush(current: &mut String, runs: &mut Vec<String>) {
    if keep_run(current) {
        runs.push(current.trim().to_string());
    }
    current.clear();
}

fn ascii_runs(body: &[u8]) -> Vec<String> {
    let mut runs = Vec::new();
    let mut current = String::new();
    for &b in body {
        let c = b as char;
        if b.is_ascii() && is_text_char(c) {
            current.push(c);
        } else {
            flush(&mut current, &mut runs);
        }
    }
    flush(&mut current, &mut runs);
    runs
}

fn utf16_runs(body: &[u8]) -> Vec<String> {
    let mut runs = Vec::new();
    // Text may start on either byte parity.
    for offset in 0..2 {
        let mut current = String::new();
        let units = body[offset.min(body.len())..]
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
        for unit in units {
            match char::from_u32(unit as u32) {
                // High byte zero only for Latin-1; require it so 8-bit text
                // pairs don't decode as CJK noise.
                Some(c) if unit < 0x0100 && unit != 0 && is_text_char(c) => current.push(c),
                _ => flush(&mut current, &mut runs),
            }
        }
        flush(&mut current, &mut runs);
    }
    runs
}

#[cfg(test)]
pub(super) mod tests {
    use super::*;

    /// Minimal OLE2-looking byte blob with `text` stored as UTF-16LE.
    pub(crate) fn ole_sample(text: &str) -> Vec<u8> {
        let mut bytes = OLE_MAGIC.to_vec();
        bytes.extend_from_slice(&[0u8; 504]);
        bytes.extend_from_slice(&[0x01, 0x02, 0x7F, 0x00]);
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        bytes.extend_from_slice(&[0u8; 64]);
        bytes
    }

    #[test]
    fn test_recovers_utf16_text() {
        let text = extract(&ole_sample("Senior Python Developer")).unwrap();
        assert_eq!(text, "Senior Python Developer");
    }

    #[test]
    fn test_recovers_8bit_text() {
        let mut bytes = OLE_MAGIC.to_vec();
        bytes.extend_from_slice(&[0xFF, 0xFE]);
        bytes.extend_from_slice(b"Project manager with Scrum experience");
        bytes.push(0x00);
        let text = extract(&bytes).unwrap();
        assert!(text.contains("Project manager with Scrum experience"));
    }

    #[test]
    fn test_rejects_non_ole_bytes() {
        let err = extract(b"plain bytes, no container").unwrap_err();
        assert!(matches!(err, ExtractError::CorruptDocument(_)));
    }

    #[test]
    fn test_drops_short_noise_runs() {
        assert!(!keep_run("ab1"));
        assert!(!keep_run("12345678901"));
        assert!(keep_run("Kubernetes admin"));
    }
}
