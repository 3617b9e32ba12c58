//! Document text extraction: uploaded resume bytes in, plain UTF-8 text out.
//!
//! Supported formats: pdf (pdf-extract), docx (docx-rs), doc (OOXML fallback or
//! OLE2 text recovery), txt. Failure is terminal for the upload; nothing retries.

mod legacy_doc;

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error, PartialEq)]
pub enum ExtractError {
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("corrupt document: {0}")]
    CorruptDocument(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Doc,
    Docx,
    Txt,
}

impl DocumentFormat {
    pub const ALLOWED_EXTENSIONS: [&'static str; 4] = ["pdf", "doc", "docx", "txt"];

    /// Resolves the format from a filename's extension (case-insensitive).
    pub fn from_filename(filename: &str) -> Result<Self, ExtractError> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        ext.parse()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Doc => "doc",
            DocumentFormat::Docx => "docx",
            DocumentFormat::Txt => "txt",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "application/pdf",
            DocumentFormat::Doc => "application/msword",
            DocumentFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            DocumentFormat::Txt => "text/plain",
        }
    }
}

impl FromStr for DocumentFormat {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "doc" => Ok(DocumentFormat::Doc),
            "docx" => Ok(DocumentFormat::Docx),
            "txt" => Ok(DocumentFormat::Txt),
            other => Err(ExtractError::UnsupportedFormat(if other.is_empty() {
                "<none>".to_string()
            } else {
                other.to_string()
            })),
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    pub format: DocumentFormat,
    pub text: String,
}

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Extracts text from `bytes`, choosing the parser from `filename`'s extension.
pub fn extract_text(bytes: &[u8], filename: &str) -> Result<ExtractedDocument, ExtractError> {
    let format = DocumentFormat::from_filename(filename)?;

    let text = match format {
        DocumentFormat::Pdf => extract_pdf(bytes)?,
        DocumentFormat::Docx => extract_docx(bytes)?,
        DocumentFormat::Doc => {
            if bytes.starts_with(ZIP_MAGIC) {
                debug!("{filename}: .doc carries an OOXML payload, reading as docx");
                extract_docx(bytes)?
            } else {
                legacy_doc::extract(bytes)?
            }
        }
        DocumentFormat::Txt => String::from_utf8(bytes.to_vec()).map_err(|e| {
            ExtractError::CorruptDocument(format!("text file is not valid UTF-8: {e}"))
        })?,
    };

    if text.trim().is_empty() {
        return Err(ExtractError::CorruptDocument(format!(
            "no text could be extracted from {filename}"
        )));
    }

    Ok(ExtractedDocument { format, text })
}

/// Runs [`extract_text`] on the blocking pool, bounded by `timeout`.
pub async fn extract_text_bounded(
    bytes: bytes::Bytes,
    filename: String,
    timeout: Duration,
) -> Result<ExtractedDocument, ExtractError> {
    // Reject by extension before spending a blocking thread.
    DocumentFormat::from_filename(&filename)?;

    let task = tokio::task::spawn_blocking(move || extract_text(&bytes, &filename));
    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(ExtractError::CorruptDocument(format!(
            "parser task failed: {join_err}"
        ))),
        Err(_) => {
            warn!("Document parsing exceeded {}s", timeout.as_secs());
            Err(ExtractError::CorruptDocument(format!(
                "parsing timed out after {}s",
                timeout.as_secs()
            )))
        }
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    // pdf-extract panics on some malformed inputs instead of returning Err.
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem(bytes)
    }));
    match outcome {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(ExtractError::CorruptDocument(format!("unreadable PDF: {e}"))),
        Err(_) => Err(ExtractError::CorruptDocument(
            "PDF parser aborted on malformed input".to_string(),
        )),
    }
}

fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let docx = docx_rs::read_docx(bytes)
        .map_err(|e| ExtractError::CorruptDocument(format!("unreadable DOCX: {e}")))?;

    let mut text = String::new();
    for child in docx.document.children {
        if let docx_rs::DocumentChild::Paragraph(p) = child {
            for p_child in p.children {
                if let docx_rs::ParagraphChild::Run(run) = p_child {
                    for run_child in run.children {
                        match run_child {
                            docx_rs::RunChild::Text(t) => text.push_str(&t.text),
                            docx_rs::RunChild::Tab(_) => text.push('\t'),
                            _ => {}
                        }
                    }
                }
            }
            text.push('\n');
        }
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn build_docx(paragraphs: &[&str]) -> Vec<u8> {
        let mut doc = docx_rs::Docx::new();
        for p in paragraphs {
            doc = doc.add_paragraph(
                docx_rs::Paragraph::new().add_run(docx_rs::Run::new().add_text(*p)),
            );
        }
        let mut cursor = Cursor::new(Vec::new());
        doc.build().pack(&mut cursor).unwrap();
        cursor.into_inner()
    }

    #[test]
    fn test_txt_returns_text() {
        let doc = extract_text(b"Python developer with SQL", "cv.TXT").unwrap();
        assert_eq!(doc.format, DocumentFormat::Txt);
        assert_eq!(doc.text, "Python developer with SQL");
    }

    #[test]
    fn test_docx_returns_paragraph_text() {
        let bytes = build_docx(&["Jane Doe", "Skills: Rust, PostgreSQL"]);
        let doc = extract_text(&bytes, "resume.docx").unwrap();
        assert!(doc.text.contains("Jane Doe"));
        assert!(doc.text.contains("Skills: Rust, PostgreSQL"));
    }

    #[test]
    fn test_doc_with_ooxml_payload_is_read_as_docx() {
        let bytes = build_docx(&["Kubernetes operator"]);
        let doc = extract_text(&bytes, "resume.doc").unwrap();
        assert_eq!(doc.format, DocumentFormat::Doc);
        assert!(doc.text.contains("Kubernetes operator"));
    }

    #[test]
    fn test_legacy_doc_recovers_text() {
        let bytes = legacy_doc::tests::ole_sample("Experienced Java engineer with AWS");
        let doc = extract_text(&bytes, "old.doc").unwrap();
        assert!(doc.text.contains("Experienced Java engineer with AWS"));
    }

    #[test]
    fn test_unsupported_extension_always_fails() {
        for name in ["resume.exe", "resume.odt", "resume", "resume.pdf.zip", ".bashrc"] {
            let err = extract_text(b"anything", name).unwrap_err();
            assert!(
                matches!(err, ExtractError::UnsupportedFormat(_)),
                "{name} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_garbage_pdf_is_corrupt() {
        let err = extract_text(b"this is not a pdf at all", "resume.pdf").unwrap_err();
        assert!(matches!(err, ExtractError::CorruptDocument(_)));
    }

    #[test]
    fn test_garbage_docx_is_corrupt() {
        let err = extract_text(b"not a zip archive", "resume.docx").unwrap_err();
        assert!(matches!(err, ExtractError::CorruptDocument(_)));
    }

    #[test]
    fn test_invalid_utf8_txt_is_corrupt() {
        let err = extract_text(&[0xff, 0xfe, 0xfd], "resume.txt").unwrap_err();
        assert!(matches!(err, ExtractError::CorruptDocument(_)));
    }

    #[test]
    fn test_blank_text_is_corrupt() {
        let err = extract_text(b"   \n\t ", "resume.txt").unwrap_err();
        assert!(matches!(err, ExtractError::CorruptDocument(_)));
    }

    #[test]
    fn test_format_mime_types() {
        assert_eq!(DocumentFormat::Pdf.mime_type(), "application/pdf");
        assert_eq!(DocumentFormat::Txt.mime_type(), "text/plain");
        assert_eq!("DOCX".parse::<DocumentFormat>().unwrap(), DocumentFormat::Docx);
    }

    #[tokio::test]
    async fn test_bounded_extraction_rejects_extension_early() {
        let err = extract_text_bounded(
            bytes::Bytes::from_static(b"x"),
            "payload.sh".to_string(),
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedFormat(_)));
    }

    #[tokio::test]
    async fn test_bounded_extraction_reads_txt() {
        let doc = extract_text_bounded(
            bytes::Bytes::from_static(b"Go and Docker"),
            "cv.txt".to_string(),
            Duration::from_secs(5),
        )
        .await
        .unwrap();
        assert_eq!(doc.text, "Go and Docker");
    }
}
