//! Document Ingestion - Async Reads of Plain-Text Files
//!
//! Files are read with `tokio::fs` off the frame loop and handed back as
//! `(filename, text)` pairs. Only UTF-8 text is accepted:
//!
//! - `.pdf` files, or anything starting with the `%PDF` magic, are rejected
//! - files containing NUL bytes are treated as binary and rejected
//! - invalid UTF-8 is rejected
//! - whitespace-only text is rejected as empty

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Bytes inspected when sniffing for binary content
const SNIFF_BYTES: usize = 8192;

/// Why a document was not added
#[derive(Debug, Error)]
pub enum IngestError {
    /// The file could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Path that was attempted
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// The format is not supported
    #[error("{filename}: unsupported format ({reason})")]
    Unsupported {
        /// File name
        filename: String,
        /// What was detected
        reason: &'static str,
    },

    /// The text was empty
    #[error("{filename} appears to be empty")]
    Empty {
        /// File name
        filename: String,
    },
}

impl IngestError {
    /// Short status line for the footer
    #[must_use]
    pub fn status_text(&self) -> String {
        match self {
            Self::Empty { filename } => format!("{filename} appears to be empty"),
            Self::Unsupported { filename, reason } => {
                format!("{filename} not supported ({reason})")
            }
            Self::Read { path, .. } => format!("Error processing {}", display_name(path)),
        }
    }
}

/// A document ready for the knowledge store
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IngestedDocument {
    /// File name without directories
    pub filename: String,
    /// Full text
    pub text: String,
}

impl IngestedDocument {
    /// Whitespace-separated word count
    #[must_use]
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Read a plain-text document from disk
///
/// # Errors
///
/// Returns [`IngestError::Read`] if the file cannot be read, and the
/// validation errors of [`from_bytes`] otherwise.
pub async fn read_document(path: impl AsRef<Path>) -> Result<IngestedDocument, IngestError> {
    let path = path.as_ref();
    let filename = display_name(path);
    if path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
    {
        return Err(IngestError::Unsupported {
            filename,
            reason: "PDF",
        });
    }

    let bytes = tokio::fs::read(path).await.map_err(|source| IngestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let document = from_bytes(filename, bytes)?;
    tracing::info!(
        filename = %document.filename,
        words = document.word_count(),
        "Document read"
    );
    Ok(document)
}

/// Validate raw bytes as a plain-text document
///
/// # Errors
///
/// Returns [`IngestError::Unsupported`] for PDF, binary or non-UTF-8
/// content and [`IngestError::Empty`] for whitespace-only text.
pub fn from_bytes(filename: impl Into<String>, bytes: Vec<u8>) -> Result<IngestedDocument, IngestError> {
    let filename = filename.into();
    if bytes.starts_with(b"%PDF") {
        return Err(IngestError::Unsupported {
            filename,
            reason: "PDF",
        });
    }
    if bytes.iter().take(SNIFF_BYTES).any(|b| *b == 0) {
        return Err(IngestError::Unsupported {
            filename,
            reason: "binary",
        });
    }
    let Ok(text) = String::from_utf8(bytes) else {
        return Err(IngestError::Unsupported {
            filename,
            reason: "not UTF-8",
        });
    };
    if text.trim().is_empty() {
        return Err(IngestError::Empty { filename });
    }
    Ok(IngestedDocument { filename, text })
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[tokio::test]
    async fn test_reads_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"# Notes\nalpha beta gamma")
            .unwrap();
        let doc = read_document(&path).await.unwrap();
        assert_eq!(doc.filename, "notes.md");
        assert_eq!(doc.word_count(), 5);
    }

    #[tokio::test]
    async fn test_rejects_pdf_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paper.PDF");
        std::fs::write(&path, b"whatever").unwrap();
        let err = read_document(&path).await.unwrap_err();
        assert!(matches!(err, IngestError::Unsupported { reason: "PDF", .. }));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let err = read_document("/definitely/not/here.txt").await.unwrap_err();
        assert!(matches!(err, IngestError::Read { .. }));
        assert_eq!(err.status_text(), "Error processing here.txt");
    }

    #[test]
    fn test_rejects_pdf_magic_binary_and_empty() {
        assert!(matches!(
            from_bytes("a.txt", b"%PDF-1.7".to_vec()),
            Err(IngestError::Unsupported { reason: "PDF", .. })
        ));
        assert!(matches!(
            from_bytes("a.bin", vec![1, 0, 2]),
            Err(IngestError::Unsupported { reason: "binary", .. })
        ));
        assert!(matches!(
            from_bytes("a.txt", vec![0xFF, 0xFE, 0x41]),
            Err(IngestError::Unsupported { reason: "not UTF-8", .. })
        ));
        let err = from_bytes("blank.txt", b"  \n\t ".to_vec()).unwrap_err();
        assert_eq!(err.status_text(), "blank.txt appears to be empty");
    }
}
