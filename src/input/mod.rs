//! Transcript input normalization
//!
//! Turns either a raw text field or an uploaded file into a single trimmed
//! UTF-8 transcript. Nothing that fails here ever reaches the pipeline.

use thiserror::Error;

/// Minimum transcript length, in characters, after trimming whitespace
pub const MIN_TRANSCRIPT_CHARS: usize = 10;

/// File extensions accepted by the upload endpoint (lowercase, no dot)
pub const ALLOWED_EXTENSIONS: &[&str] = &["txt", "md"];

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Transcript is empty")]
    EmptyTranscript,

    #[error("Transcript is too short: {actual} characters, minimum length is {min}")]
    TranscriptTooShort { actual: usize, min: usize },

    #[error("No file was uploaded")]
    MissingFile,

    #[error("Unsupported file type '{filename}'. Only .txt and .md files are supported")]
    UnsupportedExtension { filename: String },

    #[error("File '{filename}' is not valid UTF-8 text")]
    InvalidEncoding { filename: String },

    #[error("Invalid {field}: {message}")]
    InvalidField { field: String, message: String },
}

/// Trim the transcript and enforce the minimum length
pub fn normalize_transcript(text: &str) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyTranscript);
    }

    let actual = trimmed.chars().count();
    if actual < MIN_TRANSCRIPT_CHARS {
        return Err(ValidationError::TranscriptTooShort {
            actual,
            min: MIN_TRANSCRIPT_CHARS,
        });
    }

    Ok(trimmed.to_string())
}

/// Reject any filename whose extension is not in [`ALLOWED_EXTENSIONS`]
pub fn check_extension(filename: &str) -> Result<(), ValidationError> {
    let extension = std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension {
        Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        _ => Err(ValidationError::UnsupportedExtension {
            filename: filename.to_string(),
        }),
    }
}

/// Decode an uploaded file into a normalized transcript.
///
/// The extension is checked before the bytes are looked at, so a disallowed
/// file type is rejected regardless of its content.
pub fn decode_upload(filename: &str, bytes: &[u8]) -> Result<String, ValidationError> {
    check_extension(filename)?;

    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let text = std::str::from_utf8(bytes).map_err(|_| ValidationError::InvalidEncoding {
        filename: filename.to_string(),
    })?;

    normalize_transcript(text)
}
