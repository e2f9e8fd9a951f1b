use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// The image could not be decoded or the OCR engine failed on it.
    ImageRead,
    /// A photo from the tag archive had no readable lot number.
    UnrecognizedTag,
    /// Resizing failed; the original bytes were packaged instead.
    Resize,
    /// An archive entry was left out (too large, unreadable name).
    SkippedEntry,
}

/// A problem with one file that did not stop the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunWarning {
    pub file: String,
    pub kind: WarningKind,
    pub message: String,
}

impl RunWarning {
    pub fn new(file: impl Into<String>, kind: WarningKind, message: impl Into<String>) -> Self {
        Self { file: file.into(), kind, message: message.into() }
    }
}

impl fmt::Display for RunWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            WarningKind::ImageRead => write!(f, "Could not read {}: {}", self.file, self.message),
            WarningKind::UnrecognizedTag => {
                write!(f, "No lot number found on tag {}: {}", self.file, self.message)
            }
            WarningKind::Resize => write!(f, "Could not resize {}: {}", self.file, self.message),
            WarningKind::SkippedEntry => write!(f, "Skipped {}: {}", self.file, self.message),
        }
    }
}
