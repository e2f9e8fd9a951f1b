use std::collections::VecDeque;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Image decode error: {0}")]
    ImageDecode(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
}

/// Abstraction over an OCR backend.
/// Implementations accept raw PNG/JPEG image bytes and return the recognized text.
pub trait OcrBackend: Send + Sync {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError>;
}

impl<T: OcrBackend + ?Sized> OcrBackend for Box<T> {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
        (**self).recognize(image_bytes)
    }
}

// ── Mock backends (always available, used for tests) ──────────

/// Returns a pre-set string for every image.
pub struct MockRecognizer {
    pub text: String,
}

impl MockRecognizer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl OcrBackend for MockRecognizer {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<String, OcrError> {
        Ok(self.text.clone())
    }
}

/// Plays back one scripted response per call, in call order.
///
/// `Err` entries become `OcrError::Engine`. Once the script runs out every
/// further call yields empty text.
pub struct ScriptedRecognizer {
    script: Mutex<VecDeque<Result<String, String>>>,
}

impl ScriptedRecognizer {
    pub fn new<I, S>(script: I) -> Self
    where
        I: IntoIterator<Item = Result<S, S>>,
        S: Into<String>,
    {
        let script = script
            .into_iter()
            .map(|r| r.map(Into::into).map_err(Into::into))
            .collect();
        Self { script: Mutex::new(script) }
    }

    /// Convenience for scripts with no failures.
    pub fn texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(texts.into_iter().map(Ok::<S, S>))
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().map(|s| s.len()).unwrap_or_default()
    }
}

impl OcrBackend for ScriptedRecognizer {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<String, OcrError> {
        let mut script = self
            .script
            .lock()
            .map_err(|_| OcrError::Engine("script lock poisoned".into()))?;
        match script.pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(OcrError::Engine(message)),
            None => Ok(String::new()),
        }
    }
}

// ── Tesseract backend (optional, gated behind `tesseract` feature) ──

#[cfg(feature = "tesseract")]
pub mod tesseract_backend {
    use super::{OcrBackend, OcrError};
    use leptess::LepTess;

    pub struct TesseractRecognizer {
        data_path: Option<String>,
        lang: String,
    }

    impl TesseractRecognizer {
        pub fn new(data_path: Option<String>, lang: &str) -> Self {
            Self { data_path, lang: lang.to_string() }
        }
    }

    impl OcrBackend for TesseractRecognizer {
        fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
            let mut lt = LepTess::new(self.data_path.as_deref(), &self.lang)
                .map_err(|e| OcrError::Engine(e.to_string()))?;
            lt.set_image_from_mem(image_bytes)
                .map_err(|e| OcrError::ImageDecode(e.to_string()))?;
            lt.get_utf8_text().map_err(|e| OcrError::Engine(e.to_string()))
        }
    }
}
