use std::sync::OnceLock;

use lotsnap_core::LotId;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::preprocess::{self, PreprocessError};
use crate::recognizer::{OcrBackend, OcrError};

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

// `[0-9]` rather than `\d`: Unicode digits must not become lot numbers.
re!(re_lot_optional_prefix, r"(?i)(?:lot\s*)?([0-9]{3}[A-Z]?)");
re!(re_lot_required_prefix, r"(?i)lot\s*([0-9]{3}[A-Z]?)");

/// Whether the word "LOT" must precede the number on a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LotPrefix {
    /// Any three-digit run counts, with or without "LOT" in front.
    #[default]
    Optional,
    /// Only "LOT 101" style text counts. Fewer false tags from serial numbers
    /// and prices in item photos, but a tag whose "LOT" is misread is missed.
    Required,
}

impl LotPrefix {
    fn pattern(self) -> &'static Regex {
        match self {
            LotPrefix::Optional => re_lot_optional_prefix(),
            LotPrefix::Required => re_lot_required_prefix(),
        }
    }
}

/// First lot number in `text`, upper-cased.
///
/// This is a heuristic: a price like "1250" reads as lot `125`. Noisy scans
/// will misfire and that is left to the skip list to correct.
pub fn find_lot(text: &str, prefix: LotPrefix) -> Option<LotId> {
    let caps = prefix.pattern().captures(text)?;
    let token = caps.get(1)?.as_str();
    // Case-insensitive `[A-Z]` also admits letters such as the Kelvin sign;
    // fall back to the digits alone when the suffix is not plain ASCII.
    LotId::parse(token).or_else(|_| LotId::parse(&token[..3])).ok()
}

#[derive(Debug, Error)]
pub enum RecognizeError {
    #[error("Image preprocessing failed: {0}")]
    Preprocess(#[from] PreprocessError),
    #[error("OCR recognition failed: {0}")]
    Ocr(#[from] OcrError),
}

/// OCR output for one image together with the lot number read from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recognition {
    pub text: String,
    pub lot: Option<LotId>,
}

/// Decides whether a photo is a lot tag.
pub struct LotTagRecognizer<R: OcrBackend> {
    backend: R,
    prefix: LotPrefix,
    preprocess: bool,
}

impl<R: OcrBackend> LotTagRecognizer<R> {
    pub fn new(backend: R, prefix: LotPrefix, preprocess: bool) -> Self {
        Self { backend, prefix, preprocess }
    }

    /// Run OCR on the photo and look for a lot number.
    ///
    /// Errors mean the image itself could not be read; callers treat that as
    /// "not a tag" and carry on.
    pub fn recognize(&self, image_bytes: &[u8]) -> Result<Recognition, RecognizeError> {
        let text = if self.preprocess {
            let prepared = preprocess::prepare_for_ocr(image_bytes)?;
            self.backend.recognize(&prepared)?
        } else {
            self.backend.recognize(image_bytes)?
        };
        let text = text.trim().to_string();
        let lot = find_lot(&text, self.prefix);
        Ok(Recognition { text, lot })
    }
}
