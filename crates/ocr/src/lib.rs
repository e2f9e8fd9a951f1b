pub mod preprocess;
pub mod recognizer;
pub mod tag;

pub use preprocess::{prepare_for_ocr, PreprocessError};
pub use recognizer::{MockRecognizer, OcrBackend, OcrError, ScriptedRecognizer};
pub use tag::{find_lot, LotPrefix, LotTagRecognizer, Recognition, RecognizeError};

#[cfg(feature = "tesseract")]
pub use recognizer::tesseract_backend::TesseractRecognizer;
