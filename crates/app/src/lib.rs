pub mod config;
pub mod pipeline;
pub mod report;

pub use config::{ConfigError, OutputConfig, PipelineConfig, RecognitionConfig, ResizeConfig};
pub use pipeline::{ArchiveInput, LotPipeline, NoLotsDetected, RunError, RunOutcome, RunRequest};
pub use report::{LotSummary, RunReport, TranscriptLine};

pub use lotsnap_core::{
    parse_lot_list, DuplicateTagPolicy, GroupingPolicy, LotId, LotIdError, LotSelection, RenamePlan,
    RunWarning, WarningKind,
};
pub use lotsnap_ocr::{LotPrefix, MockRecognizer, OcrBackend, ScriptedRecognizer};
#[cfg(feature = "tesseract")]
pub use lotsnap_ocr::TesseractRecognizer;
