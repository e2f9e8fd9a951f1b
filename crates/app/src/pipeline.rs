use chrono::{Local, NaiveDateTime};
use lotsnap_archive::{self as archive, ArchiveError, Ingested, PackageError, RunWorkspace};
use lotsnap_core::{
    EntryRole, ImageEntry, LotGrouper, LotId, LotSelection, RenamePlan, RunWarning, WarningKind,
};
use lotsnap_ocr::{LotTagRecognizer, OcrBackend};
use std::fmt;
use thiserror::Error;

use crate::config::PipelineConfig;
use crate::report::{self, RunReport, TranscriptLine};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("Could not create run workspace: {0}")]
    Workspace(#[source] std::io::Error),
    #[error("Could not read archive: {0}")]
    Archive(#[from] ArchiveError),
    #[error("{0}")]
    NoLotsDetected(NoLotsDetected),
    #[error("Could not build output archive: {0}")]
    Package(#[from] PackageError),
}

/// No tag was recognized and no extra lots were given.
///
/// Carries the OCR transcript so the user can see what was read and adjust
/// the photos or the skip/extra lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoLotsDetected {
    pub transcript: Vec<TranscriptLine>,
    pub warnings: Vec<RunWarning>,
}

impl fmt::Display for NoLotsDetected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "No valid lot numbers detected. \
             Please ensure your tag images have clear numbers (e.g. 101, 105A)."
        )?;
        for w in &self.warnings {
            writeln!(f, "  {w}")?;
        }
        report::write_transcript(f, &self.transcript)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveInput {
    /// Tags and item photos in one archive.
    Combined(Vec<u8>),
    /// Tag photos and item photos uploaded separately.
    Separate { tags: Vec<u8>, items: Vec<u8> },
}

#[derive(Debug, Clone)]
pub struct RunRequest {
    pub input: ArchiveInput,
    pub selection: LotSelection,
    /// Last lot number of the previous batch. Reported back, not used for grouping.
    pub previous_last_lot: u32,
}

impl RunRequest {
    pub fn combined(archive: Vec<u8>) -> Self {
        Self {
            input: ArchiveInput::Combined(archive),
            selection: LotSelection::default(),
            previous_last_lot: 0,
        }
    }

    pub fn separate(tags: Vec<u8>, items: Vec<u8>) -> Self {
        Self {
            input: ArchiveInput::Separate { tags, items },
            selection: LotSelection::default(),
            previous_last_lot: 0,
        }
    }

    pub fn with_selection(mut self, selection: LotSelection) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_previous_last_lot(mut self, lot: u32) -> Self {
        self.previous_last_lot = lot;
        self
    }
}

/// The result of a run: the download and the report shown next to it.
#[derive(Debug)]
pub struct RunOutcome {
    pub archive_name: String,
    pub archive: Vec<u8>,
    pub report: RunReport,
}

/// How one photo feeds the grouper.
enum Verdict {
    Tag(LotId),
    Item,
    /// A photo from the tag archive with nothing readable on it.
    Discard,
}

/// Orchestrates: workspace → ingest → OCR + grouping → rename plan → package.
pub struct LotPipeline<R: OcrBackend> {
    recognizer: LotTagRecognizer<R>,
    config: PipelineConfig,
}

impl<R: OcrBackend> LotPipeline<R> {
    pub fn new(backend: R, config: PipelineConfig) -> Self {
        let recognizer = LotTagRecognizer::new(
            backend,
            config.recognition.lot_prefix,
            config.recognition.preprocess,
        );
        Self { recognizer, config }
    }

    pub fn run(&self, request: RunRequest) -> Result<RunOutcome, RunError> {
        self.run_at(request, Local::now().naive_local())
    }

    /// Run with a fixed clock for the archive timestamp.
    pub fn run_at(&self, request: RunRequest, now: NaiveDateTime) -> Result<RunOutcome, RunError> {
        let workspace = match &self.config.output.workspace_dir {
            Some(dir) => RunWorkspace::acquire_in(dir),
            None => RunWorkspace::acquire(),
        }
        .map_err(RunError::Workspace)?;

        tracing::info!(
            "Starting run (previous batch ended at lot {})",
            request.previous_last_lot
        );

        // 1. Ingest.
        let Ingested { entries, mut warnings } = match &request.input {
            ArchiveInput::Combined(data) => {
                archive::ingest_combined(data, &self.config.ingest, &workspace)?
            }
            ArchiveInput::Separate { tags, items } => {
                archive::ingest_separate(tags, items, &self.config.ingest, &workspace)?
            }
        };

        // 2. Classify and group.
        let mut transcript = Vec::new();
        let mut grouper = LotGrouper::new(self.config.grouping, &request.selection);
        for entry in entries {
            let transition = match self.classify(&entry, &mut transcript, &mut warnings) {
                Verdict::Tag(lot) => grouper.observe(entry, Some(lot)),
                Verdict::Item => grouper.observe(entry, None),
                Verdict::Discard => continue,
            };
            tracing::debug!("Grouping transition: {transition:?}");
        }
        let grouping = grouper.finish();

        if grouping.lots.is_empty() {
            tracing::warn!("No lot numbers detected");
            return Err(RunError::NoLotsDetected(NoLotsDetected { transcript, warnings }));
        }

        // 3. Materialize.
        let plan = RenamePlan::from_lots(&grouping.lots);
        let resize = self.config.resize.spec();
        let packaged = archive::package(&plan, resize.as_ref())?;
        warnings.extend(packaged.warnings);

        let archive_name = archive::archive_file_name(&self.config.output.file_prefix, now);
        tracing::info!(
            "Run complete: {} lot(s), {} photo(s) renamed, {} warning(s)",
            grouping.lots.len(),
            plan.len(),
            warnings.len()
        );

        let report = RunReport {
            archive_name: archive_name.clone(),
            previous_last_lot: request.previous_last_lot,
            detected_lots: RunReport::summarize(&grouping.lots),
            renamed: plan,
            unassigned: grouping.unassigned.iter().map(|e| e.name().to_string()).collect(),
            transcript,
            warnings,
        };

        Ok(RunOutcome { archive_name, archive: packaged.bytes, report })
    }

    fn classify(
        &self,
        entry: &ImageEntry,
        transcript: &mut Vec<TranscriptLine>,
        warnings: &mut Vec<RunWarning>,
    ) -> Verdict {
        if entry.role() == EntryRole::Item {
            return Verdict::Item;
        }

        let recognized = entry
            .read()
            .map_err(|e| e.to_string())
            .and_then(|bytes| self.recognizer.recognize(&bytes).map_err(|e| e.to_string()));

        let rec = match recognized {
            Ok(rec) => rec,
            Err(message) => {
                tracing::warn!("Could not read {}: {message}", entry.name());
                warnings.push(RunWarning::new(entry.name(), WarningKind::ImageRead, message));
                return match entry.role() {
                    EntryRole::Tag => Verdict::Discard,
                    _ => Verdict::Item,
                };
            }
        };
        transcript.push(TranscriptLine { file: entry.name().to_string(), text: rec.text });

        match (rec.lot, entry.role()) {
            (Some(lot), _) => {
                tracing::debug!("{} is a tag for lot {lot}", entry.name());
                Verdict::Tag(lot)
            }
            (None, EntryRole::Tag) => {
                tracing::warn!("No lot number found on tag {}", entry.name());
                warnings.push(RunWarning::new(
                    entry.name(),
                    WarningKind::UnrecognizedTag,
                    "no lot number in OCR text",
                ));
                Verdict::Discard
            }
            (None, _) => Verdict::Item,
        }
    }
}
