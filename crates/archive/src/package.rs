use std::io::{Cursor, Write};
use std::path::Path;

use chrono::NaiveDateTime;
use lotsnap_core::{RenamePlan, RunWarning, WarningKind};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::PackageError;
use crate::resize::{self, ResizeSpec};

/// The finished output archive.
#[derive(Debug)]
pub struct Packaged {
    pub bytes: Vec<u8>,
    pub warnings: Vec<RunWarning>,
}

/// Write every planned photo under its new name into a fresh ZIP.
///
/// With `resize` set each photo is scaled first; a photo that cannot be
/// resized is stored unchanged and reported.
pub fn package(plan: &RenamePlan, resize: Option<&ResizeSpec>) -> Result<Packaged, PackageError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut warnings = Vec::new();

    for entry in plan.entries() {
        let original = std::fs::read(&entry.source)?;
        let data = match resize {
            Some(spec) => {
                let ext = Path::new(&entry.renamed)
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or_default();
                match resize::resize_image(&original, ext, spec) {
                    Ok(resized) => resized,
                    Err(e) => {
                        tracing::warn!("Could not resize {}: {e}", entry.original);
                        warnings.push(RunWarning::new(
                            entry.original.clone(),
                            WarningKind::Resize,
                            e.to_string(),
                        ));
                        original
                    }
                }
            }
            None => original,
        };

        zip.start_file(entry.renamed.as_str(), options)?;
        zip.write_all(&data)?;
        tracing::debug!("{} -> {}", entry.original, entry.renamed);
    }

    let bytes = zip.finish()?.into_inner();
    tracing::info!("Packaged {} file(s), {} bytes", plan.len(), bytes.len());
    Ok(Packaged { bytes, warnings })
}

/// `renamed_lots_20240115_093000.zip` style download name.
pub fn archive_file_name(prefix: &str, now: NaiveDateTime) -> String {
    format!("{prefix}_{}.zip", now.format("%Y%m%d_%H%M%S"))
}
