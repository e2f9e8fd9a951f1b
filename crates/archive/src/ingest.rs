use std::io::{Cursor, Read};
use std::path::{Component, Path, PathBuf};

use lotsnap_core::{EntryRole, ImageEntry, RunWarning, WarningKind};
use serde::{Deserialize, Serialize};
use zip::ZipArchive;

use crate::error::ArchiveError;
use crate::workspace::RunWorkspace;

/// Which archive entries count as photos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestOptions {
    /// Accepted extensions, compared case-insensitively, without the dot.
    pub extensions: Vec<String>,
    /// Also take photos from sub-folders inside the archive.
    pub recursive: bool,
    /// Entries larger than this are left out with a warning.
    pub max_entry_bytes: u64,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            extensions: vec!["jpg".into(), "jpeg".into(), "png".into()],
            recursive: false,
            max_entry_bytes: 100_000_000,
        }
    }
}

impl IngestOptions {
    fn accepts_extension(&self, file_name: &str) -> bool {
        match file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => {
                self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
            }
            _ => false,
        }
    }
}

/// Photos taken from the input, sorted and numbered, plus anything left out.
#[derive(Debug, Default)]
pub struct Ingested {
    pub entries: Vec<ImageEntry>,
    pub warnings: Vec<RunWarning>,
}

/// An accepted entry written to the workspace but not yet numbered.
struct Spooled {
    name: String,
    path: PathBuf,
    role: EntryRole,
}

/// Read one archive holding both tag and item photos.
pub fn ingest_combined(
    archive: &[u8],
    options: &IngestOptions,
    workspace: &RunWorkspace,
) -> Result<Ingested, ArchiveError> {
    let mut warnings = Vec::new();
    let spooled = spool(archive, EntryRole::Mixed, "extracted", options, workspace, &mut warnings)?;
    Ok(number(spooled, warnings))
}

/// Read a tag archive and an item archive and interleave them by file name.
///
/// On equal names the tag photo comes first so it opens the lot before the
/// item with the same name is assigned.
pub fn ingest_separate(
    tags: &[u8],
    items: &[u8],
    options: &IngestOptions,
    workspace: &RunWorkspace,
) -> Result<Ingested, ArchiveError> {
    let mut warnings = Vec::new();
    let mut spooled = spool(tags, EntryRole::Tag, "tags", options, workspace, &mut warnings)?;
    spooled.extend(spool(items, EntryRole::Item, "items", options, workspace, &mut warnings)?);
    Ok(number(spooled, warnings))
}

fn number(mut spooled: Vec<Spooled>, warnings: Vec<RunWarning>) -> Ingested {
    // Stable sort: within one name, tags (spooled first) stay ahead of items.
    spooled.sort_by(|a, b| a.name.cmp(&b.name));
    let entries = spooled
        .into_iter()
        .enumerate()
        .map(|(position, s)| ImageEntry::new(s.name, position, s.path, s.role))
        .collect();
    Ingested { entries, warnings }
}

fn spool(
    data: &[u8],
    role: EntryRole,
    label: &str,
    options: &IngestOptions,
    workspace: &RunWorkspace,
    warnings: &mut Vec<RunWarning>,
) -> Result<Vec<Spooled>, ArchiveError> {
    let mut archive = ZipArchive::new(Cursor::new(data))?;
    let dir = workspace.subdir(label)?;
    let mut spooled = Vec::new();

    for i in 0..archive.len() {
        // `by_index` fails on encrypted entries, so inspect the raw entry first.
        let (raw_name, size) = {
            let raw = archive.by_index_raw(i)?;
            if raw.is_dir() {
                continue;
            }
            if raw.encrypted() {
                return Err(ArchiveError::PasswordProtected(raw.name().to_string()));
            }
            (raw.name().to_string(), raw.size())
        };

        let Some(parts) = sanitize_path(&raw_name) else {
            tracing::warn!("Skipping invalid path: {raw_name}");
            warnings.push(RunWarning::new(raw_name, WarningKind::SkippedEntry, "invalid path"));
            continue;
        };

        if parts.iter().any(|p| is_hidden(p)) {
            tracing::debug!("Skipping hidden entry: {raw_name}");
            continue;
        }
        if parts.len() > 1 && !options.recursive {
            tracing::debug!("Skipping nested entry: {raw_name}");
            continue;
        }
        let Some(file_name) = parts.last() else {
            continue;
        };
        if !options.accepts_extension(file_name) {
            continue;
        }

        let name = parts.join("/");
        if size > options.max_entry_bytes {
            tracing::warn!("Skipping large file: {name} ({size} bytes)");
            warnings.push(RunWarning::new(
                name,
                WarningKind::SkippedEntry,
                format!("{size} bytes exceeds the {} byte limit", options.max_entry_bytes),
            ));
            continue;
        }

        // The declared size can lie, so the read itself is capped too.
        let zip_file = archive.by_index(i)?;
        let Some(contents) = read_capped(zip_file, options.max_entry_bytes)? else {
            let limit = options.max_entry_bytes;
            tracing::warn!("Skipping large file: {name} (declared {size} bytes, holds more)");
            warnings.push(RunWarning::new(
                name,
                WarningKind::SkippedEntry,
                format!("holds more than the {limit} byte limit"),
            ));
            continue;
        };

        // Index-based file names so identical base names in different folders
        // cannot collide in the spool.
        let path = dir.join(format!("{i:06}"));
        std::fs::write(&path, &contents)?;
        spooled.push(Spooled { name, path, role });
    }

    tracing::info!("Ingested {} image(s) from {label} archive", spooled.len());
    Ok(spooled)
}

/// Read at most `limit` bytes. `None` when the reader holds more than that.
fn read_capped(reader: impl Read, limit: u64) -> std::io::Result<Option<Vec<u8>>> {
    let mut contents = Vec::new();
    reader.take(limit.saturating_add(1)).read_to_end(&mut contents)?;
    if contents.len() as u64 > limit {
        Ok(None)
    } else {
        Ok(Some(contents))
    }
}

/// Normal path components only: drops `..`, `.`, roots and drive prefixes.
/// Returns `None` when nothing is left.
fn sanitize_path(raw: &str) -> Option<Vec<String>> {
    let parts: Vec<String> = Path::new(raw)
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts)
    }
}

/// Dotfiles and macOS resource-fork folders.
fn is_hidden(component: &str) -> bool {
    component.starts_with('.') || component == "__MACOSX"
}
