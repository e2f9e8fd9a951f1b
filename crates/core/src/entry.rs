use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where an image came from, which decides whether it goes through OCR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryRole {
    /// Tags and item photos share one archive; OCR decides which is which.
    #[default]
    Mixed,
    /// Came from a dedicated tag archive; always read as a tag.
    Tag,
    /// Came from a dedicated item archive; never sent to OCR.
    Item,
}

/// One image accepted from an input archive.
///
/// The bytes live in the run workspace; `path` is the handle to them. Entries
/// are never mutated after ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    name: String,
    position: usize,
    path: PathBuf,
    role: EntryRole,
}

impl ImageEntry {
    pub fn new(name: impl Into<String>, position: usize, path: PathBuf, role: EntryRole) -> Self {
        Self { name: name.into(), position, path, role }
    }

    /// Archive-relative name, e.g. `IMG_0042.JPG` or `day1/IMG_0042.JPG`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Index in the merged, name-sorted ingest order.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn role(&self) -> EntryRole {
        self.role
    }

    /// The extension including its dot, in its original case (`.JPG` stays `.JPG`).
    /// Empty when the name has none.
    pub fn extension(&self) -> &str {
        let file_name = self.name.rsplit('/').next().unwrap_or(&self.name);
        match file_name.rfind('.') {
            Some(0) | None => "",
            Some(idx) => &file_name[idx..],
        }
    }

    pub fn read(&self) -> std::io::Result<Vec<u8>> {
        std::fs::read(&self.path)
    }
}
