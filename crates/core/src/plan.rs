use serde::Serialize;
use std::path::PathBuf;

use crate::grouping::LotMap;
use crate::lot::LotId;

/// One file to write: `original` renamed to `{lot}-{index}{ext}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameEntry {
    pub lot: LotId,
    /// 1-based, restarts for every lot.
    pub index: usize,
    pub original: String,
    pub renamed: String,
    /// Spooled bytes of the original image.
    #[serde(skip)]
    pub source: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RenamePlan {
    entries: Vec<RenameEntry>,
}

impl RenamePlan {
    /// Number every lot's photos from 1 in the order they were grouped.
    /// Lots with no photos contribute nothing.
    pub fn from_lots(lots: &LotMap) -> Self {
        let entries = lots
            .iter()
            .flat_map(|group| {
                group.members.iter().enumerate().map(move |(i, entry)| {
                    let index = i + 1;
                    RenameEntry {
                        lot: group.lot.clone(),
                        index,
                        original: entry.name().to_string(),
                        renamed: format!("{}-{}{}", group.lot, index, entry.extension()),
                        source: entry.path().to_path_buf(),
                    }
                })
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[RenameEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(original, renamed)` pairs in write order.
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        self.entries
            .iter()
            .map(|e| (e.original.as_str(), e.renamed.as_str()))
            .collect()
    }
}
