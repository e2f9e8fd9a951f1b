use std::fmt;

use lotsnap_core::{LotId, LotMap, RenamePlan, RunWarning};
use serde::Serialize;

/// Raw OCR output for one photo, kept so users can see why a tag was or
/// was not picked up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptLine {
    pub file: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LotSummary {
    pub lot: LotId,
    pub photos: usize,
    pub tag_sightings: usize,
}

/// What a successful run found and did.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub archive_name: String,
    /// Echo of the "last lot number used in the previous batch" input.
    pub previous_last_lot: u32,
    /// Sorted by lot number for display; the archive itself follows detection order.
    pub detected_lots: Vec<LotSummary>,
    pub renamed: RenamePlan,
    pub unassigned: Vec<String>,
    pub transcript: Vec<TranscriptLine>,
    pub warnings: Vec<RunWarning>,
}

impl RunReport {
    pub(crate) fn summarize(lots: &LotMap) -> Vec<LotSummary> {
        let mut summaries: Vec<LotSummary> = lots
            .iter()
            .map(|g| LotSummary {
                lot: g.lot.clone(),
                photos: g.members.len(),
                tag_sightings: g.tag_sightings,
            })
            .collect();
        summaries.sort_by(|a, b| a.lot.cmp(&b.lot));
        summaries
    }

    pub fn detected_lot_ids(&self) -> Vec<&str> {
        self.detected_lots.iter().map(|s| s.lot.as_str()).collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Detected lots ({}):", self.detected_lots.len())?;
        for s in &self.detected_lots {
            writeln!(f, "  {:<5} {} photo(s)", s.lot, s.photos)?;
        }
        writeln!(f, "Renamed {} photo(s) into {}", self.renamed.len(), self.archive_name)?;
        if !self.unassigned.is_empty() {
            writeln!(f, "Not assigned to any lot: {}", self.unassigned.join(", "))?;
        }
        if !self.warnings.is_empty() {
            writeln!(f, "Warnings:")?;
            for w in &self.warnings {
                writeln!(f, "  {w}")?;
            }
        }
        write_transcript(f, &self.transcript)
    }
}

/// The "OCR debug output" block, shared with the no-lots error.
pub fn write_transcript(f: &mut impl fmt::Write, transcript: &[TranscriptLine]) -> fmt::Result {
    writeln!(f, "OCR output:")?;
    if transcript.is_empty() {
        return writeln!(f, "  (none)");
    }
    for line in transcript {
        let text = line.text.replace('\n', " / ");
        writeln!(f, "  {}: {}", line.file, text)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lotsnap_core::{
        EntryRole, GroupingPolicy, ImageEntry, LotGrouper, LotSelection, WarningKind,
    };
    use std::path::PathBuf;

    fn lot(s: &str) -> LotId {
        LotId::parse(s).unwrap()
    }

    fn sample_report() -> RunReport {
        let selection = LotSelection::from_lists("", "101A").unwrap();
        let mut grouper = LotGrouper::new(GroupingPolicy::default(), &selection);
        let e = |n: &str, i| ImageEntry::new(n, i, PathBuf::from(n), EntryRole::Mixed);
        grouper.observe(e("t1.jpg", 0), Some(lot("102")));
        grouper.observe(e("a.jpg", 1), None);
        grouper.observe(e("t2.jpg", 2), Some(lot("101")));
        let lots = grouper.finish().lots;

        RunReport {
            archive_name: "renamed_lots_20240115_093000.zip".into(),
            previous_last_lot: 100,
            detected_lots: RunReport::summarize(&lots),
            renamed: RenamePlan::from_lots(&lots),
            unassigned: vec![],
            transcript: vec![
                TranscriptLine { file: "t1.jpg".into(), text: "LOT\n102".into() },
                TranscriptLine { file: "a.jpg".into(), text: String::new() },
            ],
            warnings: vec![RunWarning::new("x.jpg", WarningKind::ImageRead, "bad data")],
        }
    }

    #[test]
    fn lots_are_sorted_for_display() {
        let report = sample_report();
        assert_eq!(report.detected_lot_ids(), ["101", "101A", "102"]);
        assert_eq!(report.detected_lots[2].photos, 1);
        assert_eq!(report.detected_lots[1].tag_sightings, 0);
    }

    #[test]
    fn text_report_lists_lots_warnings_and_transcript() {
        let text = sample_report().to_string();
        assert!(text.contains("Detected lots (3):"));
        assert!(text.contains("102   1 photo(s)"));
        assert!(text.contains("Could not read x.jpg: bad data"));
        assert!(text.contains("t1.jpg: LOT / 102"));
    }

    #[test]
    fn json_report_has_plan_pairs() {
        let json = sample_report().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["renamed"][0]["original"], "a.jpg");
        assert_eq!(value["renamed"][0]["renamed"], "102-1.jpg");
        assert!(value["renamed"][0].get("source").is_none());
        assert_eq!(value["warnings"][0]["kind"], "image_read");
        assert_eq!(value["detected_lots"][0]["lot"], "101");
    }

    #[test]
    fn empty_transcript_is_marked() {
        let mut out = String::new();
        write_transcript(&mut out, &[]).unwrap();
        assert_eq!(out, "OCR output:\n  (none)\n");
    }
}
