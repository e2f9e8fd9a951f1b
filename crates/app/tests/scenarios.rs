use std::io::{Cursor, Read, Write};

use chrono::NaiveDate;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use lotsnap::{
    LotPipeline, LotSelection, PipelineConfig, RunError, RunOutcome, RunRequest, ScriptedRecognizer,
    WarningKind,
};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

fn photo(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([(x * 7) as u8, (y * 3) as u8, 128]));
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

fn zip_of(names: &[&str]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for name in names {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(&photo(24, 16)).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

fn zip_names(bytes: &[u8]) -> Vec<String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

fn pipeline(script: &[&str]) -> LotPipeline<ScriptedRecognizer> {
    LotPipeline::new(ScriptedRecognizer::texts(script.iter().copied()), PipelineConfig::default())
}

fn run(pipeline: &LotPipeline<ScriptedRecognizer>, request: RunRequest) -> RunOutcome {
    pipeline.run(request).expect("run should succeed")
}

#[test]
fn photos_follow_the_most_recent_tag() {
    let archive =
        zip_of(&["IMG_001.jpg", "IMG_002.jpg", "IMG_003.jpg", "IMG_004.jpg", "IMG_005.jpg"]);
    let p = pipeline(&["LOT 101", "", "a chair", "Lot 102", ""]);
    let outcome = run(&p, RunRequest::combined(archive));

    assert_eq!(zip_names(&outcome.archive), ["101-1.jpg", "101-2.jpg", "102-1.jpg"]);
    assert_eq!(
        outcome.report.renamed.pairs(),
        [
            ("IMG_002.jpg", "101-1.jpg"),
            ("IMG_003.jpg", "101-2.jpg"),
            ("IMG_005.jpg", "102-1.jpg"),
        ]
    );
    assert_eq!(outcome.report.detected_lot_ids(), ["101", "102"]);
    assert_eq!(outcome.report.transcript.len(), 5);
    assert!(outcome.report.warnings.is_empty());
}

#[test]
fn skipped_lot_drops_its_photos() {
    let archive = zip_of(&["a.jpg", "b.jpg", "c.jpg", "d.jpg", "e.jpg", "f.jpg"]);
    let p = pipeline(&["LOT 101", "", "LOT 102", "", "LOT 103", ""]);
    let selection = LotSelection::from_lists("102", "").unwrap();
    let outcome = run(&p, RunRequest::combined(archive).with_selection(selection));

    assert_eq!(zip_names(&outcome.archive), ["101-1.jpg", "103-1.jpg"]);
    assert_eq!(outcome.report.detected_lot_ids(), ["101", "103"]);
    assert_eq!(outcome.report.unassigned, ["d.jpg"]);
}

#[test]
fn extra_lot_is_reported_without_files() {
    let archive = zip_of(&["a.jpg", "b.jpg"]);
    let p = pipeline(&["LOT 101", ""]);
    let selection = LotSelection::from_lists("", "105a").unwrap();
    let outcome = run(&p, RunRequest::combined(archive).with_selection(selection));

    assert_eq!(outcome.report.detected_lot_ids(), ["101", "105A"]);
    let extra = &outcome.report.detected_lots[1];
    assert_eq!((extra.photos, extra.tag_sightings), (0, 0));
    assert!(zip_names(&outcome.archive).iter().all(|n| !n.starts_with("105A")));
}

#[test]
fn extras_alone_are_enough_to_finish() {
    let archive = zip_of(&["a.jpg"]);
    let p = pipeline(&[""]);
    let selection = LotSelection::from_lists("", "200").unwrap();
    let outcome = run(&p, RunRequest::combined(archive).with_selection(selection));

    assert_eq!(outcome.report.detected_lot_ids(), ["200"]);
    assert!(zip_names(&outcome.archive).is_empty());
    assert_eq!(outcome.report.unassigned, ["a.jpg"]);
}

#[test]
fn unreadable_photo_is_reported_and_run_continues() {
    let archive = zip_of(&["a.jpg", "b.jpg", "c.jpg"]);
    let script = ScriptedRecognizer::new([Ok("LOT 101"), Err("engine crashed"), Ok("")]);
    let p = LotPipeline::new(script, PipelineConfig::default());
    let outcome = run(&p, RunRequest::combined(archive));

    let warnings = &outcome.report.warnings;
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].file, "b.jpg");
    assert_eq!(warnings[0].kind, WarningKind::ImageRead);
    assert_eq!(zip_names(&outcome.archive), ["101-1.jpg", "101-2.jpg"]);
    // Only successful reads are transcribed.
    assert_eq!(outcome.report.transcript.len(), 2);
}

#[test]
fn corrupt_image_bytes_degrade_to_a_warning() {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file("a.jpg", SimpleFileOptions::default()).unwrap();
    zip.write_all(&photo(8, 8)).unwrap();
    zip.start_file("b.jpg", SimpleFileOptions::default()).unwrap();
    zip.write_all(b"this is not an image").unwrap();
    let archive = zip.finish().unwrap().into_inner();

    let p = pipeline(&["LOT 101"]);
    let outcome = run(&p, RunRequest::combined(archive));

    assert_eq!(outcome.report.warnings[0].file, "b.jpg");
    assert_eq!(outcome.report.renamed.pairs(), [("b.jpg", "101-1.jpg")]);
}

#[test]
fn empty_archive_reports_no_lots() {
    let p = pipeline(&[]);
    let err = p.run(RunRequest::combined(zip_of(&[]))).unwrap_err();

    let RunError::NoLotsDetected(details) = err else {
        panic!("expected NoLotsDetected");
    };
    assert!(details.transcript.is_empty());
    let message = details.to_string();
    assert!(message.starts_with("No valid lot numbers detected."));
    assert!(message.contains("(none)"));
}

#[test]
fn no_tags_reports_transcript() {
    let p = pipeline(&["blurry", "LOT"]);
    let err = p.run(RunRequest::combined(zip_of(&["a.jpg", "b.jpg"]))).unwrap_err();

    let RunError::NoLotsDetected(details) = err else {
        panic!("expected NoLotsDetected");
    };
    let files: Vec<&str> = details.transcript.iter().map(|l| l.file.as_str()).collect();
    assert_eq!(files, ["a.jpg", "b.jpg"]);
    assert!(details.to_string().contains("a.jpg: blurry"));
}

#[test]
fn malformed_archive_is_rejected() {
    let p = pipeline(&[]);
    let err = p.run(RunRequest::combined(b"PK but not really".to_vec())).unwrap_err();
    assert!(matches!(err, RunError::Archive(_)));
}

#[test]
fn separate_archives_only_read_tags() {
    let tags = zip_of(&["IMG_010.jpg", "IMG_020.jpg", "IMG_030.jpg"]);
    let items = zip_of(&["IMG_011.jpg", "IMG_012.jpg", "IMG_021.jpg", "IMG_031.jpg"]);
    // The third tag photo has no lot number on it.
    let p = pipeline(&["LOT 101", "LOT 102", "smudge"]);
    let outcome = run(&p, RunRequest::separate(tags, items));

    assert_eq!(
        outcome.report.renamed.pairs(),
        [
            ("IMG_011.jpg", "101-1.jpg"),
            ("IMG_012.jpg", "101-2.jpg"),
            ("IMG_021.jpg", "102-1.jpg"),
            ("IMG_031.jpg", "102-2.jpg"),
        ]
    );
    assert_eq!(outcome.report.transcript.len(), 3);
    assert_eq!(outcome.report.warnings.len(), 1);
    assert_eq!(outcome.report.warnings[0].kind, WarningKind::UnrecognizedTag);
    assert_eq!(outcome.report.warnings[0].file, "IMG_030.jpg");
}

#[test]
fn resize_scales_packaged_photos() {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file("a.png", SimpleFileOptions::default()).unwrap();
    zip.write_all(&photo(8, 8)).unwrap();
    zip.start_file("b.png", SimpleFileOptions::default()).unwrap();
    zip.write_all(&photo(200, 100)).unwrap();
    let archive = zip.finish().unwrap().into_inner();

    let config = PipelineConfig::from_toml(
        r#"
        [resize]
        enabled = true
        landscape = { width = 80, height = 60 }
        portrait = { width = 60, height = 80 }
        "#,
    )
    .unwrap();
    let p = LotPipeline::new(ScriptedRecognizer::texts(["LOT 101", ""]), config);
    let outcome = run(&p, RunRequest::combined(archive));

    let mut out = ZipArchive::new(Cursor::new(outcome.archive)).unwrap();
    let mut file = out.by_name("101-1.png").unwrap();
    let mut data = Vec::new();
    file.read_to_end(&mut data).unwrap();
    let img = image::load_from_memory(&data).unwrap();
    assert_eq!((img.width(), img.height()), (80, 40));
}

#[test]
fn workspace_is_removed_after_run() {
    let parent = tempfile::tempdir().unwrap();
    let mut config = PipelineConfig::default();
    config.output.workspace_dir = Some(parent.path().to_path_buf());

    let p = LotPipeline::new(ScriptedRecognizer::texts(["LOT 101", ""]), config.clone());
    run(&p, RunRequest::combined(zip_of(&["a.jpg", "b.jpg"])));
    assert_eq!(std::fs::read_dir(parent.path()).unwrap().count(), 0);

    let p = LotPipeline::new(ScriptedRecognizer::texts([""]), config);
    assert!(p.run(RunRequest::combined(zip_of(&["a.jpg"]))).is_err());
    assert_eq!(std::fs::read_dir(parent.path()).unwrap().count(), 0);
}

#[test]
fn archive_name_uses_run_clock() {
    let now = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap().and_hms_opt(9, 30, 0).unwrap();
    let p = pipeline(&["LOT 101", ""]);
    let request = RunRequest::combined(zip_of(&["a.jpg", "b.jpg"])).with_previous_last_lot(100);
    let outcome = p.run_at(request, now).unwrap();

    assert_eq!(outcome.archive_name, "renamed_lots_20240115_093000.zip");
    assert_eq!(outcome.report.archive_name, outcome.archive_name);
    assert_eq!(outcome.report.previous_last_lot, 100);
}

#[test]
fn repeated_tag_restarts_lot_by_default() {
    let archive = zip_of(&["a.jpg", "b.jpg", "c.jpg", "d.jpg"]);
    let p = pipeline(&["LOT 101", "", "LOT 101", ""]);
    let outcome = run(&p, RunRequest::combined(archive));

    assert_eq!(outcome.report.renamed.pairs(), [("d.jpg", "101-1.jpg")]);
    assert_eq!(outcome.report.unassigned, ["b.jpg"]);
    assert_eq!(outcome.report.detected_lots[0].tag_sightings, 2);
}

#[test]
fn repeated_tag_can_append_instead() {
    let archive = zip_of(&["a.jpg", "b.jpg", "c.jpg", "d.jpg"]);
    let config =
        PipelineConfig::from_toml("[grouping]\nduplicate_tags = \"first_tag_wins\"\n").unwrap();
    let p = LotPipeline::new(ScriptedRecognizer::texts(["LOT 101", "", "LOT 101", ""]), config);
    let outcome = run(&p, RunRequest::combined(archive));

    assert_eq!(
        outcome.report.renamed.pairs(),
        [("b.jpg", "101-1.jpg"), ("d.jpg", "101-2.jpg")]
    );
}
