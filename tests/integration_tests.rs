//! Integration tests for the bandcamp-expand pipeline
//!
//! These tests build real zip downloads in a temp directory, run the full
//! pipeline, and check the resulting library tree.

use bandcamp_expand::config::Settings;
use bandcamp_expand::{export, pipeline, ArchiveOutcome, ExpandError};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Write a deflate zip with the given entries
fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let file = File::create(path).expect("Failed to create zip");
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, data) in entries {
        zip.start_file(*name, options).expect("Failed to start entry");
        zip.write_all(data).expect("Failed to write entry");
    }

    zip.finish().expect("Failed to finalize zip");
}

/// Source, library and staging roots inside one temp dir
struct Fixture {
    _root: TempDir,
    source: PathBuf,
    library: PathBuf,
    staging: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        let source = root.path().join("Downloads").join("Bandcamp");
        let library = root.path().join("Music");
        let staging = source.join("auto");
        fs::create_dir_all(&source).unwrap();
        Self {
            _root: root,
            source,
            library,
            staging,
        }
    }

    /// Create test settings with progress bars disabled
    fn settings(&self) -> Settings {
        Settings {
            source: self.source.clone(),
            library: self.library.clone(),
            staging: self.staging.clone(),
            threads: 2,
            label_prefixes: vec!["Lacerated Enemy records - ".to_string()],
            report: None,
            show_progress: false,
            dry_run: false,
        }
    }

    fn archive(&self, name: &str, entries: &[(&str, &[u8])]) -> PathBuf {
        let path = self.source.join(name);
        write_zip(&path, entries);
        path
    }
}

fn completed_names(report: &pipeline::BatchReport) -> Vec<String> {
    let mut names: Vec<String> = report.completed().map(str::to_string).collect();
    names.sort();
    names
}

#[test]
fn test_expands_flac_album_into_library() {
    let fx = Fixture::new();
    let zip = fx.archive(
        "Artist X - Album Y.zip",
        &[
            ("Artist X - Album Y - 01 Song.flac", b"first song"),
            ("Artist X - Album Y - 02 Song.flac", b"second song"),
        ],
    );

    let report = pipeline::run(&fx.settings()).expect("Pipeline should succeed");

    let album = fx.library.join("FLAC").join("Artist X").join("Album Y");
    assert_eq!(fs::read(album.join("01 Song.flac")).unwrap(), b"first song");
    assert_eq!(fs::read(album.join("02 Song.flac")).unwrap(), b"second song");
    assert!(!zip.exists(), "Source archive should be deleted");
    assert_eq!(completed_names(&report), ["Artist X - Album Y.zip"]);
    assert_eq!(report.failures(), 0);

    // Staging album and its emptied parents are gone, the staging root stays
    assert!(!fx.staging.join("FLAC").join("Artist X").exists());
}

#[test]
fn test_malformed_name_left_in_place() {
    let fx = Fixture::new();
    let zip = fx.archive("NoSeparatorHere.zip", &[("01 Song.flac", b"audio")]);

    let report = pipeline::run(&fx.settings()).expect("Pipeline should succeed");

    assert!(zip.exists(), "Malformed archive must stay");
    assert!(completed_names(&report).is_empty());
    assert_eq!(report.failures(), 1);
    assert!(!fx.library.join("FLAC").exists());
}

#[test]
fn test_unknown_codec_left_in_place() {
    let fx = Fixture::new();
    let zip = fx.archive("Band - Liner Notes.zip", &[("notes.pdf", b"pdf"), ("cover.jpg", b"jpg")]);

    let report = pipeline::run(&fx.settings()).expect("Pipeline should succeed");

    assert!(zip.exists());
    let failed: Vec<_> = report.failed().collect();
    assert_eq!(failed.len(), 1);
    match failed[0] {
        ArchiveOutcome::Failed { reason, .. } => assert!(reason.contains("No FLAC or AAC")),
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[test]
fn test_corrupt_archive_left_in_place() {
    let fx = Fixture::new();
    let zip = fx.source.join("Band - Truncated.zip");
    fs::write(&zip, b"PK\x03\x04 definitely not complete").unwrap();

    let report = pipeline::run(&fx.settings()).expect("Pipeline should succeed");

    assert!(zip.exists());
    assert_eq!(report.failures(), 1);
}

#[test]
fn test_corrupt_entry_fails_again_on_rerun() {
    let fx = Fixture::new();
    let zip = fx.source.join("Band - Album.zip");
    let payload = vec![b'Q'; 4096];
    let mut buf = std::io::Cursor::new(Vec::new());
    {
        let mut writer = ZipWriter::new(&mut buf);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        writer.start_file("01.flac", options).unwrap();
        writer.write_all(&payload).unwrap();
        writer.finish().unwrap();
    }
    // Flip one stored byte so the CRC check fails at the end of the entry
    let mut bytes = buf.into_inner();
    let start = bytes
        .windows(64)
        .position(|w| w.iter().all(|&b| b == b'Q'))
        .unwrap();
    bytes[start + 100] = b'R';
    fs::write(&zip, bytes).unwrap();

    let track = fx.library.join("FLAC").join("Band").join("Album").join("01.flac");
    for _ in 0..2 {
        let report = pipeline::run(&fx.settings()).expect("Pipeline should succeed");
        assert_eq!(report.successful(), 0);
        assert_eq!(report.failures(), 1);
        assert!(zip.exists(), "Corrupt archive must stay");
        assert!(!track.exists());
    }
}

#[test]
fn test_aac_album_routed_to_aac() {
    let fx = Fixture::new();
    fx.archive(
        "Band - Album.zip",
        &[("cover.jpg", b"jpg"), ("Band - Album - 01 Track.m4a", b"aac data")],
    );

    pipeline::run(&fx.settings()).expect("Pipeline should succeed");

    let album = fx.library.join("AAC").join("Band").join("Album");
    assert!(album.join("01 Track.m4a").exists());
    assert!(album.join("cover.jpg").exists());
}

#[test]
fn test_duplicate_download_marker_joins_album() {
    let fx = Fixture::new();
    fx.archive("Band - Album (1).zip", &[("01 Track.flac", b"x")]);

    pipeline::run(&fx.settings()).expect("Pipeline should succeed");

    assert!(fx
        .library
        .join("FLAC")
        .join("Band")
        .join("Album")
        .join("01 Track.flac")
        .exists());
}

#[test]
fn test_label_and_double_artist_prefixes_stripped() {
    let fx = Fixture::new();
    fx.archive(
        "NECROVILE - Engorging The Devourmental Void.zip",
        &[
            (
                "NECROVILE - NECROVILE - Engorging The Devourmental Void - 01 I Kill Therefore I Am.flac",
                b"a",
            ),
            (
                "Lacerated Enemy records - NECROVILE - Engorging The Devourmental Void - 02 Outro.flac",
                b"b",
            ),
        ],
    );

    pipeline::run(&fx.settings()).expect("Pipeline should succeed");

    let album = fx
        .library
        .join("FLAC")
        .join("NECROVILE")
        .join("Engorging The Devourmental Void");
    assert!(album.join("01 I Kill Therefore I Am.flac").exists());
    assert!(album.join("02 Outro.flac").exists());
}

#[test]
fn test_traversal_entries_never_escape() {
    let fx = Fixture::new();
    fx.archive(
        "Band - Album.zip",
        &[
            ("../../../../escaped.flac", b"evil"),
            ("01 Track.flac", b"good"),
        ],
    );

    let report = pipeline::run(&fx.settings()).expect("Pipeline should succeed");

    assert_eq!(report.successful(), 1);
    assert!(fx.library.join("FLAC").join("Band").join("Album").join("01 Track.flac").exists());
    assert!(!fx.source.join("escaped.flac").exists());
    assert!(!fx.source.parent().unwrap().join("escaped.flac").exists());
    assert!(!fx.library.join("escaped.flac").exists());
}

#[test]
fn test_existing_library_files_skipped_or_replaced() {
    let fx = Fixture::new();
    let album = fx.library.join("FLAC").join("Band").join("Album");
    fs::create_dir_all(&album).unwrap();
    fs::write(album.join("01.flac"), b"same size!").unwrap();
    fs::write(album.join("02.flac"), b"short").unwrap();
    fs::write(album.join("keep.txt"), b"mine").unwrap();

    fx.archive(
        "Band - Album.zip",
        &[("01.flac", b"SAME SIZE!"), ("02.flac", b"complete track")],
    );

    let report = pipeline::run(&fx.settings()).expect("Pipeline should succeed");

    // Equal size counts as already merged
    assert_eq!(fs::read(album.join("01.flac")).unwrap(), b"same size!");
    // Size mismatch is replaced
    assert_eq!(fs::read(album.join("02.flac")).unwrap(), b"complete track");
    // Library files not in the archive are never removed
    assert!(album.join("keep.txt").exists());

    let totals = report.merge_totals();
    assert_eq!(totals.skipped, 1);
    assert_eq!(totals.replaced, 1);
}

#[test]
fn test_many_archives_in_parallel() {
    let fx = Fixture::new();
    for i in 0..8 {
        let entry = format!("Band {i} - Album {i} - 01 Track.flac");
        fx.archive(
            &format!("Band {i} - Album {i}.zip"),
            &[(entry.as_str(), b"track".as_slice())],
        );
    }
    fx.archive("Broken.zip", &[("01.flac", b"x")]);

    let report = pipeline::run(&fx.settings()).expect("Pipeline should succeed");

    assert_eq!(report.total_archives, 9);
    assert_eq!(report.successful(), 8);
    assert_eq!(report.failures(), 1);
    for i in 0..8 {
        let track = fx
            .library
            .join("FLAC")
            .join(format!("Band {i}"))
            .join(format!("Album {i}"))
            .join("01 Track.flac");
        assert!(track.exists(), "missing {}", track.display());
    }
    assert!(fx.source.join("Broken.zip").exists());
}

#[test]
fn test_two_albums_same_artist() {
    let fx = Fixture::new();
    fx.archive("Band - First.zip", &[("Band - First - 01.flac", b"1")]);
    fx.archive("Band - Second.zip", &[("Band - Second - 01.flac", b"2")]);

    let report = pipeline::run(&fx.settings()).expect("Pipeline should succeed");

    assert_eq!(report.successful(), 2);
    let artist = fx.library.join("FLAC").join("Band");
    assert_eq!(fs::read(artist.join("First").join("01.flac")).unwrap(), b"1");
    assert_eq!(fs::read(artist.join("Second").join("01.flac")).unwrap(), b"2");
}

#[test]
fn test_rerun_tolerates_leftover_staging() {
    let fx = Fixture::new();
    // A previous crashed run left a partial staging tree behind
    let leftover = fx.staging.join("FLAC").join("Band").join("Album");
    fs::create_dir_all(&leftover).unwrap();
    fs::write(leftover.join("01.flac"), b"complete").unwrap();

    fx.archive("Band - Album.zip", &[("01.flac", b"complete"), ("02.flac", b"two")]);

    let report = pipeline::run(&fx.settings()).expect("Pipeline should succeed");

    assert_eq!(report.successful(), 1);
    let album = fx.library.join("FLAC").join("Band").join("Album");
    assert!(album.join("01.flac").exists());
    assert!(album.join("02.flac").exists());
    assert!(!leftover.exists());
}

#[test]
fn test_dry_run_touches_nothing() {
    let fx = Fixture::new();
    let zip = fx.archive("Band - Album.zip", &[("01.flac", b"x")]);
    let mut settings = fx.settings();
    settings.dry_run = true;

    let report = pipeline::run(&settings).expect("Dry run should succeed");

    assert_eq!(report.total_archives, 1);
    assert!(report.outcomes.is_empty());
    assert!(zip.exists());
    assert!(!fx.library.exists());
    assert!(!fx.staging.exists());
}

#[test]
fn test_report_written_when_requested() {
    let fx = Fixture::new();
    fx.archive("Band - Album.zip", &[("01.flac", b"x")]);
    fx.archive("NoSeparatorHere.zip", &[("01.flac", b"x")]);
    let report_path = fx.library.join("reports").join("last-run.json");
    let mut settings = fx.settings();
    settings.report = Some(report_path.clone());

    pipeline::run(&settings).expect("Pipeline should succeed");

    let parsed = export::read_json(&report_path).expect("Report should parse");
    assert_eq!(parsed.metadata.archive_count, 2);
    assert_eq!(parsed.completed.len(), 1);
    assert_eq!(parsed.completed[0].name, "Band - Album.zip");
    assert_eq!(parsed.failed.len(), 1);
    assert_eq!(parsed.failed[0].name, "NoSeparatorHere.zip");
}

#[test]
fn test_empty_source_directory() {
    let fx = Fixture::new();

    let report = pipeline::run(&fx.settings()).expect("Pipeline should succeed on empty directory");

    assert_eq!(report.total_archives, 0);
    assert_eq!(report.successful(), 0);
    assert!(!fx.library.exists());
}

#[test]
fn test_missing_source_directory_is_fatal() {
    let fx = Fixture::new();
    let mut settings = fx.settings();
    settings.source = fx.source.join("does-not-exist");

    let result = pipeline::run(&settings);

    assert!(matches!(result, Err(ExpandError::FileNotFound(_))));
}
