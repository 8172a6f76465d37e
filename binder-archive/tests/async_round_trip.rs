//! Asynchronous pack/unpack paths: progress, cancellation, bounded writes

use binder_archive::{AggregateProgress, Binder, CancellationToken, DividedBinder};
use binder_archive::ArchiveError;
use binder_formats::bhd5::Bhd5;
use binder_formats::GameVersion;
use binder_hash::HashDictionary;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

fn write_input(root: &Path, name: &str, bytes: &[u8]) {
    let path = root.join(name);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, bytes).unwrap();
}

fn read_header(dir: &Path, name: &str, game: GameVersion) -> Bhd5 {
    let mut reader = BufReader::new(File::open(dir.join(name)).unwrap());
    Bhd5::read(&mut reader, game).unwrap()
}

#[tokio::test]
async fn test_async_round_trip_reports_progress() {
    let work = TempDir::new().unwrap();
    let root = work.path().join("input");
    for index in 0..8 {
        write_input(&root, &format!("f{index}.bin"), &vec![index as u8; 1000]);
    }

    let last = Arc::new(AtomicU64::new(0));
    let sink_last = Arc::clone(&last);
    let aggregate = AggregateProgress::new(move |mean| {
        sink_last.store((mean * 1000.0) as u64, Ordering::SeqCst);
    });
    let handle = aggregate.attach();
    let cancel = CancellationToken::new();

    let binder = Binder::from_directory(&root).unwrap();
    let out = work.path().join("packed");
    binder
        .write_archive_async(
            &out,
            "t.bhd",
            "t.bdt",
            GameVersion::EldenRing,
            16,
            true,
            None,
            Some(&handle),
            &cancel,
        )
        .await
        .unwrap();
    assert_eq!(last.load(Ordering::SeqCst), 1000);

    let header = read_header(&out, "t.bhd", GameVersion::EldenRing);
    let unpack_binder = Binder::from_bhd5(&header, None);

    let extracted = work.path().join("extracted");
    let unpack_handle = aggregate.attach();
    unpack_binder
        .unpack_async(&out.join("t.bdt"), &extracted, Some(&unpack_handle), &cancel)
        .await
        .unwrap();

    let mut extracted_files: Vec<_> = fs::read_dir(extracted.join("_unknown"))
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    extracted_files.sort();
    assert_eq!(extracted_files.len(), 8);
    for path in extracted_files {
        assert_eq!(fs::metadata(path).unwrap().len(), 1000);
    }
}

#[tokio::test]
async fn test_cancelled_pack_returns_cancelled() {
    let work = TempDir::new().unwrap();
    let root = work.path().join("input");
    write_input(&root, "a.bin", b"data");

    let cancel = CancellationToken::new();
    cancel.cancel();

    let binder = Binder::from_directory(&root).unwrap();
    let result = binder
        .write_archive_async(
            &work.path().join("packed"),
            "t.bhd",
            "t.bdt",
            GameVersion::DarkSouls1,
            0,
            false,
            None,
            None,
            &cancel,
        )
        .await;
    assert!(matches!(result, Err(ArchiveError::Cancelled)));
}

#[tokio::test]
async fn test_cancelled_unpack_returns_cancelled() {
    let work = TempDir::new().unwrap();
    let root = work.path().join("input");
    write_input(&root, "a.bin", b"data");

    let cancel = CancellationToken::new();
    let binder = Binder::from_directory(&root).unwrap();
    let out = work.path().join("packed");
    binder
        .write_archive_async(
            &out,
            "t.bhd",
            "t.bdt",
            GameVersion::DarkSouls1,
            0,
            false,
            None,
            None,
            &cancel,
        )
        .await
        .unwrap();

    cancel.cancel();
    let header = read_header(&out, "t.bhd", GameVersion::DarkSouls1);
    let unpack_binder = Binder::from_bhd5(&header, None);
    let result = unpack_binder
        .unpack_async(&out.join("t.bdt"), &work.path().join("x"), None, &cancel)
        .await;
    assert!(matches!(result, Err(ArchiveError::Cancelled)));
}

#[tokio::test]
async fn test_divided_unpack_with_selection_and_progress() {
    let work = TempDir::new().unwrap();

    let mut parts = DividedBinder::default();
    let mut dictionary = HashDictionary::new(false);
    dictionary.add("/part0.bin").unwrap();
    dictionary.add("/part1.bin").unwrap();

    for index in 0..2 {
        let root = work.path().join(format!("input{index}"));
        write_input(&root, &format!("part{index}.bin"), &[index as u8; 64]);
        let binder = Binder::from_directory(&root).unwrap();
        let out = work.path().join(format!("packed{index}"));
        binder
            .write_archive(&out, "p.bhd", "p.bdt", GameVersion::DarkSouls1, 0, false, None)
            .unwrap();
        let header = read_header(&out, "p.bhd", GameVersion::DarkSouls1);
        parts.push(
            Binder::from_bhd5(&header, Some(&dictionary)),
            out.join("p.bdt"),
        );
    }

    parts.set_selected(&["/part1.bin"]);

    let last = Arc::new(AtomicU64::new(0));
    let sink_last = Arc::clone(&last);
    let cancel = CancellationToken::new();
    let extracted = work.path().join("extracted");
    parts
        .unpack_async(
            &extracted,
            move |mean| {
                sink_last.store((mean * 1000.0) as u64, Ordering::SeqCst);
            },
            &cancel,
        )
        .await
        .unwrap();

    // The ignored part reported 1.0 immediately; the unpacked part ends
    // at 1.0, so the mean lands at 1.0 as well.
    assert_eq!(last.load(Ordering::SeqCst), 1000);
    assert!(!extracted.join("part0.bin").exists());
    assert!(extracted.join("part1.bin").exists());
}
