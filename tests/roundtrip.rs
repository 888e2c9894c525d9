//! End-to-end scenarios from the archive format notes: write with each
//! version's writer, read back with the public `Package` API, and check
//! the bytes and directory order survive the round trip.

use lspk::{detect, DetectionResult, Error, Package, WriterV10, WriterV13, WriterV18};
use pretty_assertions::assert_eq;

#[test]
fn v18_single_file_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let pak_path = dir.path().join("test.pak");

    let mut writer = WriterV18::new(&pak_path);
    writer.add_file("test.txt", b"hello world".to_vec(), false).unwrap();
    writer.save().unwrap();

    let bytes = std::fs::read(&pak_path).unwrap();
    assert_eq!(&bytes[0..4], b"LSPK");

    let package = Package::read(&pak_path).unwrap();
    assert_eq!(package.files.len(), 1);
    assert_eq!(package.files[0].name, "test.txt");
    assert_eq!(package.files[0].uncompressed_size, 0); // stored, not compressed
    assert_eq!(package.extract("test.txt").unwrap(), b"hello world");
}

#[test]
fn v13_compresses_large_repetitive_payload() {
    let dir = tempfile::tempdir().unwrap();
    let pak_path = dir.path().join("big.pak");
    let payload = b"hello world\n".repeat(1000);

    let mut writer = WriterV13::new(&pak_path, None);
    writer.add_file("big.txt", payload.clone(), true).unwrap();
    writer.save().unwrap();

    let bytes = std::fs::read(&pak_path).unwrap();
    assert_eq!(&bytes[bytes.len() - 4..], b"LSPK");

    let package = Package::read(&pak_path).unwrap();
    let entry = package.find("big.txt").unwrap();
    assert_ne!(entry.flags.unwrap_or(0) & 0x02, 0);
    assert!(entry.size_on_disk < payload.len() as u64);
    assert_eq!(package.extract("big.txt").unwrap(), payload);
}

#[test]
fn v10_preserves_insertion_order() {
    let dir = tempfile::tempdir().unwrap();
    let pak_path = dir.path().join("dirs.pak");

    let mut writer = WriterV10::new(&pak_path);
    writer.add_file("dir/a", b"A".to_vec()).unwrap();
    writer.add_file("dir/b", b"BB".to_vec()).unwrap();
    writer.add_file("dir/c", b"CCC".to_vec()).unwrap();
    writer.save().unwrap();

    let package = Package::read(&pak_path).unwrap();
    let names: Vec<_> = package.files.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["dir/a", "dir/b", "dir/c"]);

    for entry in &package.files {
        assert_eq!(entry.flags, Some(0));
        assert_eq!(entry.uncompressed_size, 0);
    }

    assert_eq!(package.extract("dir/a").unwrap(), b"A");
    assert_eq!(package.extract("dir/b").unwrap(), b"BB");
    assert_eq!(package.extract("dir/c").unwrap(), b"CCC");
}

#[test]
fn uncompressed_sentinel_is_exact() {
    let dir = tempfile::tempdir().unwrap();
    let pak_path = dir.path().join("stored.pak");

    let mut writer = WriterV18::new(&pak_path);
    writer.add_file("stored.bin", vec![7u8; 42], false).unwrap();
    writer.save().unwrap();

    let package = Package::read(&pak_path).unwrap();
    let entry = package.find("stored.bin").unwrap();
    assert_eq!(entry.flags, Some(0));
    assert_eq!(entry.uncompressed_size, 0);
    assert_eq!(entry.size_on_disk, 42);
}

#[test]
fn empty_file_extracts_without_touching_the_codec() {
    let dir = tempfile::tempdir().unwrap();
    let pak_path = dir.path().join("empty.pak");

    let mut writer = WriterV13::new(&pak_path, None);
    writer.add_file("empty.txt", Vec::new(), true).unwrap();
    writer.save().unwrap();

    let package = Package::read(&pak_path).unwrap();
    let entry = package.find("empty.txt").unwrap();
    assert_eq!(entry.size_on_disk, 0);
    assert_eq!(package.extract("empty.txt").unwrap(), Vec::<u8>::new());
}

#[test]
fn random_access_extraction_by_name_in_a_large_directory() {
    let dir = tempfile::tempdir().unwrap();
    let pak_path = dir.path().join("many.pak");

    let mut writer = WriterV13::new(&pak_path, None);
    for i in 0..50 {
        writer
            .add_file(format!("file{i}.txt"), format!("payload {i}").into_bytes(), false)
            .unwrap();
    }
    writer
        .add_file("target/last.txt", b"THIS IS THE TARGET FILE".to_vec(), false)
        .unwrap();
    writer.save().unwrap();

    let package = Package::read(&pak_path).unwrap();
    assert_eq!(package.files.len(), 51);
    assert_eq!(
        package.extract("target/last.txt").unwrap(),
        b"THIS IS THE TARGET FILE"
    );
}

#[test]
fn extract_all_recreates_directory_structure() {
    let archive_dir = tempfile::tempdir().unwrap();
    let pak_path = archive_dir.path().join("pack.pak");

    let mut writer = WriterV18::new(&pak_path);
    writer.add_file("a/b/c.txt", b"nested".to_vec(), false).unwrap();
    writer.save().unwrap();

    let package = Package::read(&pak_path).unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    package.extract_all(out_dir.path()).unwrap();

    let extracted = std::fs::read(out_dir.path().join("a/b/c.txt")).unwrap();
    assert_eq!(extracted, b"nested");
}

#[test]
fn name_too_long_is_rejected_before_any_payload_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let pak_path = dir.path().join("rejected.pak");

    let mut writer = WriterV18::new(&pak_path);
    writer.add_file("ok.txt", b"fine".to_vec(), false).unwrap();
    let err = writer
        .add_file("a".repeat(256), b"too long".to_vec(), false)
        .unwrap_err();
    assert!(matches!(err, Error::NameTooLong(_, 256)));

    // The rejected file was never queued, so saving still produces a
    // valid single-entry archive rather than a half-written one.
    writer.save().unwrap();
    let package = Package::read(&pak_path).unwrap();
    assert_eq!(package.files.len(), 1);
    assert_eq!(package.files[0].name, "ok.txt");
}

fn multi_part_archive(dir: &std::path::Path) -> (std::path::PathBuf, Vec<Vec<u8>>) {
    let pak_path = dir.join("parts.pak");
    let payloads = vec![vec![0xABu8; 600], vec![0xCDu8; 600], vec![0xEFu8; 600]];

    let mut writer = WriterV13::new(&pak_path, Some(1000));
    for (i, payload) in payloads.iter().enumerate() {
        writer.add_file(format!("file{i}"), payload.clone(), false).unwrap();
    }
    writer.save().unwrap();

    (pak_path, payloads)
}

#[test]
fn cross_part_extraction_reads_payloads_from_their_own_part_file() {
    let dir = tempfile::tempdir().unwrap();
    let (pak_path, payloads) = multi_part_archive(dir.path());

    let package = Package::read(&pak_path).unwrap();
    assert!(package.files.iter().any(|e| e.archive_part > 0));

    for (i, payload) in payloads.iter().enumerate() {
        let name = format!("file{i}");
        let entry = package.find(&name).unwrap();
        assert_eq!(&package.extract_entry(entry).unwrap(), payload);
    }
}

#[test]
fn continuation_detection_is_idempotent_on_the_part_file() {
    let dir = tempfile::tempdir().unwrap();
    let (pak_path, _payloads) = multi_part_archive(dir.path());

    let part_path = dir.path().join("parts_1.pak");
    assert!(part_path.exists());

    let mut part_file = std::fs::File::open(&part_path).unwrap();
    match detect(&mut part_file, Some(&part_path)).unwrap() {
        DetectionResult::Continuation {
            parent_path,
            part_number,
        } => {
            assert_eq!(parent_path, pak_path);
            assert_eq!(part_number, 1);
        }
        other => panic!("expected Continuation, got {other:?}"),
    }

    // Opening the part directly through the facade must name the parent
    // and part number rather than silently parsing garbage.
    let err = Package::read(&part_path).unwrap_err();
    match err {
        Error::IsContinuation {
            parent_path,
            part_number,
            ..
        } => {
            assert_eq!(parent_path, pak_path);
            assert_eq!(part_number, 1);
        }
        other => panic!("expected IsContinuation, got {other:?}"),
    }
}
