#[path = "../src/backup.rs"]
mod backup;

use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

#[test]
fn zip_export_and_import_roundtrip() {
    let workspace = temp_dir("hostel-backup-src");
    let workspace2 = temp_dir("hostel-backup-dst");
    let out_dir = temp_dir("hostel-backup-out");

    let bytes = b"sqlite-test-payload";
    std::fs::write(workspace.join("hostel.sqlite3"), bytes).expect("write source db");

    let bundle_path = out_dir.join("workspace.hostel.zip");
    let export = backup::export_workspace_bundle(&workspace, &bundle_path, Some("admin"))
        .expect("export bundle");
    assert_eq!(export.bundle_format, backup::BUNDLE_FORMAT_V1);
    assert_eq!(export.entry_count, 3);
    assert_eq!(export.db_sha256.len(), 64);

    let f = File::open(&bundle_path).expect("open bundle");
    let mut archive = zip::ZipArchive::new(f).expect("open zip archive");
    let mut manifest = String::new();
    archive
        .by_name("manifest.json")
        .expect("manifest entry")
        .read_to_string(&mut manifest)
        .expect("read manifest");
    let manifest: serde_json::Value = serde_json::from_str(&manifest).expect("manifest json");
    assert_eq!(manifest["format"], backup::BUNDLE_FORMAT_V1);
    assert_eq!(manifest["dbSha256"], export.db_sha256.as_str());
    archive
        .by_name("db/hostel.sqlite3")
        .expect("database entry in bundle");

    let import = backup::import_workspace_bundle(&bundle_path, &workspace2).expect("import bundle");
    assert_eq!(import.bundle_format_detected, backup::BUNDLE_FORMAT_V1);
    assert!(import.checksum_verified);

    let restored = std::fs::read(workspace2.join("hostel.sqlite3")).expect("read restored db");
    assert_eq!(restored, bytes);

    let _ = std::fs::remove_dir_all(workspace);
    let _ = std::fs::remove_dir_all(workspace2);
    let _ = std::fs::remove_dir_all(out_dir);
}

#[test]
fn tampered_database_entry_is_refused() {
    let out_dir = temp_dir("hostel-backup-tampered");
    let workspace = temp_dir("hostel-backup-tampered-dst");
    let original = b"live-database";
    std::fs::write(workspace.join("hostel.sqlite3"), original).expect("write live db");

    let bundle_path = out_dir.join("tampered.zip");
    {
        let f = File::create(&bundle_path).expect("create bundle");
        let mut zip = zip::ZipWriter::new(f);
        let opts = zip::write::FileOptions::default();
        zip.start_file("manifest.json", opts).expect("manifest entry");
        let manifest = serde_json::json!({
            "format": backup::BUNDLE_FORMAT_V1,
            "version": 1,
            "dbSha256": "0".repeat(64),
        });
        zip.write_all(manifest.to_string().as_bytes()).expect("write manifest");
        zip.start_file("db/hostel.sqlite3", opts).expect("db entry");
        zip.write_all(b"swapped-database").expect("write db");
        zip.finish().expect("finish zip");
    }

    let err = backup::import_workspace_bundle(&bundle_path, &workspace).unwrap_err();
    assert!(format!("{err:#}").contains("checksum mismatch"));
    let live = std::fs::read(workspace.join("hostel.sqlite3")).expect("read live db");
    assert_eq!(live, original);

    let _ = std::fs::remove_dir_all(out_dir);
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn raw_sqlite_import_is_supported() {
    let out_dir = temp_dir("hostel-backup-raw");
    let workspace = temp_dir("hostel-backup-raw-dst");

    let raw_file = out_dir.join("copy.sqlite3");
    let bytes = b"raw-sqlite-copy";
    std::fs::write(&raw_file, bytes).expect("write sqlite file");

    let import = backup::import_workspace_bundle(&raw_file, &workspace).expect("import sqlite copy");
    assert_eq!(import.bundle_format_detected, backup::LEGACY_SQLITE);
    assert!(!import.checksum_verified);

    let restored = std::fs::read(workspace.join("hostel.sqlite3")).expect("read restored sqlite");
    assert_eq!(restored, bytes);

    let _ = std::fs::remove_dir_all(out_dir);
    let _ = std::fs::remove_dir_all(workspace);
}
