//! Name-encoding properties against real source files.
//!
//! Each `#[case]` gets an isolated `TempDir` — no shared state.

use std::os::unix::fs::MetadataExt;
use std::path::Path;

use assert_fs::prelude::*;
use ntfsafe_core::{
    fingerprint,
    metadata::{format_perm_str, stat_following},
    EncodeError, EncoderLimits, MetadataSource, NameEncoder, LONG_SUFFIX, MAX_LEN,
};
use predicates::prelude::*;
use rstest::rstest;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Real mode, fixed owner names.
struct LiveMode;

impl MetadataSource for LiveMode {
    fn perm_str(&self, path: &Path) -> Result<String, EncodeError> {
        let meta = stat_following(path)?;
        Ok(format_perm_str(meta.mode(), "tester", "testers"))
    }
}

fn encoder() -> NameEncoder<LiveMode> {
    NameEncoder::with_metadata(LiveMode, EncoderLimits::default())
}

fn char_len(path: &Path) -> usize {
    path.file_name()
        .and_then(|n| n.to_str())
        .expect("utf-8 file name")
        .chars()
        .count()
}

// ---------------------------------------------------------------------------
// Length bound
// ---------------------------------------------------------------------------

#[rstest]
#[case(1, ".txt")]
#[case(100, ".txt")]
#[case(200, "")]
#[case(220, ".tar.gz")]
#[case(240, ".md")]
fn generated_names_fit_max_len(#[case] base_len: usize, #[case] ext: &str) {
    let src = assert_fs::TempDir::new().expect("tempdir");
    let name = format!("{}{ext}", "n".repeat(base_len));
    src.child(&name).write_str("x").expect("write");

    let encoded = encoder()
        .encode(Path::new("/mirror"), src.path(), &name)
        .expect("encode");

    assert!(char_len(&encoded.safe_path) <= MAX_LEN);
    if let Some(long) = &encoded.long_record {
        assert!(char_len(long) <= MAX_LEN);
    }
}

#[test]
fn scenario_a_short_file() {
    let src = assert_fs::TempDir::new().expect("tempdir");
    src.child("a.txt").write_str("hello").expect("write");
    let mode = std::fs::metadata(src.child("a.txt").path()).unwrap().mode();

    let encoded = encoder()
        .encode(Path::new("/mirror"), src.path(), "a.txt")
        .expect("encode");

    assert_eq!(
        encoded.safe_name(),
        format!("a--{}.{mode}.tester.testers.txt", fingerprint("a.txt"))
    );
    assert!(encoded.long_record.is_none());
}

#[test]
fn scenario_b_long_base() {
    let src = assert_fs::TempDir::new().expect("tempdir");
    // 300-character names are legal on few source filesystems, so 250 plus
    // an extension stands in for an over-long base.
    let name = format!("{}.log", "b".repeat(250));
    src.child(&name).write_str("x").expect("write");

    let encoded = encoder()
        .encode(Path::new("/mirror"), src.path(), &name)
        .expect("encode");

    let long = encoded.long_record.as_ref().expect("long record");
    assert_eq!(char_len(long), char_len(&encoded.safe_path) + LONG_SUFFIX.len());
    let shape = predicate::str::starts_with("bbbb")
        .and(predicate::str::contains(fingerprint(&name)))
        .and(predicate::str::ends_with(".tester.testers.log"));
    assert!(shape.eval(encoded.safe_name()), "got: {}", encoded.safe_name());
}

// ---------------------------------------------------------------------------
// Metadata sensitivity
// ---------------------------------------------------------------------------

#[test]
fn mode_change_changes_safe_name() {
    use std::os::unix::fs::PermissionsExt;

    let src = assert_fs::TempDir::new().expect("tempdir");
    let file = src.child("run.sh");
    file.write_str("#!/bin/sh").expect("write");

    let before = encoder()
        .encode(Path::new("/mirror"), src.path(), "run.sh")
        .expect("encode");
    std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(0o755)).unwrap();
    let after = encoder()
        .encode(Path::new("/mirror"), src.path(), "run.sh")
        .expect("encode");

    assert_ne!(before.safe_path, after.safe_path);
}

#[test]
fn dangling_link_can_be_encoded() {
    let src = assert_fs::TempDir::new().expect("tempdir");
    std::os::unix::fs::symlink(src.path().join("gone"), src.path().join("dangling"))
        .expect("symlink");

    let encoded = encoder()
        .encode(Path::new("/mirror"), src.path(), "dangling")
        .expect("encode");
    assert!(predicate::str::starts_with("dangling--").eval(encoded.safe_name()));
}

#[test]
fn missing_source_entry_is_io_error() {
    let src = assert_fs::TempDir::new().expect("tempdir");
    let err = encoder()
        .encode(Path::new("/mirror"), src.path(), "absent")
        .unwrap_err();
    assert!(matches!(err, EncodeError::Io { .. }), "got: {err}");
    assert!(err.to_string().contains("absent"));
}
