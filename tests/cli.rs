use assert_cmd::Command;
use flate2::write::GzEncoder;
use flate2::Compression;
use predicates::prelude::*;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

fn unzipper() -> Command {
    let mut cmd = Command::cargo_bin("unzipper").unwrap();
    cmd.env_remove("UNZIPPER_CONFIG");
    cmd
}

fn output_dir(root: &Path, suffix: &str) -> PathBuf {
    let name = fs::canonicalize(root)
        .unwrap()
        .file_name()
        .unwrap()
        .to_string_lossy()
        .into_owned();
    root.join(format!("{}{}", name, suffix))
}

fn write_zip(path: &Path, entries: &[(&str, &str)]) {
    let mut writer = zip::ZipWriter::new(fs::File::create(path).unwrap());
    for (name, data) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(data.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
}

fn write_gzip(path: &Path, data: &str) {
    let mut encoder = GzEncoder::new(fs::File::create(path).unwrap(), Compression::default());
    encoder.write_all(data.as_bytes()).unwrap();
    encoder.finish().unwrap();
}

#[test]
fn extracts_archives_and_reports_progress() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir(root.join("sub")).unwrap();
    write_zip(&root.join("photos.zip"), &[("a.txt", "A"), ("sub/b.txt", "B")]);
    write_gzip(&root.join("sub/data.txt.gz"), "decompressed");

    unzipper()
        .arg(root)
        .assert()
        .success()
        .stdout(predicate::str::contains("Root directory:"))
        .stdout(predicate::str::contains("Unzipping .zip file:"))
        .stdout(predicate::str::contains("Unzipped: photos.zip"))
        .stdout(predicate::str::contains("Unzipped: data.txt.gz"));

    let out = output_dir(root, "_unzip");
    assert_eq!(fs::read_to_string(out.join("a.txt")).unwrap(), "A");
    assert_eq!(fs::read_to_string(out.join("sub/b.txt")).unwrap(), "B");
    assert_eq!(fs::read_to_string(out.join("data.txt")).unwrap(), "decompressed");
    assert!(root.join("photos.zip").exists());
}

#[test]
fn delete_flag_works_in_either_position() {
    for delete_first in [true, false] {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_gzip(&root.join("log.txt.gz"), "entry");

        let mut cmd = unzipper();
        if delete_first {
            cmd.arg("--delete").arg(root);
        } else {
            cmd.arg(root).arg("--delete");
        }

        cmd.assert()
            .success()
            .stdout(predicate::str::contains("Deleted source file:"));

        assert!(!root.join("log.txt.gz").exists());
        assert!(output_dir(root, "_unzip").join("log.txt").exists());
    }
}

#[test]
fn corrupt_archive_is_kept_and_exit_is_zero() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(root.join("broken.zip"), "this is not a zip").unwrap();
    write_zip(&root.join("fine.zip"), &[("ok.txt", "ok")]);

    unzipper()
        .arg(root)
        .arg("--delete")
        .assert()
        .success()
        .stdout(predicate::str::contains("Bad zip file: broken.zip"));

    assert!(root.join("broken.zip").exists());
    assert!(!root.join("fine.zip").exists());
    assert!(output_dir(root, "_unzip").join("ok.txt").exists());
}

#[test]
fn second_run_uses_numbered_directory() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_zip(&root.join("a.zip"), &[("a.txt", "A")]);

    unzipper().arg(root).assert().success();
    unzipper().arg(root).assert().success();

    assert!(output_dir(root, "_unzip").join("a.txt").exists());
    assert!(output_dir(root, "_unzip_1").join("a.txt").exists());
}

#[test]
fn missing_root_fails_without_side_effects() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nowhere");

    unzipper()
        .arg(&missing)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("does not exist"));

    unzipper()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Pass an input directory"));

    assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[test]
fn file_root_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("single.zip");
    write_zip(&file, &[("a.txt", "A")]);

    unzipper()
        .arg(&file)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("is not a directory"));

    assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
}

#[test]
fn config_file_from_environment_is_honoured() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("data");
    fs::create_dir_all(root.join("x")).unwrap();
    fs::create_dir_all(root.join("y")).unwrap();
    write_gzip(&root.join("x/same.txt.gz"), "from x");
    write_gzip(&root.join("y/same.txt.gz"), "from y");

    let config_path = temp_dir.path().join("custom.toml");
    fs::write(
        &config_path,
        "[extract]\noutput_suffix = \"_out\"\ngzip_layout = \"mirror\"\n\n[output]\nformat = \"plain\"\n",
    )
    .unwrap();

    unzipper()
        .env("UNZIPPER_CONFIG", &config_path)
        .arg(&root)
        .assert()
        .success()
        .stdout(predicate::str::contains("COMPLETED: Archive extraction"));

    let out = output_dir(&root, "_out");
    assert_eq!(fs::read_to_string(out.join("x/same.txt")).unwrap(), "from x");
    assert_eq!(fs::read_to_string(out.join("y/same.txt")).unwrap(), "from y");
}

#[test]
fn invalid_config_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("broken.toml");
    fs::write(&config_path, "[extract\n").unwrap();

    unzipper()
        .env("UNZIPPER_CONFIG", &config_path)
        .arg(temp_dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration error"));
}
