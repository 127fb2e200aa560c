//! Command-line surface checks: argument validation and a full creak run
//! driven through the binary.

mod common;

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use common::{creak_frames, go_bears_tiers, touch_wav, write_sidecar, write_textgrid};

#[test]
fn help_lists_the_three_analyses() {
    Command::cargo_bin("phonalyzer")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("creak")
                .and(predicate::str::contains("pitch"))
                .and(predicate::str::contains("phones")),
        );
}

#[test]
fn missing_subjects_table_is_a_fatal_error() {
    let corpus = TempDir::new().unwrap();
    Command::cargo_bin("phonalyzer")
        .unwrap()
        .args(["creak", "--corpus-dir"])
        .arg(corpus.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("subjects"));
}

#[test]
fn degenerate_step_counts_are_rejected() {
    let corpus = TempDir::new().unwrap();
    Command::cargo_bin("phonalyzer")
        .unwrap()
        .args(["pitch", "--steps", "1", "--corpus-dir"])
        .arg(corpus.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("step count"));
}

#[test]
fn creak_run_writes_both_tables() {
    let corpus = TempDir::new().unwrap();
    let data_dir = corpus.path().join("voicesof_data");
    fs::create_dir_all(&data_dir).unwrap();
    fs::write(
        corpus.path().join("subjects.txt"),
        "random_id\tadminAreaLevel1\nab12\tCalifornia\n",
    )
    .unwrap();

    touch_wav(&data_dir, "ab12_1_go");
    write_textgrid(&data_dir, "ab12_1_go", &go_bears_tiers());
    write_sidecar(
        &data_dir,
        "ab12_1_go",
        "creak",
        &creak_frames(50, |frame| frame < 25),
    );

    let out = TempDir::new().unwrap();
    Command::cargo_bin("phonalyzer")
        .unwrap()
        .args(["creak", "--corpus-dir"])
        .arg(corpus.path())
        .arg("--out-dir")
        .arg(out.path())
        .assert()
        .success();

    let by_subject = fs::read_to_string(out.path().join("creakinessBySubject.csv")).unwrap();
    assert!(by_subject.starts_with("random_id,creakSum,sampleSum,creakProp\n"));
    assert!(by_subject.contains("ab12,5,10,0.500000"));
    assert!(out.path().join("creakinessBySentence.csv").is_file());
}
