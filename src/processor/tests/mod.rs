//! Integration tests for the processor module
//!
//! Tests batch summarization over small record corpora on disk.

pub mod batch_processing;

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Helper to write a record file with the usual two header lines
pub fn write_record(dir: &Path, name: &str, samples: &[&str]) {
    let mut content = String::from("EVENT_NAME: test\nSTATION: test\n");
    for sample in samples {
        content.push_str(sample);
        content.push('\n');
    }
    fs::write(dir.join(name), content).unwrap();
}

/// Helper to create a two-event corpus
///
/// ```text
/// data/
///   20230206_043717_4614_{N,E,U}.asc
///   20230206_043717_0213_{N,U}.asc      (no East record)
///   20230206_132441/
///     3125_{N,E,U}.asc                  (Up record has no samples)
/// ```
pub fn create_two_event_corpus(temp_dir: &TempDir) -> PathBuf {
    let root = temp_dir.path().join("data");
    let event_dir = root.join("20230206_132441");
    fs::create_dir_all(&event_dir).unwrap();

    write_record(&root, "20230206_043717_4614_N.asc", &["0.1", "-0.5", "garbage", "0.3"]);
    write_record(&root, "20230206_043717_4614_E.asc", &["0.2", "-0.4"]);
    write_record(&root, "20230206_043717_4614_U.asc", &["0.05", "-0.01"]);
    write_record(&root, "20230206_043717_0213_N.asc", &["1.25", "-0.75"]);
    write_record(&root, "20230206_043717_0213_U.asc", &["0.5"]);

    write_record(&event_dir, "3125_N.asc", &["-2.5", "2.0"]);
    write_record(&event_dir, "3125_E.asc", &["0.9"]);
    write_record(&event_dir, "3125_U.asc", &["# nothing numeric here"]);

    root
}
