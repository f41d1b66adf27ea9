//! Integration tests testing against the actual crate binary and reading from a file: Test the full E2E path.

use std::path::PathBuf;
use std::process::Command;

use crate::fixture_path;

fn binary() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_queue-balance-rs"));
    command.env("QB_RECORD_COST_MS", "0").env_remove("QB_FILE");
    command
}

#[test]
fn mixed_quality_file() {
    let input_path = fixture_path("mixed_quality.csv");
    let expected = std::fs::read_to_string(fixture_path("mixed_quality_expected.csv"))
        .expect("failed to read expected output fixture");

    let output = binary()
        .arg("--file")
        .arg(&input_path)
        .output()
        .expect("failed to execute binary");

    assert!(
        output.status.success(),
        "binary exited with non-zero status.\nstderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8(output.stdout).expect("binary output was not valid UTF-8");
    assert_eq!(normalize_csv(&stdout), normalize_csv(&expected));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("total_records: 5, batch_size: 10, jobs_dispatched: 1"),
        "report missing from stderr: {stderr}"
    );
}

#[test]
fn report_for_twenty_five_rows() {
    let output = binary()
        .args(["--batch-size", "10", "--policy", "tiered", "--file"])
        .arg(fixture_path("readings_25.csv"))
        .output()
        .expect("failed to execute binary");

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("total_records: 25, batch_size: 10, jobs_dispatched: 3, low-priority: 3"),
        "unexpected report: {stderr}"
    );
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 26); // header + 25 readings
}

#[test]
fn output_flag_writes_to_a_file() {
    let out_path: PathBuf =
        std::env::temp_dir().join(format!("queue-balance-rs-out-{}.csv", std::process::id()));

    let output = binary()
        .args(["--policy", "auto-balanced", "--file"])
        .arg(fixture_path("mixed_quality.csv"))
        .arg("--output")
        .arg(&out_path)
        .output()
        .expect("failed to execute binary");
    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let written = std::fs::read_to_string(&out_path).unwrap();
    std::fs::remove_file(&out_path).unwrap();
    let expected = std::fs::read_to_string(fixture_path("mixed_quality_expected.csv")).unwrap();
    assert_eq!(normalize_csv(&written), normalize_csv(&expected));
}

#[test]
fn missing_file_exits_with_failure() {
    let output = binary()
        .arg("--file")
        .arg(fixture_path("no_such_file.csv"))
        .output()
        .expect("failed to execute binary");

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn empty_file_exits_with_failure() {
    let output = binary()
        .arg("--file")
        .arg(fixture_path("header_only.csv"))
        .output()
        .expect("failed to execute binary");

    assert!(!output.status.success());
}

/// Normalizes CSV for comparison, making comparison order-independent.
/// Jobs are drained by several workers, so the order of the persisted readings is not deterministic.
fn normalize_csv(raw: &str) -> String {
    let mut lines: Vec<String> = raw
        .lines()
        .map(|line| {
            line.split(',')
                .map(|cell| cell.trim())
                .collect::<Vec<_>>()
                .join(",")
        })
        .filter(|line| !line.is_empty())
        .collect();

    if lines.len() <= 1 {
        return lines.join("\n");
    }

    let header = lines.remove(0);
    lines.sort();

    std::iter::once(header)
        .chain(lines)
        .collect::<Vec<_>>()
        .join("\n")
}
