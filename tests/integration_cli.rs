/// CLI integration tests for segment-tracker.
///
/// These invoke the compiled binary end-to-end with small POSIX commands
/// (`true`, `false`, `sh`). They are skipped when `sh` is unavailable.
use std::process::Command;

use tempfile::tempdir;

fn sh_available() -> bool {
    Command::new("sh")
        .args(["-c", "exit 0"])
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

fn bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_segment-tracker"))
}

#[test]
fn run_prints_summary_for_repeated_label() {
    if !sh_available() {
        eprintln!("SKIP: sh not available on PATH");
        return;
    }

    let output = bin()
        .args(["run", "--label", "noop", "--repeat", "3", "--", "true"])
        .output()
        .expect("failed to spawn segment-tracker binary");

    assert!(output.status.success(), "run command failed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Segment"), "missing table header: {stdout}");
    let row = stdout
        .lines()
        .find(|l| l.starts_with("noop"))
        .unwrap_or_else(|| panic!("missing noop row: {stdout}"));
    assert!(row.split_whitespace().nth(1) == Some("3"), "expected 3 runs: {row}");
    assert!(stdout.contains("Total:"));
}

#[test]
fn run_command_side_effects_happen_inside_segment() {
    if !sh_available() {
        eprintln!("SKIP: sh not available on PATH");
        return;
    }

    let tmp = tempdir().expect("tempdir");
    let marker = tmp.path().join("ran.txt");
    let script = format!("echo ok >> '{}'", marker.display());

    let status = bin()
        .args(["run", "--label", "write", "--repeat", "2", "--", "sh", "-c", &script])
        .status()
        .expect("failed to spawn segment-tracker binary");

    assert!(status.success());
    let contents = std::fs::read_to_string(&marker).expect("read marker");
    assert_eq!(contents.lines().count(), 2);
}

#[test]
fn failing_command_exits_non_zero() {
    if !sh_available() {
        eprintln!("SKIP: sh not available on PATH");
        return;
    }

    let output = bin()
        .args(["run", "--", "false"])
        .output()
        .expect("failed to spawn segment-tracker binary");

    assert!(!output.status.success());
    // The failed run is still timed and reported under the program name.
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.lines().any(|l| l.starts_with("false")), "{stdout}");
}

#[test]
fn long_running_warning_goes_to_stderr() {
    if !sh_available() {
        eprintln!("SKIP: sh not available on PATH");
        return;
    }

    let output = bin()
        .args(["run", "--label", "slow", "--warn-after", "0.05", "--", "sh", "-c", "sleep 0.5"])
        .output()
        .expect("failed to spawn segment-tracker binary");

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("slow is taking longer than expected"),
        "missing warning in stderr: {stderr}"
    );
}

#[test]
fn invalid_warn_after_is_rejected() {
    let output = bin()
        .args(["run", "--warn-after", "0", "--", "true"])
        .output()
        .expect("failed to spawn segment-tracker binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("positive number of seconds"), "{stderr}");
}
