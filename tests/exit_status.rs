use std::process::Command;

fn harness_binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_ferrite-harness"))
}

#[test]
fn failed_execution_exits_with_minus_one() {
    let out = tempfile::tempdir().unwrap();
    let status = harness_binary()
        .args(["--quiet", "--runner-class", "missing", "--epochs", "1", "--seed", "1"])
        .arg("--output-folder")
        .arg(out.path())
        .status()
        .unwrap();

    assert!(!status.success());
    // -1 as seen by the parent process.
    #[cfg(unix)]
    assert_eq!(status.code(), Some(255));
}

#[test]
fn other_errors_exit_with_one() {
    let out = tempfile::tempdir().unwrap();
    let output = harness_binary()
        .args(["--quiet", "--hyper-param-optim"])
        .arg(out.path().join("no_such_grid.json"))
        .arg("--output-folder")
        .arg(out.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("Error: "));
}

#[test]
fn successful_run_exits_with_zero() {
    let out = tempfile::tempdir().unwrap();
    // Empty grid: nothing to execute, the search finishes normally.
    let grid = out.path().join("grid.json");
    std::fs::write(&grid, r#"{"lr": []}"#).unwrap();
    let status = harness_binary()
        .args(["--quiet", "--hyper-param-optim"])
        .arg(&grid)
        .status()
        .unwrap();

    assert_eq!(status.code(), Some(0));
}
